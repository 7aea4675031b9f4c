/*
 * @Author       : 老董
 * @Date         : 2026-03-06
 * @Description  : GruCell (门控循环单元) - 单步版本，时间步的展开由调用方控制
 *
 * 公式:
 *   r_t = σ(x_t @ W_ir + h_{t-1} @ W_hr + b_r)     # 重置门
 *   z_t = σ(x_t @ W_iz + h_{t-1} @ W_hz + b_z)     # 更新门
 *   n_t = tanh(x_t @ W_in + b_in + r_t ⊙ (h_{t-1} @ W_hn + b_hn))  # 候选状态
 *   h_t = (1 - z_t) ⊙ n_t + z_t ⊙ h_{t-1}         # 隐藏状态
 *
 * 与PyTorch一致：候选状态的隐藏侧偏置b_hn位于重置门之内；
 * 重置门与更新门的两侧偏置之和各合并为一个b_r、b_z
 */

use crate::nn::var_ops::{VarActivationOps, VarMatrixOps};
use crate::nn::{Graph, GraphError, Init, Module, Var};

/// GruCell - 单步 GRU
///
/// 解码器每一步的输入依赖上一步的输出，无法预先展开整段序列，故只提供单步接口。
///
/// # 输入/输出形状
/// - 输入：x [batch, input_size]，h [batch, hidden_size]
/// - 输出：新的 h [batch, hidden_size]
pub struct GruCell {
    // === 重置门参数 ===
    w_ir: Var, // [input_size, hidden_size]
    w_hr: Var, // [hidden_size, hidden_size]
    b_r: Var,  // [1, hidden_size]
    // === 更新门参数 ===
    w_iz: Var,
    w_hz: Var,
    b_z: Var,
    // === 候选状态参数 ===
    w_in: Var,
    w_hn: Var,
    b_in: Var,
    b_hn: Var,
    input_size: usize,
    hidden_size: usize,
    name: String,
}

impl GruCell {
    /// 创建新的 GruCell，所有参数按 PyTorch 默认值初始化为 U(±1/√hidden_size)
    pub fn new(
        graph: &Graph,
        input_size: usize,
        hidden_size: usize,
        name: &str,
    ) -> Result<Self, GraphError> {
        if input_size == 0 || hidden_size == 0 {
            return Err(GraphError::InvalidOperation(format!(
                "GruCell {name}的输入与隐藏维度必须为正"
            )));
        }
        let init = Init::symmetric_uniform(1.0 / (hidden_size as f32).sqrt());
        let param = |shape: &[usize], suffix: &str| {
            graph.parameter(shape, init.clone(), &format!("{name}_{suffix}"))
        };

        Ok(Self {
            w_ir: param(&[input_size, hidden_size], "W_ir")?,
            w_hr: param(&[hidden_size, hidden_size], "W_hr")?,
            b_r: param(&[1, hidden_size], "b_r")?,
            w_iz: param(&[input_size, hidden_size], "W_iz")?,
            w_hz: param(&[hidden_size, hidden_size], "W_hz")?,
            b_z: param(&[1, hidden_size], "b_z")?,
            w_in: param(&[input_size, hidden_size], "W_in")?,
            w_hn: param(&[hidden_size, hidden_size], "W_hn")?,
            b_in: param(&[1, hidden_size], "b_in")?,
            b_hn: param(&[1, hidden_size], "b_hn")?,
            input_size,
            hidden_size,
            name: name.to_string(),
        })
    }

    /// 执行一个时间步
    pub fn step(&self, x: &Var, h: &Var) -> Result<Var, GraphError> {
        let x_shape = x.shape()?;
        let h_shape = h.shape()?;
        if x_shape.len() != 2 || x_shape[1] != self.input_size {
            return Err(GraphError::ShapeMismatch {
                expected: vec![x_shape.first().copied().unwrap_or(0), self.input_size],
                got: x_shape,
                message: format!("{}的输入须为[batch, input_size]", self.name),
            });
        }
        if h_shape != [x_shape[0], self.hidden_size] {
            return Err(GraphError::ShapeMismatch {
                expected: vec![x_shape[0], self.hidden_size],
                got: h_shape,
                message: format!("{}的隐藏状态须为[batch, hidden_size]", self.name),
            });
        }

        // === 重置门 ===
        let r_gate = x
            .matmul(&self.w_ir)?
            .try_add(&h.matmul(&self.w_hr)?)?
            .try_add(&self.b_r)?
            .sigmoid()?;

        // === 更新门 ===
        let z_gate = x
            .matmul(&self.w_iz)?
            .try_add(&h.matmul(&self.w_hz)?)?
            .try_add(&self.b_z)?
            .sigmoid()?;

        // === 候选状态 ===
        let hidden_part = h.matmul(&self.w_hn)?.try_add(&self.b_hn)?;
        let n_gate = x
            .matmul(&self.w_in)?
            .try_add(&self.b_in)?
            .try_add(&r_gate.try_mul(&hidden_part)?)?
            .tanh()?;

        // h_t = n_t + z_t ⊙ (h - n_t)
        n_gate.try_add(&z_gate.try_mul(&h.try_sub(&n_gate)?)?)
    }

    pub const fn input_size(&self) -> usize {
        self.input_size
    }

    pub const fn hidden_size(&self) -> usize {
        self.hidden_size
    }
}

impl Module for GruCell {
    fn parameters(&self) -> Vec<Var> {
        vec![
            // 重置门
            self.w_ir.clone(),
            self.w_hr.clone(),
            self.b_r.clone(),
            // 更新门
            self.w_iz.clone(),
            self.w_hz.clone(),
            self.b_z.clone(),
            // 候选状态
            self.w_in.clone(),
            self.w_hn.clone(),
            self.b_in.clone(),
            self.b_hn.clone(),
        ]
    }
}
