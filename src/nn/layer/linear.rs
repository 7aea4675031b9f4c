/*
 * @Author       : 老董
 * @Date         : 2026-03-06
 * @Description  : Linear (全连接) 层
 */

use crate::nn::{Graph, GraphError, Init, Module, Var, VarMatrixOps};

/// Linear (全连接) 层
///
/// PyTorch 风格的全连接层：`output = x @ W + b`，作用于输入的最后一维
///
/// # 输入/输出形状
/// - 输入：[..., in_features]
/// - 输出：[..., out_features]
///
/// # 使用示例
/// ```ignore
/// let fc = Linear::new(&graph, 64, 32, true, "fc1")?;
/// let h = fc.forward(&x)?.elu()?;
/// ```
pub struct Linear {
    /// 权重参数 [in_features, out_features]
    weights: Var,
    /// 偏置参数 [1, out_features]（可选）
    bias: Option<Var>,
    in_features: usize,
    out_features: usize,
    name: String,
}

impl Linear {
    /// 创建新的 Linear 层，权重与偏置均按 PyTorch 默认值初始化为 U(±1/√in_features)
    pub fn new(
        graph: &Graph,
        in_features: usize,
        out_features: usize,
        use_bias: bool,
        name: &str,
    ) -> Result<Self, GraphError> {
        let bound = 1.0 / (in_features.max(1) as f32).sqrt();
        Self::with_init(
            graph,
            in_features,
            out_features,
            use_bias,
            Init::symmetric_uniform(bound),
            Init::symmetric_uniform(bound),
            name,
        )
    }

    /// 创建新的 Linear 层，并分别指定权重与偏置的初始化策略
    pub fn with_init(
        graph: &Graph,
        in_features: usize,
        out_features: usize,
        use_bias: bool,
        weight_init: Init,
        bias_init: Init,
        name: &str,
    ) -> Result<Self, GraphError> {
        if in_features == 0 || out_features == 0 {
            return Err(GraphError::InvalidOperation(format!(
                "Linear层{name}的输入输出维度必须为正，实际为{in_features}->{out_features}"
            )));
        }
        let weights = graph.parameter(
            &[in_features, out_features],
            weight_init,
            &format!("{name}_W"),
        )?;
        let bias = if use_bias {
            Some(graph.parameter(&[1, out_features], bias_init, &format!("{name}_b"))?)
        } else {
            None
        };

        Ok(Self {
            weights,
            bias,
            in_features,
            out_features,
            name: name.to_string(),
        })
    }

    /// 前向传播
    pub fn forward(&self, x: &Var) -> Result<Var, GraphError> {
        let shape = x.shape()?;
        if shape.last() != Some(&self.in_features) {
            return Err(GraphError::ShapeMismatch {
                expected: vec![self.in_features],
                got: shape,
                message: format!("{}的输入最后一维须为in_features", self.name),
            });
        }
        let h = x.matmul_last_axis(&self.weights)?;
        match &self.bias {
            Some(b) => h.try_add(b),
            None => Ok(h),
        }
    }

    pub const fn weights(&self) -> &Var {
        &self.weights
    }

    pub const fn bias(&self) -> Option<&Var> {
        self.bias.as_ref()
    }

    pub const fn in_features(&self) -> usize {
        self.in_features
    }

    pub const fn out_features(&self) -> usize {
        self.out_features
    }
}

impl Module for Linear {
    fn parameters(&self) -> Vec<Var> {
        let mut params = vec![self.weights.clone()];
        if let Some(b) = &self.bias {
            params.push(b.clone());
        }
        params
    }
}
