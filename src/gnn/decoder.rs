/*
 * @Author       : 老董
 * @Date         : 2026-03-12
 * @Description  : 自回归解码器：把循环单元按时间展开 target_seq_len 步，每步的输出帧作为下一步的输入
 *
 * - `DecoderWrapper`: 点估计，Linear(rnn_size, output_size) 直接给出下一帧
 * - `StochasticDecoderWrapper`: 预测逐元素高斯的均值与标准差（softplus），用重参数化采样下一帧
 *
 * 残差模式下预测的是相对当前帧前`output_size`个通道的偏移量（速度）；
 * 当前帧其余通道（如动作独热编码）原样带入下一帧。
 */

use std::rc::Rc;

use tracing::debug;

use crate::nn::{
    Graph, GraphError, Init, Linear, Module, Var, VarActivationOps, VarShapeOps,
};

/// 单步循环单元
pub trait RecurrentCell {
    /// 隐藏状态（也是输出）的特征维度
    fn hidden_size(&self) -> usize;

    /// 执行一个时间步
    ///
    /// - `input`: [B, J, D]
    /// - `state`: [B, J, hidden_size]
    /// - `edge_weight`: [B, E, 1]，仅带图传播的单元会使用并更新它
    fn step(
        &self,
        input: &Var,
        state: &Var,
        edge_weight: Option<&Var>,
    ) -> Result<CellStep, GraphError>;

    /// 单元自身的可训练参数
    fn cell_parameters(&self) -> Vec<Var>;
}

/// 单元一步的结果
pub struct CellStep {
    pub output: Var,
    pub state: Var,
    pub edge_weight: Option<Var>,
}

/// 点估计解码结果
pub struct PointDecoding {
    /// [T, B, J, output_size]
    pub outputs: Var,
    /// 最终隐藏状态
    pub state: Var,
    pub edge_weight: Option<Var>,
}

/// 高斯分布解码结果
pub struct DistributionDecoding {
    /// [T, B, J, output_size]
    pub means: Var,
    /// [T, B, J, output_size]，由softplus给出，非负
    pub stds: Var,
    /// [T, B, J, output_size]，重参数化采样（残差模式下已加回当前帧）
    pub samples: Var,
    pub state: Var,
    pub edge_weight: Option<Var>,
}

/// 两种解码器共用的展开设置
struct Unroll {
    name: String,
    output_size: usize,
    target_seq_len: usize,
    residual: bool,
}

impl Unroll {
    fn new(
        name: &str,
        output_size: usize,
        target_seq_len: usize,
        residual: bool,
    ) -> Result<Self, GraphError> {
        if target_seq_len == 0 {
            return Err(GraphError::InvalidOperation(format!(
                "{name}的target_seq_len至少为1"
            )));
        }
        Ok(Self {
            name: name.to_string(),
            output_size,
            target_seq_len,
            residual,
        })
    }

    /// 逐步展开，`predict`把单元输出映射为下一帧的前`output_size`个通道（残差前）
    fn run<C, F>(
        &self,
        cell: &C,
        seed: &Var,
        state: &Var,
        edge_weight: Option<&Var>,
        mut predict: F,
    ) -> Result<(Vec<Var>, Var, Option<Var>), GraphError>
    where
        C: RecurrentCell + ?Sized,
        F: FnMut(&Var) -> Result<Var, GraphError>,
    {
        let seed_shape = seed.shape()?;
        let frame_dim = match seed_shape.as_slice() {
            [_, _, d] if *d >= self.output_size => *d,
            _ => {
                return Err(GraphError::ShapeMismatch {
                    expected: vec![0, 0, self.output_size],
                    got: seed_shape,
                    message: format!(
                        "{}的初始帧须为[B, J, D]且D不小于output_size({})",
                        self.name, self.output_size
                    ),
                });
            }
        };

        let mut frame = seed.clone();
        let mut state = state.clone();
        let mut edge_weight = edge_weight.cloned();
        let mut frames = Vec::with_capacity(self.target_seq_len);
        for t in 0..self.target_seq_len {
            let step = cell.step(&frame, &state, edge_weight.as_ref())?;
            let prediction = predict(&step.output)?;
            let next = if self.residual {
                prediction.try_add(&frame.narrow(2, 0, self.output_size)?)?
            } else {
                prediction
            };
            frame = if frame_dim > self.output_size {
                let carried = frame.narrow(2, self.output_size, frame_dim - self.output_size)?;
                Var::concat(&[&next, &carried], 2)?
            } else {
                next.clone()
            };
            frames.push(next);
            state = step.state;
            edge_weight = step.edge_weight;
            debug!(decoder = %self.name, step = t, "解码一帧");
        }
        Ok((frames, state, edge_weight))
    }
}

fn stack(vars: &[Var]) -> Result<Var, GraphError> {
    let refs: Vec<&Var> = vars.iter().collect();
    Var::stack(&refs)
}

/// 点估计解码器
pub struct DecoderWrapper<C: RecurrentCell> {
    cell: Rc<C>,
    head: Linear,
    unroll: Unroll,
}

impl<C: RecurrentCell> DecoderWrapper<C> {
    /// 输出头的权重初始化为U(±0.04)，偏置为0，使训练初期的输出接近0
    pub fn new(
        graph: &Graph,
        cell: Rc<C>,
        output_size: usize,
        target_seq_len: usize,
        residual: bool,
        name: &str,
    ) -> Result<Self, GraphError> {
        let unroll = Unroll::new(name, output_size, target_seq_len, residual)?;
        let head = Linear::with_init(
            graph,
            cell.hidden_size(),
            output_size,
            true,
            Init::symmetric_uniform(0.04),
            Init::Zeros,
            &format!("{name}_head"),
        )?;
        Ok(Self { cell, head, unroll })
    }

    /// - `seed`: 初始输入帧[B, J, D]
    /// - `state`: 初始隐藏状态[B, J, hidden_size]
    pub fn forward(
        &self,
        seed: &Var,
        state: &Var,
        edge_weight: Option<&Var>,
    ) -> Result<PointDecoding, GraphError> {
        let (frames, state, edge_weight) = self.unroll.run(
            self.cell.as_ref(),
            seed,
            state,
            edge_weight,
            |output| self.head.forward(output),
        )?;
        Ok(PointDecoding {
            outputs: stack(&frames)?,
            state,
            edge_weight,
        })
    }

    pub const fn target_seq_len(&self) -> usize {
        self.unroll.target_seq_len
    }

    pub const fn is_residual(&self) -> bool {
        self.unroll.residual
    }

    pub fn cell(&self) -> &Rc<C> {
        &self.cell
    }

    /// 输出头参数（不含单元参数）
    pub fn head_parameters(&self) -> Vec<Var> {
        self.head.parameters()
    }
}

impl<C: RecurrentCell> Module for DecoderWrapper<C> {
    fn parameters(&self) -> Vec<Var> {
        [self.cell.cell_parameters(), self.head.parameters()].concat()
    }
}

/// 随机解码器
pub struct StochasticDecoderWrapper<C: RecurrentCell> {
    cell: Rc<C>,
    mean_head: Linear,
    std_head: Linear,
    unroll: Unroll,
}

impl<C: RecurrentCell> StochasticDecoderWrapper<C> {
    /// 均值头与标准差头的权重均初始化为U(±0.05)，偏置为0
    pub fn new(
        graph: &Graph,
        cell: Rc<C>,
        output_size: usize,
        target_seq_len: usize,
        residual: bool,
        name: &str,
    ) -> Result<Self, GraphError> {
        let unroll = Unroll::new(name, output_size, target_seq_len, residual)?;
        let hidden_size = cell.hidden_size();
        let head = |suffix: &str| {
            Linear::with_init(
                graph,
                hidden_size,
                output_size,
                true,
                Init::symmetric_uniform(0.05),
                Init::Zeros,
                &format!("{name}_{suffix}"),
            )
        };
        Ok(Self {
            mean_head: head("mean")?,
            std_head: head("std")?,
            cell,
            unroll,
        })
    }

    /// 噪声ε取自图的随机数发生器，固定图种子即可复现采样
    pub fn forward(
        &self,
        seed: &Var,
        state: &Var,
        edge_weight: Option<&Var>,
    ) -> Result<DistributionDecoding, GraphError> {
        let graph = seed.get_graph();
        let mut means = Vec::with_capacity(self.unroll.target_seq_len);
        let mut stds = Vec::with_capacity(self.unroll.target_seq_len);
        let (samples, state, edge_weight) = self.unroll.run(
            self.cell.as_ref(),
            seed,
            state,
            edge_weight,
            |output| {
                let mean = self.mean_head.forward(output)?;
                let std = self.std_head.forward(output)?.softplus()?;
                let noise = graph.randn(&mean.shape()?)?;
                let sample = mean.try_add(&std.try_mul(&noise)?)?;
                means.push(mean);
                stds.push(std);
                Ok(sample)
            },
        )?;
        Ok(DistributionDecoding {
            means: stack(&means)?,
            stds: stack(&stds)?,
            samples: stack(&samples)?,
            state,
            edge_weight,
        })
    }

    pub const fn target_seq_len(&self) -> usize {
        self.unroll.target_seq_len
    }

    pub const fn is_residual(&self) -> bool {
        self.unroll.residual
    }

    pub fn cell(&self) -> &Rc<C> {
        &self.cell
    }

    /// 均值头与标准差头的参数（不含单元参数）
    pub fn head_parameters(&self) -> Vec<Var> {
        [self.mean_head.parameters(), self.std_head.parameters()].concat()
    }
}

impl<C: RecurrentCell> Module for StochasticDecoderWrapper<C> {
    fn parameters(&self) -> Vec<Var> {
        [self.cell.cell_parameters(), self.head_parameters()].concat()
    }
}
