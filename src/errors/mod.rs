/*
 * @Author       : 老董
 * @Date         : 2026-03-02
 * @Description  : crate级错误类型：张量层的`TensorError`与模型层的`ModelError`
 */

use thiserror::Error;
mod ops;
pub use self::ops::*;

use crate::nn::GraphError;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum TensorError {
    // 数字比较用
    #[error("{value_name}须{operator}{threshold}")]
    ValueMustSatisfyComparison {
        value_name: String,
        operator: ComparisonOperator,
        threshold: usize,
    },
    // 张量二元运算
    #[error(
        "形状不一致，故无法{operator}：第一个张量的形状为{tensor1_shape:?}，第二个张量的形状为{tensor2_shape:?}"
    )]
    OperatorError {
        operator: Operator,
        tensor1_shape: Vec<usize>,
        tensor2_shape: Vec<usize>,
    },
    #[error("数据长度{data_len}与形状{shape:?}不符")]
    DataShapeMismatch { data_len: usize, shape: Vec<usize> },
    #[error("维度{axis}超出张量阶数{dimension}")]
    AxisOutOfRange { axis: usize, dimension: usize },
    #[error("沿维度{axis}的区间[{start}, {end})超出长度{len}")]
    RangeOutOfBounds {
        axis: usize,
        start: usize,
        end: usize,
        len: usize,
    },
    #[error("张量列表为空")]
    EmptyList,
    #[error("张量形状不兼容")]
    IncompatibleShape,
    #[error("需要交换的维度必须是唯一且在[0, <张量维数>)范围内")]
    PermuteNeedUniqueAndInRange,
}

/// 模型层（编码器、解码器、模型族、配置、动作标签）的错误类型
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ModelError {
    #[error(transparent)]
    Graph(#[from] GraphError),
    #[error(transparent)]
    Tensor(#[from] TensorError),
    #[error("模型配置无效：{0}")]
    InvalidConfig(String),
    #[error("无法识别的动作标签：{0}")]
    UnknownAction(String),
    #[error("序列长度{len}不足，至少需要{required}帧")]
    SequenceTooShort { len: usize, required: usize },
    #[error("{0}")]
    InvalidArgument(String),
}
