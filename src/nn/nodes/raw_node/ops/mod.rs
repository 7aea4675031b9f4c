mod abs;
mod add;
mod batch_normalize;
mod concat;
mod divide;
mod dropout;
mod elu;
mod index_select;
mod ln;
mod mat_mul;
mod mean;
mod multiply;
mod narrow;
mod permute;
mod reshape;
mod scalar_multiply;
mod sigmoid;
mod softplus;
mod subtract;
mod sum;
mod tanh;

pub(in crate::nn) use abs::Abs;
pub(in crate::nn) use add::Add;
pub(in crate::nn) use batch_normalize::{BatchNormalize, BatchStatistics};
pub(in crate::nn) use concat::Concat;
pub(in crate::nn) use divide::Divide;
pub(in crate::nn) use dropout::Dropout;
pub(in crate::nn) use elu::Elu;
pub(in crate::nn) use index_select::IndexSelect;
pub(in crate::nn) use ln::Ln;
pub(in crate::nn) use mat_mul::MatMul;
pub(in crate::nn) use mean::Mean;
pub(in crate::nn) use multiply::Multiply;
pub(in crate::nn) use narrow::Narrow;
pub(in crate::nn) use permute::Permute;
pub(in crate::nn) use reshape::Reshape;
pub(in crate::nn) use scalar_multiply::ScalarMultiply;
pub(in crate::nn) use sigmoid::Sigmoid;
pub(in crate::nn) use softplus::SoftPlus;
pub(in crate::nn) use subtract::Subtract;
pub(in crate::nn) use sum::Sum;
pub(in crate::nn) use tanh::Tanh;

use crate::errors::Operator;
use crate::nn::GraphError;
use crate::tensor::Tensor;

/// 校验两个父节点的形状可以广播，供逐元素二元算子复用
fn check_broadcast(
    type_name: &str,
    shape1: &[usize],
    shape2: &[usize],
    operator: Operator,
) -> Result<(), GraphError> {
    Tensor::broadcast_shape(shape1, shape2, operator).map_err(|_| GraphError::ShapeMismatch {
        expected: shape1.to_vec(),
        got: shape2.to_vec(),
        message: format!("{type_name}节点的两个父节点形状无法广播"),
    })?;
    Ok(())
}

/// 取出第`index`个父节点的值
fn parent<'a>(parents: &[&'a Tensor], index: usize) -> Result<&'a Tensor, GraphError> {
    parents.get(index).copied().ok_or_else(|| {
        GraphError::ComputationError(format!(
            "缺少第{index}个父节点的值。不该触及本错误，否则说明crate代码有问题"
        ))
    })
}
