/*
 * @Author       : 老董
 * @Date         : 2026-03-04
 * @Description  : 原始节点：每种节点只负责“由父节点的值算出自身的值”与
 *                 “由上游梯度算出对某个父节点的梯度（VJP）”两件事
 */

mod input;
mod ops;
mod parameter;

pub(in crate::nn) use input::Input;
pub(in crate::nn) use ops::*;
pub(in crate::nn) use parameter::Parameter;

use enum_dispatch::enum_dispatch;

use crate::nn::GraphError;
use crate::tensor::Tensor;

#[enum_dispatch]
#[derive(Clone)]
pub(in crate::nn) enum NodeType {
    Input,
    Parameter,
    /*↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓算子↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓*/
    Add,
    Subtract,
    Multiply,
    Divide,
    ScalarMultiply,
    MatMul,
    Concat,
    Reshape,
    Permute,
    Narrow,
    IndexSelect,
    Sigmoid,
    Tanh,
    SoftPlus,
    Elu,
    Abs,
    Ln,
    Dropout,
    BatchNormalize,
    Sum,
    Mean,
    /*↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑算子↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑*/
}

#[enum_dispatch(NodeType)]
pub(in crate::nn) trait TraitNode {
    /// 节点类型名，未指定节点名时据此生成类似"MatMul_3"的名称
    fn type_name(&self) -> &'static str;

    /// 根据父节点的值计算本节点的值（父节点的值在调用前均已算好）
    fn calc_value_by_parents(&mut self, parents: &[&Tensor]) -> Result<Tensor, GraphError>;

    /// 由结果节点对本节点的梯度`upstream_grad`，计算结果节点对第`index`个父节点的梯度
    fn calc_grad_to_parent(
        &self,
        index: usize,
        parents: &[&Tensor],
        value: &Tensor,
        upstream_grad: &Tensor,
    ) -> Result<Tensor, GraphError>;

    /// 返回该节点的参数是否应该在训练过程中被更新
    fn is_trainable(&self) -> bool {
        false
    }
}

/// 叶子节点（输入、参数）没有父节点，不参与前向计算与梯度分发
fn leaf_has_no_parents(type_name: &str) -> GraphError {
    GraphError::InvalidOperation(format!("{type_name}节点没有父节点"))
}
