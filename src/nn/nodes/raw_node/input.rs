use super::{TraitNode, leaf_has_no_parents};
use crate::nn::GraphError;
use crate::tensor::Tensor;

/// 输入节点：数据、常量（如关联矩阵）、噪声等，不接收梯度
#[derive(Clone)]
pub(in crate::nn) struct Input;

impl TraitNode for Input {
    fn type_name(&self) -> &'static str {
        "Input"
    }

    fn calc_value_by_parents(&mut self, _parents: &[&Tensor]) -> Result<Tensor, GraphError> {
        Err(leaf_has_no_parents(self.type_name()))
    }

    fn calc_grad_to_parent(
        &self,
        _index: usize,
        _parents: &[&Tensor],
        _value: &Tensor,
        _upstream_grad: &Tensor,
    ) -> Result<Tensor, GraphError> {
        Err(leaf_has_no_parents(self.type_name()))
    }
}
