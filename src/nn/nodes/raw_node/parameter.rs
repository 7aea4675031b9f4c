use super::{TraitNode, leaf_has_no_parents};
use crate::nn::GraphError;
use crate::tensor::Tensor;

/// 参数节点：可训练的叶子，梯度跨多次反向传播累加，直到`zero_grad`
#[derive(Clone)]
pub(in crate::nn) struct Parameter;

impl TraitNode for Parameter {
    fn type_name(&self) -> &'static str {
        "Parameter"
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

    fn is_trainable(&self) -> bool {
        true
    }
}
