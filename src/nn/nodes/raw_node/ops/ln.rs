use super::parent;
use crate::nn::GraphError;
use crate::nn::nodes::raw_node::TraitNode;
use crate::tensor::Tensor;

/// 自然对数节点，backward: 1/x
#[derive(Clone)]
pub(in crate::nn) struct Ln;

impl TraitNode for Ln {
    fn type_name(&self) -> &'static str {
        "Ln"
    }

    fn calc_value_by_parents(&mut self, parents: &[&Tensor]) -> Result<Tensor, GraphError> {
        Ok(parent(parents, 0)?.ln())
    }

    fn calc_grad_to_parent(
        &self,
        _index: usize,
        parents: &[&Tensor],
        _value: &Tensor,
        upstream_grad: &Tensor,
    ) -> Result<Tensor, GraphError> {
        Ok(upstream_grad / parent(parents, 0)?)
    }
}
