use super::parent;
use crate::nn::GraphError;
use crate::nn::nodes::raw_node::TraitNode;
use crate::tensor::Tensor;

/// 绝对值节点，x = 0 处取次梯度0
#[derive(Clone)]
pub(in crate::nn) struct Abs;

impl TraitNode for Abs {
    fn type_name(&self) -> &'static str {
        "Abs"
    }

    fn calc_value_by_parents(&mut self, parents: &[&Tensor]) -> Result<Tensor, GraphError> {
        Ok(parent(parents, 0)?.abs())
    }

    fn calc_grad_to_parent(
        &self,
        _index: usize,
        parents: &[&Tensor],
        _value: &Tensor,
        upstream_grad: &Tensor,
    ) -> Result<Tensor, GraphError> {
        Ok(upstream_grad * &parent(parents, 0)?.sign())
    }
}
