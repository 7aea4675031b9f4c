use super::{check_broadcast, parent};
use crate::errors::Operator;
use crate::nn::GraphError;
use crate::nn::nodes::raw_node::TraitNode;
use crate::tensor::Tensor;

/// 逐元素加法（支持广播，如[batch, n] + [1, n]）
#[derive(Clone)]
pub(in crate::nn) struct Add;

impl Add {
    pub(in crate::nn) fn new(shape1: &[usize], shape2: &[usize]) -> Result<Self, GraphError> {
        check_broadcast("Add", shape1, shape2, Operator::Add)?;
        Ok(Self)
    }
}

impl TraitNode for Add {
    fn type_name(&self) -> &'static str {
        "Add"
    }

    fn calc_value_by_parents(&mut self, parents: &[&Tensor]) -> Result<Tensor, GraphError> {
        Ok(parent(parents, 0)?.zip_broadcast(parent(parents, 1)?, Operator::Add, |a, b| a + b)?)
    }

    fn calc_grad_to_parent(
        &self,
        index: usize,
        parents: &[&Tensor],
        _value: &Tensor,
        upstream_grad: &Tensor,
    ) -> Result<Tensor, GraphError> {
        Ok(upstream_grad.sum_to_shape(parent(parents, index)?.shape())?)
    }
}
