use super::{check_broadcast, parent};
use crate::errors::Operator;
use crate::nn::GraphError;
use crate::nn::nodes::raw_node::TraitNode;
use crate::tensor::Tensor;

/// 逐元素减法：parents[0] - parents[1]（支持广播）
#[derive(Clone)]
pub(in crate::nn) struct Subtract;

impl Subtract {
    pub(in crate::nn) fn new(shape1: &[usize], shape2: &[usize]) -> Result<Self, GraphError> {
        check_broadcast("Subtract", shape1, shape2, Operator::Sub)?;
        Ok(Self)
    }
}

impl TraitNode for Subtract {
    fn type_name(&self) -> &'static str {
        "Subtract"
    }

    fn calc_value_by_parents(&mut self, parents: &[&Tensor]) -> Result<Tensor, GraphError> {
        Ok(parent(parents, 0)?.zip_broadcast(parent(parents, 1)?, Operator::Sub, |a, b| a - b)?)
    }

    fn calc_grad_to_parent(
        &self,
        index: usize,
        parents: &[&Tensor],
        _value: &Tensor,
        upstream_grad: &Tensor,
    ) -> Result<Tensor, GraphError> {
        let target_shape = parent(parents, index)?.shape();
        if index == 0 {
            Ok(upstream_grad.sum_to_shape(target_shape)?)
        } else {
            Ok((-upstream_grad).sum_to_shape(target_shape)?)
        }
    }
}
