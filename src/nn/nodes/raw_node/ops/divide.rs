use super::{check_broadcast, parent};
use crate::errors::Operator;
use crate::nn::GraphError;
use crate::nn::nodes::raw_node::TraitNode;
use crate::tensor::Tensor;

/// 逐元素除法：parents[0] / parents[1]（支持广播）
///
/// 除数中的零元素不在此处拦截，调用方需保证前置条件（见`edge_to_node`）
#[derive(Clone)]
pub(in crate::nn) struct Divide;

impl Divide {
    pub(in crate::nn) fn new(shape1: &[usize], shape2: &[usize]) -> Result<Self, GraphError> {
        check_broadcast("Divide", shape1, shape2, Operator::Div)?;
        Ok(Self)
    }
}

impl TraitNode for Divide {
    fn type_name(&self) -> &'static str {
        "Divide"
    }

    fn calc_value_by_parents(&mut self, parents: &[&Tensor]) -> Result<Tensor, GraphError> {
        Ok(parent(parents, 0)?.zip_broadcast(parent(parents, 1)?, Operator::Div, |a, b| a / b)?)
    }

    fn calc_grad_to_parent(
        &self,
        index: usize,
        parents: &[&Tensor],
        value: &Tensor,
        upstream_grad: &Tensor,
    ) -> Result<Tensor, GraphError> {
        let divisor = parent(parents, 1)?;
        let target_shape = parent(parents, index)?.shape();
        if index == 0 {
            // d(a/b)/da = 1/b
            Ok((upstream_grad / divisor).sum_to_shape(target_shape)?)
        } else {
            // d(a/b)/db = -a/b² = -(a/b)/b
            let grad = &(upstream_grad * value) / divisor;
            Ok((-&grad).sum_to_shape(target_shape)?)
        }
    }
}
