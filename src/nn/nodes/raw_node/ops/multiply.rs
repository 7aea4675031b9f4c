use super::{check_broadcast, parent};
use crate::errors::Operator;
use crate::nn::GraphError;
use crate::nn::nodes::raw_node::TraitNode;
use crate::tensor::Tensor;

/// 逐元素乘法（支持广播）
#[derive(Clone)]
pub(in crate::nn) struct Multiply;

impl Multiply {
    pub(in crate::nn) fn new(shape1: &[usize], shape2: &[usize]) -> Result<Self, GraphError> {
        check_broadcast("Multiply", shape1, shape2, Operator::Mul)?;
        Ok(Self)
    }
}

impl TraitNode for Multiply {
    fn type_name(&self) -> &'static str {
        "Multiply"
    }

    fn calc_value_by_parents(&mut self, parents: &[&Tensor]) -> Result<Tensor, GraphError> {
        Ok(parent(parents, 0)?.zip_broadcast(parent(parents, 1)?, Operator::Mul, |a, b| a * b)?)
    }

    fn calc_grad_to_parent(
        &self,
        index: usize,
        parents: &[&Tensor],
        _value: &Tensor,
        upstream_grad: &Tensor,
    ) -> Result<Tensor, GraphError> {
        // d(a*b)/da = b，d(a*b)/db = a
        let other = parent(parents, 1 - index.min(1))?;
        Ok((upstream_grad * other).sum_to_shape(parent(parents, index)?.shape())?)
    }
}
