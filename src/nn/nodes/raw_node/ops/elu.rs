use super::parent;
use crate::errors::Operator;
use crate::nn::GraphError;
use crate::nn::nodes::raw_node::TraitNode;
use crate::tensor::Tensor;

/// ELU（alpha=1）激活函数节点
///
/// backward: x > 0 时为1，否则为e^x = elu(x) + 1
#[derive(Clone)]
pub(in crate::nn) struct Elu;

impl TraitNode for Elu {
    fn type_name(&self) -> &'static str {
        "Elu"
    }

    fn calc_value_by_parents(&mut self, parents: &[&Tensor]) -> Result<Tensor, GraphError> {
        Ok(parent(parents, 0)?.elu())
    }

    fn calc_grad_to_parent(
        &self,
        _index: usize,
        parents: &[&Tensor],
        value: &Tensor,
        upstream_grad: &Tensor,
    ) -> Result<Tensor, GraphError> {
        let x = parent(parents, 0)?;
        let local_grad = x.zip_broadcast(value, Operator::Mul, |x, y| {
            if x > 0.0 { 1.0 } else { y + 1.0 }
        })?;
        Ok(upstream_grad * &local_grad)
    }
}
