use super::parent;
use crate::nn::GraphError;
use crate::nn::nodes::raw_node::TraitNode;
use crate::tensor::Tensor;

/// SoftPlus 激活函数节点
///
/// forward: softplus(x) = ln(1 + e^x)（数值稳定实现，见`Tensor::softplus`）
/// backward: d(softplus)/dx = sigmoid(x)
#[derive(Clone)]
pub(in crate::nn) struct SoftPlus;

impl TraitNode for SoftPlus {
    fn type_name(&self) -> &'static str {
        "SoftPlus"
    }

    fn calc_value_by_parents(&mut self, parents: &[&Tensor]) -> Result<Tensor, GraphError> {
        Ok(parent(parents, 0)?.softplus())
    }

    fn calc_grad_to_parent(
        &self,
        _index: usize,
        parents: &[&Tensor],
        _value: &Tensor,
        upstream_grad: &Tensor,
    ) -> Result<Tensor, GraphError> {
        Ok(upstream_grad * &parent(parents, 0)?.sigmoid())
    }
}
