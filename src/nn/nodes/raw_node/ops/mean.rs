use super::parent;
use crate::nn::GraphError;
use crate::nn::nodes::raw_node::TraitNode;
use crate::tensor::Tensor;

/// 全元素求均值，结果为[1, 1]标量
#[derive(Clone)]
pub(in crate::nn) struct Mean;

impl TraitNode for Mean {
    fn type_name(&self) -> &'static str {
        "Mean"
    }

    fn calc_value_by_parents(&mut self, parents: &[&Tensor]) -> Result<Tensor, GraphError> {
        Ok(Tensor::scalar(parent(parents, 0)?.mean_all()))
    }

    fn calc_grad_to_parent(
        &self,
        _index: usize,
        parents: &[&Tensor],
        _value: &Tensor,
        upstream_grad: &Tensor,
    ) -> Result<Tensor, GraphError> {
        let upstream = upstream_grad.number().ok_or_else(|| {
            GraphError::ComputationError("Mean节点的上游梯度必须是标量".to_string())
        })?;
        let input = parent(parents, 0)?;
        let n = input.size().max(1) as f32;
        Ok(Tensor::full(upstream / n, input.shape()))
    }
}
