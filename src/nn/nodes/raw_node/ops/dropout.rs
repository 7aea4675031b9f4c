use super::parent;
use crate::nn::GraphError;
use crate::nn::nodes::raw_node::TraitNode;
use crate::tensor::Tensor;

/// Dropout 节点（inverted dropout）
///
/// 掩码在建节点时由图的随机数生成器采样，元素为0或1/(1-p)，前向与反向共用同一掩码
#[derive(Clone)]
pub(in crate::nn) struct Dropout {
    mask: Tensor,
}

impl Dropout {
    pub(in crate::nn) fn new(input_shape: &[usize], mask: Tensor) -> Result<Self, GraphError> {
        if mask.shape() != input_shape {
            return Err(GraphError::ShapeMismatch {
                expected: input_shape.to_vec(),
                got: mask.shape().to_vec(),
                message: "Dropout掩码的形状必须与父节点一致".to_string(),
            });
        }
        Ok(Self { mask })
    }
}

impl TraitNode for Dropout {
    fn type_name(&self) -> &'static str {
        "Dropout"
    }

    fn calc_value_by_parents(&mut self, parents: &[&Tensor]) -> Result<Tensor, GraphError> {
        Ok(parent(parents, 0)? * &self.mask)
    }

    fn calc_grad_to_parent(
        &self,
        _index: usize,
        _parents: &[&Tensor],
        _value: &Tensor,
        upstream_grad: &Tensor,
    ) -> Result<Tensor, GraphError> {
        Ok(upstream_grad * &self.mask)
    }
}
