use super::parent;
use crate::nn::GraphError;
use crate::nn::nodes::raw_node::TraitNode;
use crate::tensor::Tensor;

/// 维度重排，反向时按逆排列还原梯度
#[derive(Clone)]
pub(in crate::nn) struct Permute {
    axes: Vec<usize>,
    inverse: Vec<usize>,
}

impl Permute {
    pub(in crate::nn) fn new(input_shape: &[usize], axes: &[usize]) -> Result<Self, GraphError> {
        let ndim = input_shape.len();
        let mut inverse = vec![usize::MAX; ndim];
        if axes.len() != ndim {
            return Err(GraphError::DimensionMismatch {
                expected: ndim,
                got: axes.len(),
                message: "Permute的轴数须与父节点维数相同".to_string(),
            });
        }
        for (i, &axis) in axes.iter().enumerate() {
            if axis >= ndim || inverse[axis] != usize::MAX {
                return Err(GraphError::InvalidOperation(format!(
                    "Permute的轴{axes:?}必须是0..{ndim}的一个排列"
                )));
            }
            inverse[axis] = i;
        }
        Ok(Self {
            axes: axes.to_vec(),
            inverse,
        })
    }
}

impl TraitNode for Permute {
    fn type_name(&self) -> &'static str {
        "Permute"
    }

    fn calc_value_by_parents(&mut self, parents: &[&Tensor]) -> Result<Tensor, GraphError> {
        Ok(parent(parents, 0)?.permute(&self.axes)?)
    }

    fn calc_grad_to_parent(
        &self,
        _index: usize,
        _parents: &[&Tensor],
        _value: &Tensor,
        upstream_grad: &Tensor,
    ) -> Result<Tensor, GraphError> {
        Ok(upstream_grad.permute(&self.inverse)?)
    }
}
