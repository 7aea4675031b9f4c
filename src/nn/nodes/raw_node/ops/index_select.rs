use super::parent;
use crate::nn::GraphError;
use crate::nn::nodes::raw_node::TraitNode;
use crate::tensor::Tensor;

/// 沿`axis`按下标挑选（下标可重复），反向时把梯度累加回被选中的位置
#[derive(Clone)]
pub(in crate::nn) struct IndexSelect {
    axis: usize,
    indices: Vec<usize>,
    input_shape: Vec<usize>,
}

impl IndexSelect {
    pub(in crate::nn) fn new(
        input_shape: &[usize],
        axis: usize,
        indices: &[usize],
    ) -> Result<Self, GraphError> {
        let axis_len = input_shape.get(axis).copied().ok_or_else(|| {
            GraphError::InvalidOperation(format!(
                "IndexSelect的轴{axis}超出了{}维父节点的范围",
                input_shape.len()
            ))
        })?;
        if let Some(bad) = indices.iter().find(|&&i| i >= axis_len) {
            return Err(GraphError::InvalidOperation(format!(
                "IndexSelect的下标{bad}超出了第{axis}维的长度{axis_len}"
            )));
        }
        Ok(Self {
            axis,
            indices: indices.to_vec(),
            input_shape: input_shape.to_vec(),
        })
    }
}

impl TraitNode for IndexSelect {
    fn type_name(&self) -> &'static str {
        "IndexSelect"
    }

    fn calc_value_by_parents(&mut self, parents: &[&Tensor]) -> Result<Tensor, GraphError> {
        Ok(parent(parents, 0)?.index_select(self.axis, &self.indices)?)
    }

    fn calc_grad_to_parent(
        &self,
        _index: usize,
        _parents: &[&Tensor],
        _value: &Tensor,
        upstream_grad: &Tensor,
    ) -> Result<Tensor, GraphError> {
        Ok(upstream_grad.index_scatter_add(&self.input_shape, self.axis, &self.indices)?)
    }
}
