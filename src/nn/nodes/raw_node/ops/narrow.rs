use super::parent;
use crate::nn::GraphError;
use crate::nn::nodes::raw_node::TraitNode;
use crate::tensor::Tensor;

/// 沿`axis`截取[start, start + len)，反向时梯度写回原区间、其余位置为0
#[derive(Clone)]
pub(in crate::nn) struct Narrow {
    axis: usize,
    start: usize,
    len: usize,
    input_shape: Vec<usize>,
}

impl Narrow {
    pub(in crate::nn) fn new(
        input_shape: &[usize],
        axis: usize,
        start: usize,
        len: usize,
    ) -> Result<Self, GraphError> {
        let axis_len = input_shape.get(axis).copied().ok_or_else(|| {
            GraphError::InvalidOperation(format!(
                "Narrow的轴{axis}超出了{}维父节点的范围",
                input_shape.len()
            ))
        })?;
        if start + len > axis_len {
            return Err(GraphError::InvalidOperation(format!(
                "Narrow的区间[{start}, {})超出了第{axis}维的长度{axis_len}",
                start + len
            )));
        }
        Ok(Self {
            axis,
            start,
            len,
            input_shape: input_shape.to_vec(),
        })
    }
}

impl TraitNode for Narrow {
    fn type_name(&self) -> &'static str {
        "Narrow"
    }

    fn calc_value_by_parents(&mut self, parents: &[&Tensor]) -> Result<Tensor, GraphError> {
        Ok(parent(parents, 0)?.narrow(self.axis, self.start, self.len)?)
    }

    fn calc_grad_to_parent(
        &self,
        _index: usize,
        _parents: &[&Tensor],
        _value: &Tensor,
        upstream_grad: &Tensor,
    ) -> Result<Tensor, GraphError> {
        Ok(upstream_grad.embed_into(&self.input_shape, self.axis, self.start)?)
    }
}
