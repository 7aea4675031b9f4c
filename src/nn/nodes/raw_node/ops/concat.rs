use crate::nn::GraphError;
use crate::nn::nodes::raw_node::TraitNode;
use crate::tensor::Tensor;

/// 沿`axis`拼接多个父节点，反向时按各自的区间切回梯度
#[derive(Clone)]
pub(in crate::nn) struct Concat {
    axis: usize,
    /// 各父节点在`axis`上的起始位置
    offsets: Vec<usize>,
    lens: Vec<usize>,
}

impl Concat {
    pub(in crate::nn) fn new(shapes: &[&[usize]], axis: usize) -> Result<Self, GraphError> {
        let first = shapes.first().ok_or_else(|| {
            GraphError::InvalidOperation("Concat节点至少需要1个父节点".to_string())
        })?;
        if axis >= first.len() {
            return Err(GraphError::InvalidOperation(format!(
                "Concat的轴{axis}超出了{}维父节点的范围",
                first.len()
            )));
        }
        let mut offsets = Vec::with_capacity(shapes.len());
        let mut lens = Vec::with_capacity(shapes.len());
        let mut offset = 0;
        for shape in shapes {
            let compatible = shape.len() == first.len()
                && shape
                    .iter()
                    .zip(first.iter())
                    .enumerate()
                    .all(|(i, (a, b))| i == axis || a == b);
            if !compatible {
                return Err(GraphError::ShapeMismatch {
                    expected: first.to_vec(),
                    got: shape.to_vec(),
                    message: format!("Concat的父节点除第{axis}维外形状必须一致"),
                });
            }
            offsets.push(offset);
            lens.push(shape[axis]);
            offset += shape[axis];
        }
        Ok(Self { axis, offsets, lens })
    }
}

impl TraitNode for Concat {
    fn type_name(&self) -> &'static str {
        "Concat"
    }

    fn calc_value_by_parents(&mut self, parents: &[&Tensor]) -> Result<Tensor, GraphError> {
        Ok(Tensor::concat(parents, self.axis)?)
    }

    fn calc_grad_to_parent(
        &self,
        index: usize,
        _parents: &[&Tensor],
        _value: &Tensor,
        upstream_grad: &Tensor,
    ) -> Result<Tensor, GraphError> {
        let (start, len) = self
            .offsets
            .get(index)
            .zip(self.lens.get(index))
            .ok_or_else(|| GraphError::InvalidOperation(format!("Concat没有第{index}个父节点")))?;
        Ok(upstream_grad.narrow(self.axis, *start, *len)?)
    }
}
