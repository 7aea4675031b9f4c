use super::parent;
use crate::nn::GraphError;
use crate::nn::nodes::raw_node::TraitNode;
use crate::tensor::Tensor;

/// 改变形状（元素总数不变）
#[derive(Clone)]
pub(in crate::nn) struct Reshape {
    input_shape: Vec<usize>,
    target_shape: Vec<usize>,
}

impl Reshape {
    pub(in crate::nn) fn new(input_shape: &[usize], target_shape: &[usize]) -> Result<Self, GraphError> {
        let input_size: usize = input_shape.iter().product();
        let target_size: usize = target_shape.iter().product();
        if input_size != target_size {
            return Err(GraphError::ShapeMismatch {
                expected: input_shape.to_vec(),
                got: target_shape.to_vec(),
                message: format!(
                    "Reshape前后元素总数必须相等：{input_size} != {target_size}"
                ),
            });
        }
        Ok(Self {
            input_shape: input_shape.to_vec(),
            target_shape: target_shape.to_vec(),
        })
    }
}

impl TraitNode for Reshape {
    fn type_name(&self) -> &'static str {
        "Reshape"
    }

    fn calc_value_by_parents(&mut self, parents: &[&Tensor]) -> Result<Tensor, GraphError> {
        Ok(parent(parents, 0)?.reshape(&self.target_shape)?)
    }

    fn calc_grad_to_parent(
        &self,
        _index: usize,
        _parents: &[&Tensor],
        _value: &Tensor,
        upstream_grad: &Tensor,
    ) -> Result<Tensor, GraphError> {
        Ok(upstream_grad.reshape(&self.input_shape)?)
    }
}
