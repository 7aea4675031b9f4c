use ndarray::Axis;

use crate::errors::{Operator, TensorError};
use crate::tensor::Tensor;

impl Tensor {
    pub fn sum_all(&self) -> f32 {
        self.as_array().sum()
    }

    /// 所有元素的均值（空张量返回0）
    pub fn mean_all(&self) -> f32 {
        if self.size() == 0 {
            0.0
        } else {
            self.sum_all() / self.size() as f32
        }
    }

    /// 沿`axis`求和，并保留该维（长度变为1）
    pub fn sum_axis_keepdims(&self, axis: usize) -> Result<Self, TensorError> {
        self.check_axis(axis)?;
        Ok(Self::from_array(
            self.as_array().sum_axis(Axis(axis)).insert_axis(Axis(axis)),
        ))
    }

    /// 把（广播后的）梯度按求和归约回`target`形状，即广播的逆运算
    pub fn sum_to_shape(&self, target: &[usize]) -> Result<Self, TensorError> {
        if self.shape() == target {
            return Ok(self.clone());
        }
        let incompatible = || TensorError::OperatorError {
            operator: Operator::Add,
            tensor1_shape: self.shape().to_vec(),
            tensor2_shape: target.to_vec(),
        };
        if target.len() > self.dimension() {
            return Err(incompatible());
        }

        let mut data = self.as_array().clone();
        // 先消去广播时补出的前导维度
        while data.ndim() > target.len() {
            data = data.sum_axis(Axis(0));
        }
        for (axis, &dim) in target.iter().enumerate() {
            if dim == 1 && data.shape()[axis] != 1 {
                data = data.sum_axis(Axis(axis)).insert_axis(Axis(axis));
            }
        }
        if data.shape() != target {
            return Err(incompatible());
        }
        Ok(Self::from_array(data))
    }
}
