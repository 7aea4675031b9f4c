use ndarray::Ix2;

use crate::errors::{Operator, TensorError};
use crate::tensor::Tensor;

impl Tensor {
    /// 二维矩阵乘法：[m, k] @ [k, n] -> [m, n]
    pub fn mat_mul(&self, other: &Self) -> Result<Self, TensorError> {
        let incompatible = || TensorError::OperatorError {
            operator: Operator::MatMul,
            tensor1_shape: self.shape().to_vec(),
            tensor2_shape: other.shape().to_vec(),
        };
        let a = self
            .as_array()
            .view()
            .into_dimensionality::<Ix2>()
            .map_err(|_| incompatible())?;
        let b = other
            .as_array()
            .view()
            .into_dimensionality::<Ix2>()
            .map_err(|_| incompatible())?;
        if a.ncols() != b.nrows() {
            return Err(incompatible());
        }
        Ok(Self::from_array(a.dot(&b).into_dyn()))
    }
}
