/*
 * @Author       : 老董
 * @Date         : 2026-03-03
 * @Description  : 张量的四则运算（支持NumPy式广播）
 *
 * 广播规则：从最后一维向前对齐，每一维要么相等，要么其中一个为1。
 * 运算符重载（`&a + &b`等）仅用于形状已知兼容的内部场景，形状不兼容时panic；
 * 需要错误处理时请使用`zip_broadcast`。
 */

use ndarray::{IxDyn, Zip};
use std::ops::{Add, Div, Mul, Neg, Sub};

use crate::errors::{Operator, TensorError};
use crate::tensor::Tensor;

impl Tensor {
    /// 计算两个形状广播后的形状
    pub fn broadcast_shape(
        shape1: &[usize],
        shape2: &[usize],
        operator: Operator,
    ) -> Result<Vec<usize>, TensorError> {
        let ndim = shape1.len().max(shape2.len());
        let offset1 = ndim - shape1.len();
        let offset2 = ndim - shape2.len();
        (0..ndim)
            .map(|i| {
                let d1 = if i >= offset1 { shape1[i - offset1] } else { 1 };
                let d2 = if i >= offset2 { shape2[i - offset2] } else { 1 };
                if d1 == d2 || d2 == 1 {
                    Ok(d1)
                } else if d1 == 1 {
                    Ok(d2)
                } else {
                    Err(TensorError::OperatorError {
                        operator,
                        tensor1_shape: shape1.to_vec(),
                        tensor2_shape: shape2.to_vec(),
                    })
                }
            })
            .collect()
    }

    /// 按广播规则逐元素地组合两个张量
    pub fn zip_broadcast<F>(
        &self,
        other: &Self,
        operator: Operator,
        f: F,
    ) -> Result<Self, TensorError>
    where
        F: Fn(f32, f32) -> f32,
    {
        let shape = Self::broadcast_shape(self.shape(), other.shape(), operator)?;
        let incompatible = || TensorError::OperatorError {
            operator,
            tensor1_shape: self.shape().to_vec(),
            tensor2_shape: other.shape().to_vec(),
        };
        let a = self
            .as_array()
            .broadcast(IxDyn(&shape))
            .ok_or_else(incompatible)?;
        let b = other
            .as_array()
            .broadcast(IxDyn(&shape))
            .ok_or_else(incompatible)?;
        Ok(Self::from_array(
            Zip::from(&a).and(&b).map_collect(|&x, &y| f(x, y)),
        ))
    }

    /// 逐元素映射
    pub fn map<F: Fn(f32) -> f32>(&self, f: F) -> Self {
        Self::from_array(self.as_array().mapv(f))
    }
}

macro_rules! impl_binary_op {
    ($trait:ident, $method:ident, $operator:expr, $op:tt) => {
        impl $trait<&Tensor> for &Tensor {
            type Output = Tensor;

            /// # Panics
            /// 两个张量的形状无法广播时panic
            fn $method(self, rhs: &Tensor) -> Tensor {
                match self.zip_broadcast(rhs, $operator, |x, y| x $op y) {
                    Ok(tensor) => tensor,
                    Err(e) => panic!("{e}"),
                }
            }
        }

        impl $trait<f32> for &Tensor {
            type Output = Tensor;

            fn $method(self, rhs: f32) -> Tensor {
                self.map(|x| x $op rhs)
            }
        }
    };
}

impl_binary_op!(Add, add, Operator::Add, +);
impl_binary_op!(Sub, sub, Operator::Sub, -);
impl_binary_op!(Mul, mul, Operator::Mul, *);
impl_binary_op!(Div, div, Operator::Div, /);

impl Neg for &Tensor {
    type Output = Tensor;

    fn neg(self) -> Tensor {
        self.map(|x| -x)
    }
}
