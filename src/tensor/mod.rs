/*
 * @Author       : 老董
 * @Date         : 2026-03-02
 * @Description  : 张量（Tensor）：计算图中所有数值的载体，基于`ndarray`的动态维度f32数组
 */

use ndarray::{Array, ArrayD, IxDyn};
use rand::Rng;
use rand::distributions::{Distribution, Uniform};

use crate::errors::TensorError;

mod ops {
    pub mod activation;
    pub mod arith;
    pub mod mat_mul;
    pub mod reduce;
}

mod property;
mod shape;

#[cfg(test)]
mod tests;

/// 定义张量的结构体。其可以是标量、向量、矩阵或更高维度的数组。
/// 注：只要通Tensor初始化的都是张量（即使标量也是张量）；
/// 而通常意义上的数字（类型为usize、i32、f64等）就只是纯数（number），在这里不被认为是张量。
#[derive(Debug, Clone, PartialEq)]
pub struct Tensor {
    data: ArrayD<f32>,
}

impl Tensor {
    /// 创建一个张量。`data`的长度必须和`shape`中所有元素的乘积相等。
    pub fn new(data: &[f32], shape: &[usize]) -> Result<Self, TensorError> {
        let data = Array::from_shape_vec(IxDyn(shape), data.to_vec()).map_err(|_| {
            TensorError::DataShapeMismatch {
                data_len: data.len(),
                shape: shape.to_vec(),
            }
        })?;
        Ok(Self { data })
    }

    /// 创建一个形状为[1, 1]的标量张量
    pub fn scalar(value: f32) -> Self {
        Self::full(value, &[1, 1])
    }

    pub fn zeros(shape: &[usize]) -> Self {
        Self::full(0.0, shape)
    }

    pub fn ones(shape: &[usize]) -> Self {
        Self::full(1.0, shape)
    }

    /// 创建所有元素都为`value`的张量
    pub fn full(value: f32, shape: &[usize]) -> Self {
        Self {
            data: Array::from_elem(IxDyn(shape), value),
        }
    }

    /// 创建一个随机张量，其值在[min, max]的闭区间
    pub fn uniform_with_rng<R: Rng + ?Sized>(
        min: f32,
        max: f32,
        shape: &[usize],
        rng: &mut R,
    ) -> Self {
        let dist = Uniform::new_inclusive(min, max);
        Self {
            data: Array::from_shape_simple_fn(IxDyn(shape), || dist.sample(rng)),
        }
    }

    /// 创建一个服从正态分布的随机张量（Box-Muller变换）
    pub fn normal_with_rng<R: Rng + ?Sized>(
        mean: f32,
        std_dev: f32,
        shape: &[usize],
        rng: &mut R,
    ) -> Self {
        let unit = Uniform::new(f32::MIN_POSITIVE, 1.0);
        Self {
            data: Array::from_shape_simple_fn(IxDyn(shape), || {
                let u1 = unit.sample(rng);
                let u2 = unit.sample(rng);
                let r = (-2.0 * u1.ln()).sqrt();
                let theta = 2.0 * std::f32::consts::PI * u2;
                mean + std_dev * r * theta.cos()
            }),
        }
    }

    pub(crate) fn from_array(data: ArrayD<f32>) -> Self {
        Self { data }
    }
}
