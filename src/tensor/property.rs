/*
 * @Author       : 老董
 * @Date         : 2026-03-02
 * @Description  : 本类仅包含一些属性方法，不包含任何运算方法，所以不会需要用到mut
 */

use super::Tensor;
use ndarray::{ArrayD, ArrayViewD, IxDyn};

impl Tensor {
    pub fn view(&self) -> ArrayViewD<'_, f32> {
        self.data.view()
    }

    pub(crate) const fn as_array(&self) -> &ArrayD<f32> {
        &self.data
    }

    /// 若为向量，`shape`可以是[n]、[1,n]、[n,1]；
    /// 若为矩阵，`shape`可以是[n,m]；
    /// 若为更高维度的数组，`shape`可以是[c,n,m,...]。
    pub fn shape(&self) -> &[usize] {
        self.data.shape()
    }

    /// 张量的维（dim）数、阶（rank）数
    pub fn dimension(&self) -> usize {
        self.data.ndim()
    }

    /// 计算张量中所有元素的数量
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// 判断两个张量的形状是否严格一致。如：形状为 [1, 4]，[1, 4]和[4]是不一致的，会返回false
    pub fn is_same_shape(&self, other: &Self) -> bool {
        self.shape() == other.shape()
    }

    /// 判断张量是否为标量
    pub fn is_scalar(&self) -> bool {
        self.size() == 1
    }

    /// 转化为纯数（number）。若为标量，则返回Some(number)，否则返回None
    pub fn number(&self) -> Option<f32> {
        if self.is_scalar() {
            self.data.iter().next().copied()
        } else {
            None
        }
    }

    /// 按多维下标取单个元素，下标越界返回None
    pub fn get(&self, index: &[usize]) -> Option<f32> {
        self.data.get(IxDyn(index)).copied()
    }

    /// 按行优先（逻辑）顺序导出所有元素
    pub fn to_vec(&self) -> Vec<f32> {
        self.data.iter().copied().collect()
    }

    /// 所有元素是否都满足`predicate`
    pub fn all(&self, predicate: impl Fn(f32) -> bool) -> bool {
        self.data.iter().all(|&x| predicate(x))
    }

    /// 两个同形张量对应元素差的绝对值的最大值（形状不同则返回None）
    pub fn max_abs_diff(&self, other: &Self) -> Option<f32> {
        if !self.is_same_shape(other) {
            return None;
        }
        Some(
            self.data
                .iter()
                .zip(other.data.iter())
                .fold(0.0_f32, |acc, (a, b)| acc.max((a - b).abs())),
        )
    }
}
