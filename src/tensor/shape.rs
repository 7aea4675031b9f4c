/*
 * @Author       : 老董
 * @Date         : 2026-03-03
 * @Description  : 张量的形状变换：重塑、换轴、截取、按下标挑选、拼接
 */

use ndarray::{Array, ArrayD, ArrayView, Axis, IxDyn, Slice};

use super::Tensor;
use crate::errors::{Operator, TensorError};

impl Tensor {
    pub(crate) fn check_axis(&self, axis: usize) -> Result<(), TensorError> {
        if axis >= self.dimension() {
            return Err(TensorError::AxisOutOfRange {
                axis,
                dimension: self.dimension(),
            });
        }
        Ok(())
    }

    /// 按逻辑（行优先）顺序重塑形状，元素总数必须不变
    pub fn reshape(&self, shape: &[usize]) -> Result<Self, TensorError> {
        let data = Array::from_shape_vec(IxDyn(shape), self.to_vec()).map_err(|_| {
            TensorError::DataShapeMismatch {
                data_len: self.size(),
                shape: shape.to_vec(),
            }
        })?;
        Ok(Self::from_array(data))
    }

    /// 在`axis`处插入长度为1的新维度
    pub fn unsqueeze(&self, axis: usize) -> Result<Self, TensorError> {
        if axis > self.dimension() {
            return Err(TensorError::AxisOutOfRange {
                axis,
                dimension: self.dimension(),
            });
        }
        Ok(Self::from_array(self.as_array().clone().insert_axis(Axis(axis))))
    }

    /// 按`axes`重新排列各维，如形状[2, 3, 4]经`permute(&[2, 0, 1])`后为[4, 2, 3]
    pub fn permute(&self, axes: &[usize]) -> Result<Self, TensorError> {
        let mut seen = vec![false; self.dimension()];
        if axes.len() != self.dimension() {
            return Err(TensorError::PermuteNeedUniqueAndInRange);
        }
        for &axis in axes {
            if axis >= seen.len() || seen[axis] {
                return Err(TensorError::PermuteNeedUniqueAndInRange);
            }
            seen[axis] = true;
        }
        let permuted = self.as_array().view().permuted_axes(IxDyn(axes));
        Ok(Self::from_array(permuted.as_standard_layout().into_owned()))
    }

    /// 二维转置
    pub fn transpose(&self) -> Result<Self, TensorError> {
        self.permute(&[1, 0])
    }

    /// 沿`axis`截取[start, start + len)区间
    pub fn narrow(&self, axis: usize, start: usize, len: usize) -> Result<Self, TensorError> {
        self.check_axis(axis)?;
        let axis_len = self.shape()[axis];
        if start + len > axis_len {
            return Err(TensorError::RangeOutOfBounds {
                axis,
                start,
                end: start + len,
                len: axis_len,
            });
        }
        Ok(Self::from_array(
            self.as_array()
                .slice_axis(Axis(axis), Slice::from(start..start + len))
                .to_owned(),
        ))
    }

    /// `narrow`的逆运算：生成形状为`full_shape`的零张量，并把自身写入`axis`上自`start`起的区间
    pub fn embed_into(
        &self,
        full_shape: &[usize],
        axis: usize,
        start: usize,
    ) -> Result<Self, TensorError> {
        let len = self.shape().get(axis).copied().ok_or(TensorError::AxisOutOfRange {
            axis,
            dimension: self.dimension(),
        })?;
        if full_shape.get(axis).is_none_or(|&full| start + len > full) {
            return Err(TensorError::IncompatibleShape);
        }
        let mut data = ArrayD::zeros(IxDyn(full_shape));
        let mut region = data.slice_axis_mut(Axis(axis), Slice::from(start..start + len));
        if region.shape() != self.shape() {
            return Err(TensorError::IncompatibleShape);
        }
        region.assign(self.as_array());
        Ok(Self::from_array(data))
    }

    /// 沿`axis`按下标挑选（可重复），结果在该维的长度为`indices.len()`
    pub fn index_select(&self, axis: usize, indices: &[usize]) -> Result<Self, TensorError> {
        self.check_axis(axis)?;
        let axis_len = self.shape()[axis];
        if let Some(&bad) = indices.iter().find(|&&i| i >= axis_len) {
            return Err(TensorError::RangeOutOfBounds {
                axis,
                start: bad,
                end: bad + 1,
                len: axis_len,
            });
        }
        Ok(Self::from_array(
            self.as_array().select(Axis(axis), indices),
        ))
    }

    /// `index_select`的逆运算：把自身沿`axis`的第k片累加到零张量的第`indices[k]`片上
    pub fn index_scatter_add(
        &self,
        full_shape: &[usize],
        axis: usize,
        indices: &[usize],
    ) -> Result<Self, TensorError> {
        self.check_axis(axis)?;
        if indices.len() != self.shape()[axis] || full_shape.len() != self.dimension() {
            return Err(TensorError::IncompatibleShape);
        }
        let mut data = ArrayD::<f32>::zeros(IxDyn(full_shape));
        for (k, &i) in indices.iter().enumerate() {
            if i >= full_shape[axis] {
                return Err(TensorError::IncompatibleShape);
            }
            let mut dst = data.index_axis_mut(Axis(axis), i);
            dst += &self.as_array().index_axis(Axis(axis), k);
        }
        Ok(Self::from_array(data))
    }

    /// 沿`axis`拼接多个张量，除`axis`外各维必须一致
    pub fn concat(tensors: &[&Self], axis: usize) -> Result<Self, TensorError> {
        let first = tensors.first().ok_or(TensorError::EmptyList)?;
        first.check_axis(axis)?;
        let views: Vec<ArrayView<'_, f32, IxDyn>> =
            tensors.iter().map(|t| t.as_array().view()).collect();
        let data = ndarray::concatenate(Axis(axis), &views).map_err(|_| {
            let mismatched = tensors
                .iter()
                .find(|t| {
                    t.dimension() != first.dimension()
                        || t.shape()
                            .iter()
                            .zip(first.shape())
                            .enumerate()
                            .any(|(i, (a, b))| i != axis && a != b)
                })
                .unwrap_or(first);
            TensorError::OperatorError {
                operator: Operator::Concat,
                tensor1_shape: first.shape().to_vec(),
                tensor2_shape: mismatched.shape().to_vec(),
            }
        })?;
        Ok(Self::from_array(data))
    }
}
