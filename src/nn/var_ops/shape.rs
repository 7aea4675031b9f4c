/*
 * @Author       : 老董
 * @Date         : 2026-03-05
 * @Description  : Var 形状变换扩展 trait
 */

use crate::nn::{GraphError, Var};

/// 形状变换扩展 trait
///
/// # 使用示例
/// ```ignore
/// use motion_gnn::nn::{Var, VarShapeOps};
///
/// let x = seq.permute(&[1, 0, 2])?;
/// let frame = seq.select(0, t)?; // [T, B, D] -> [B, D]
/// ```
pub trait VarShapeOps {
    /// 变形为指定形状，元素总数必须保持一致
    fn reshape(&self, shape: &[usize]) -> Result<Var, GraphError>;

    /// 按`axes`重排维度
    fn permute(&self, axes: &[usize]) -> Result<Var, GraphError>;

    /// 沿`axis`截取[start, start + len)
    fn narrow(&self, axis: usize, start: usize, len: usize) -> Result<Var, GraphError>;

    /// 取`axis`上的第`index`片并去掉该维
    fn select(&self, axis: usize, index: usize) -> Result<Var, GraphError>;

    /// 沿`axis`按下标挑选
    fn index_select(&self, axis: usize, indices: &[usize]) -> Result<Var, GraphError>;
}

impl VarShapeOps for Var {
    fn reshape(&self, shape: &[usize]) -> Result<Var, GraphError> {
        self.derive(|g| g.new_reshape_node(self.node_id(), shape, None))
    }

    fn permute(&self, axes: &[usize]) -> Result<Var, GraphError> {
        self.derive(|g| g.new_permute_node(self.node_id(), axes, None))
    }

    fn narrow(&self, axis: usize, start: usize, len: usize) -> Result<Var, GraphError> {
        self.derive(|g| g.new_narrow_node(self.node_id(), axis, start, len, None))
    }

    fn select(&self, axis: usize, index: usize) -> Result<Var, GraphError> {
        let slice = self.narrow(axis, index, 1)?;
        let mut shape = slice.shape()?;
        shape.remove(axis);
        slice.reshape(&shape)
    }

    fn index_select(&self, axis: usize, indices: &[usize]) -> Result<Var, GraphError> {
        self.derive(|g| g.new_index_select_node(self.node_id(), axis, indices, None))
    }
}
