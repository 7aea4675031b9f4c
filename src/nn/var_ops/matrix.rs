/*
 * @Author       : 老董
 * @Date         : 2026-03-05
 * @Description  : Var 矩阵运算扩展 trait
 */

use crate::nn::{GraphError, Var, VarShapeOps};

/// 矩阵运算扩展 trait
///
/// - `matmul(other)`: 二维矩阵乘法
/// - `matmul_last_axis(other)`: 对任意阶输入的最后一维做矩阵乘法
///
/// # 使用示例
/// ```ignore
/// use motion_gnn::nn::{Var, VarMatrixOps};
///
/// let y = x.matmul(&w)?;
/// let h = nodes.matmul_last_axis(&w)?; // [B, J, D] @ [D, H] -> [B, J, H]
/// ```
pub trait VarMatrixOps {
    /// 矩阵乘法
    ///
    /// # 形状要求
    /// - self: [m, k]
    /// - other: [k, n]
    /// - 输出: [m, n]
    fn matmul(&self, other: &Var) -> Result<Var, GraphError>;

    /// [..., k] @ [k, n] -> [..., n]：先展平前导维度做二维乘法，再还原
    fn matmul_last_axis(&self, other: &Var) -> Result<Var, GraphError>;
}

impl VarMatrixOps for Var {
    fn matmul(&self, other: &Var) -> Result<Var, GraphError> {
        self.ensure_same_graph(other, "矩阵乘法")?;
        self.derive(|g| g.new_mat_mul_node(self.node_id(), other.node_id(), None))
    }

    fn matmul_last_axis(&self, other: &Var) -> Result<Var, GraphError> {
        let shape = self.shape()?;
        if shape.len() == 2 {
            return self.matmul(other);
        }
        let (&k, leading) = shape.split_last().ok_or_else(|| {
            GraphError::InvalidOperation("不能对标量做矩阵乘法".to_string())
        })?;
        let rows: usize = leading.iter().product();
        let out = self.reshape(&[rows, k])?.matmul(other)?;
        let n = out.shape()?[1];
        let mut out_shape = leading.to_vec();
        out_shape.push(n);
        out.reshape(&out_shape)
    }
}
