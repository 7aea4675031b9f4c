/*
 * @Author       : 老董
 * @Date         : 2026-03-05
 * @Description  : Var 归约与损失函数扩展 trait
 */

use crate::nn::{GraphError, Var, VarActivationOps};
use crate::tensor::Tensor;

/// 0.5 * ln(2π)，高斯负对数似然中的常数项
const HALF_LN_2PI: f32 = 0.918_938_5;

/// 归约与损失函数扩展 trait
///
/// - `sum()` / `mean()`: 全元素归约为[1, 1]标量
/// - `mse_loss(target)`: 均方误差
/// - `abs_sum_loss(target)`: 绝对误差之和
/// - `gaussian_nll(std, target)`: 以 self 为均值的对角高斯负对数似然（逐元素平均）
///
/// # 使用示例
/// ```ignore
/// use motion_gnn::nn::{Var, VarLossOps};
///
/// let loss = prediction.mse_loss(&target)?;
/// loss.backward()?;
/// ```
pub trait VarLossOps {
    fn sum(&self) -> Result<Var, GraphError>;

    fn mean(&self) -> Result<Var, GraphError>;

    /// mean((self - target)²)
    fn mse_loss(&self, target: &Var) -> Result<Var, GraphError>;

    /// Σ|self - target|
    fn abs_sum_loss(&self, target: &Var) -> Result<Var, GraphError>;

    /// mean(ln σ + (x - μ)² / (2σ²)) + 0.5·ln(2π)，σ 须为正
    fn gaussian_nll(&self, std: &Var, target: &Var) -> Result<Var, GraphError>;
}

impl VarLossOps for Var {
    fn sum(&self) -> Result<Var, GraphError> {
        self.derive(|g| g.new_sum_node(self.node_id(), None))
    }

    fn mean(&self) -> Result<Var, GraphError> {
        self.derive(|g| g.new_mean_node(self.node_id(), None))
    }

    fn mse_loss(&self, target: &Var) -> Result<Var, GraphError> {
        check_same_shape(self, target, "mse_loss")?;
        let diff = self.try_sub(target)?;
        diff.try_mul(&diff)?.mean()
    }

    fn abs_sum_loss(&self, target: &Var) -> Result<Var, GraphError> {
        check_same_shape(self, target, "abs_sum_loss")?;
        self.try_sub(target)?.abs()?.sum()
    }

    fn gaussian_nll(&self, std: &Var, target: &Var) -> Result<Var, GraphError> {
        check_same_shape(self, target, "gaussian_nll")?;
        check_same_shape(self, std, "gaussian_nll")?;
        let z = target.try_sub(self)?.try_div(std)?;
        let per_element = std.ln()?.try_add(&z.try_mul(&z)?.scale(0.5)?)?;
        let constant = self.get_graph().input(&Tensor::scalar(HALF_LN_2PI))?;
        per_element.mean()?.try_add(&constant)
    }
}

fn check_same_shape(a: &Var, b: &Var, op_name: &str) -> Result<(), GraphError> {
    let (shape_a, shape_b) = (a.shape()?, b.shape()?);
    if shape_a == shape_b {
        Ok(())
    } else {
        Err(GraphError::ShapeMismatch {
            expected: shape_a,
            got: shape_b,
            message: format!("{op_name}的两个输入形状必须一致"),
        })
    }
}
