/*
 * @Author       : 老董
 * @Date         : 2026-03-05
 * @Description  : Var 扩展 trait 模块
 *
 * 按功能领域组织 Var 的扩展方法，用户按需 import。
 *
 * # 模块结构
 * - `activation`: 激活函数与 dropout（sigmoid, tanh, softplus, elu, abs, ln, dropout）
 * - `loss`: 归约与损失函数（sum, mean, mse_loss, abs_sum_loss, gaussian_nll）
 * - `matrix`: 矩阵运算（matmul, matmul_last_axis）
 * - `shape`: 形状变换（reshape, permute, narrow, select, index_select）
 */

mod activation;
mod loss;
mod matrix;
mod shape;

pub use activation::VarActivationOps;
pub use loss::VarLossOps;
pub use matrix::VarMatrixOps;
pub use shape::VarShapeOps;
