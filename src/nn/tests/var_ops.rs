/*
 * @Author       : 老董
 * @Description  : Var 扩展 trait 的前向数值测试
 */

use crate::assert_err;
use crate::nn::{Graph, GraphError, Var, VarLossOps, VarMatrixOps, VarShapeOps};
use crate::tensor::Tensor;
use approx::assert_abs_diff_eq;

#[test]
fn test_losses_forward_values() -> Result<(), GraphError> {
    let graph = Graph::new();
    let prediction = graph.input(&Tensor::new(&[1.0, 2.0, 3.0, 4.0], &[2, 2])?)?;
    let target = graph.input(&Tensor::new(&[1.0, 0.0, 5.0, 4.0], &[2, 2])?)?;

    assert_abs_diff_eq!(prediction.mse_loss(&target)?.item()?, 2.0);
    assert_abs_diff_eq!(prediction.abs_sum_loss(&target)?.item()?, 4.0);

    // 均值=目标、σ=1 时：NLL = 0.5·ln(2π)
    let std = graph.ones(&[2, 2])?;
    let nll = target.gaussian_nll(&std, &target)?.item()?;
    assert_abs_diff_eq!(nll, 0.5 * (2.0 * std::f32::consts::PI).ln(), epsilon = 1e-6);

    let short = graph.zeros(&[2, 1])?;
    assert_err!(prediction.mse_loss(&short), GraphError::ShapeMismatch([2, 2], [2, 1]));
    Ok(())
}

#[test]
fn test_matmul_last_axis_matches_per_row_matmul() -> Result<(), GraphError> {
    let graph = Graph::new();
    let x = graph.input(&Tensor::new(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0], &[3, 1, 2])?)?;
    let w = graph.input(&Tensor::new(&[1.0, 0.0, 1.0, 1.0], &[2, 2])?)?;
    let y = x.matmul_last_axis(&w)?.value()?;
    assert_eq!(y, Tensor::new(&[3.0, 2.0, 7.0, 4.0, 11.0, 6.0], &[3, 1, 2])?);
    Ok(())
}

#[test]
fn test_stack_and_select_are_inverse() -> Result<(), GraphError> {
    let graph = Graph::new();
    let a = graph.input(&Tensor::new(&[1.0, 2.0], &[1, 2])?)?;
    let b = graph.input(&Tensor::new(&[3.0, 4.0], &[1, 2])?)?;
    let stacked = Var::stack(&[&a, &b])?;
    assert_eq!(stacked.shape()?, vec![2, 1, 2]);
    assert_eq!(stacked.select(0, 1)?.value()?, b.value()?);
    assert_err!(Var::stack(&[]), GraphError::InvalidOperation(_));
    Ok(())
}
