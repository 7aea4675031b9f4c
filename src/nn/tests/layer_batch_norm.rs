/*
 * @Author       : 老董
 * @Description  : BatchNorm 层单元测试
 */

use crate::assert_err;
use crate::nn::{BatchNorm, Graph, GraphError};
use crate::tensor::Tensor;
use approx::assert_abs_diff_eq;

fn column(t: &Tensor, col: usize) -> Vec<f32> {
    (0..t.shape()[0]).filter_map(|row| t.get(&[row, col])).collect()
}

#[test]
fn test_batch_norm_train_mode_normalizes_columns() -> Result<(), GraphError> {
    let graph = Graph::new();
    let bn = BatchNorm::new(&graph, 2, "bn")?;
    let x = graph.input(&Tensor::new(&[1.0, 10.0, 2.0, 20.0, 3.0, 30.0, 4.0, 40.0], &[4, 2])?)?;
    let y = bn.forward(&x)?.value()?;
    for col in 0..2 {
        let values = column(&y, col);
        let mean = values.iter().sum::<f32>() / 4.0;
        let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f32>() / 4.0;
        assert_abs_diff_eq!(mean, 0.0, epsilon = 1e-5);
        assert_abs_diff_eq!(var, 1.0, epsilon = 1e-3);
    }

    // 滑动统计量：0.9 * 初值 + 0.1 * batch统计量（方差为无偏估计）
    assert_abs_diff_eq!(bn.running_mean().get(&[0, 0]).unwrap_or(f32::NAN), 0.25, epsilon = 1e-6);
    assert_abs_diff_eq!(bn.running_mean().get(&[0, 1]).unwrap_or(f32::NAN), 2.5, epsilon = 1e-5);
    let unbiased = 5.0 / 3.0;
    assert_abs_diff_eq!(
        bn.running_var().get(&[0, 0]).unwrap_or(f32::NAN),
        0.9 + 0.1 * unbiased,
        epsilon = 1e-5
    );
    Ok(())
}

#[test]
fn test_batch_norm_eval_mode_uses_running_statistics() -> Result<(), GraphError> {
    let graph = Graph::new();
    let bn = BatchNorm::new(&graph, 1, "bn")?;
    graph.eval();
    // 初始滑动统计量：均值0、方差1，故输出 ≈ 输入
    let x = graph.input(&Tensor::new(&[1.0, -2.0], &[2, 1])?)?;
    let y = bn.forward(&x)?.value()?;
    assert_abs_diff_eq!(y.get(&[1, 0]).unwrap_or(f32::NAN), -2.0, epsilon = 1e-4);
    assert_eq!(bn.running_mean(), Tensor::zeros(&[1, 1]));
    Ok(())
}

#[test]
fn test_batch_norm_rejects_single_sample_in_train_mode() -> Result<(), GraphError> {
    let graph = Graph::new();
    let bn = BatchNorm::new(&graph, 3, "bn")?;
    let x = graph.zeros(&[1, 3])?;
    assert_err!(bn.forward(&x), GraphError::InvalidOperation(_));
    let x = graph.zeros(&[4, 2])?;
    assert_err!(bn.forward(&x), GraphError::ShapeMismatch([4, 3], [4, 2]));
    Ok(())
}
