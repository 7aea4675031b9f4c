/*
 * @Author       : 老董
 * @Description  : GruCell 单元测试
 */

use super::assert_grad_matches_numeric;
use crate::assert_err;
use crate::nn::{Graph, GraphError, GruCell, Module};
use crate::tensor::Tensor;
use approx::assert_abs_diff_eq;

#[test]
fn test_gru_cell_parameters() -> Result<(), GraphError> {
    let graph = Graph::new_with_seed(42);
    let cell = GruCell::new(&graph, 5, 4, "gru")?;
    assert_eq!(cell.num_params(), 10);
    let bound = 1.0 / 4.0_f32.sqrt();
    for param in cell.parameters() {
        assert!(param.value()?.all(|v| v.abs() <= bound));
    }
    Ok(())
}

/// 参数全为0时：r = z = σ(0) = 0.5，n = tanh(0) = 0，故 h' = 0.5 * h
#[test]
fn test_gru_cell_step_with_zero_parameters() -> Result<(), GraphError> {
    let graph = Graph::new_with_seed(42);
    let cell = GruCell::new(&graph, 3, 2, "gru")?;
    for param in cell.parameters() {
        param.set_value(&Tensor::zeros(&param.shape()?))?;
    }
    let x = graph.input(&Tensor::ones(&[2, 3]))?;
    let h = graph.input(&Tensor::new(&[1.0, -2.0, 4.0, 0.5], &[2, 2])?)?;
    let h_next = cell.step(&x, &h)?.value()?;
    let expected = [0.5, -1.0, 2.0, 0.25];
    for (actual, expected) in h_next.to_vec().iter().zip(expected) {
        assert_abs_diff_eq!(*actual, expected, epsilon = 1e-6);
    }
    Ok(())
}

/// 权重全为0、b_hn = 1、b_r = 0：r = 0.5，候选状态为tanh(b_in + r * b_hn)
///
/// 取b_in = 0时，n = tanh(0.5)而不是tanh(1.0)，即b_hn受重置门调制
#[test]
fn test_gru_cell_hidden_bias_is_gated_by_reset() -> Result<(), GraphError> {
    let graph = Graph::new_with_seed(42);
    let cell = GruCell::new(&graph, 2, 2, "gru")?;
    for param in cell.parameters() {
        let value = if param.name()? == "gru_b_hn" {
            Tensor::ones(&param.shape()?)
        } else {
            Tensor::zeros(&param.shape()?)
        };
        param.set_value(&value)?;
    }
    let x = graph.input(&Tensor::new(&[0.7, -0.3], &[1, 2])?)?;
    let h = graph.input(&Tensor::new(&[1.0, -1.0], &[1, 2])?)?;
    let h_next = cell.step(&x, &h)?.value()?.to_vec();

    // z = 0.5，h' = 0.5 * n + 0.5 * h
    let n = 0.5_f32.tanh();
    assert_abs_diff_eq!(h_next[0], 0.5 * n + 0.5, epsilon = 1e-6);
    assert_abs_diff_eq!(h_next[1], 0.5 * n - 0.5, epsilon = 1e-6);
    Ok(())
}

/// 与torch.nn.GRUCell逐项手算的结果对照（各偏置均非0）
#[test]
fn test_gru_cell_matches_torch_equations() -> Result<(), GraphError> {
    let graph = Graph::new_with_seed(42);
    let cell = GruCell::new(&graph, 1, 1, "gru")?;
    let values = [
        ("gru_W_ir", 0.5),
        ("gru_W_hr", -0.4),
        ("gru_b_r", 0.1),
        ("gru_W_iz", 0.3),
        ("gru_W_hz", 0.2),
        ("gru_b_z", -0.2),
        ("gru_W_in", 0.6),
        ("gru_W_hn", -0.7),
        ("gru_b_in", 0.25),
        ("gru_b_hn", 0.4),
    ];
    for param in cell.parameters() {
        let name = param.name()?;
        let value = values
            .iter()
            .find(|(n, _)| *n == name)
            .map(|&(_, v)| v)
            .ok_or_else(|| GraphError::ComputationError(format!("未知参数{name}")))?;
        param.set_value(&Tensor::new(&[value], &[1, 1])?)?;
    }
    let (x, h) = (0.8_f32, -0.5_f32);
    let sigmoid = |v: f32| 1.0 / (1.0 + (-v).exp());
    let r = sigmoid(0.5 * x - 0.4 * h + 0.1);
    let z = sigmoid(0.3 * x + 0.2 * h - 0.2);
    let n = (0.6 * x + 0.25 + r * (-0.7 * h + 0.4)).tanh();
    let expected = (1.0 - z) * n + z * h;

    let h_next = cell
        .step(
            &graph.input(&Tensor::new(&[x], &[1, 1])?)?,
            &graph.input(&Tensor::new(&[h], &[1, 1])?)?,
        )?
        .item()?;
    assert_abs_diff_eq!(h_next, expected, epsilon = 1e-6);
    Ok(())
}

#[test]
fn test_gru_cell_grad_wrt_hidden_state() -> Result<(), GraphError> {
    let x = Tensor::new(&[0.3, -0.2, 0.8, 0.1, 0.5, -0.6], &[2, 3])?;
    let h = Tensor::new(&[0.2, -0.4, 0.1, 0.7], &[2, 2])?;
    assert_grad_matches_numeric(&h, |h| {
        let graph = h.get_graph();
        let cell = GruCell::new(&graph, 3, 2, "gru")?;
        cell.step(&graph.input(&x)?, h)
    })
}

#[test]
fn test_gru_cell_rejects_mismatched_state() -> Result<(), GraphError> {
    let graph = Graph::new_with_seed(42);
    let cell = GruCell::new(&graph, 3, 2, "gru")?;
    let x = graph.zeros(&[2, 3])?;
    let h = graph.zeros(&[3, 2])?;
    assert_err!(cell.step(&x, &h), GraphError::ShapeMismatch([2, 2], [3, 2]));
    Ok(())
}
