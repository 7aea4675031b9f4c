mod graph_basic;
mod layer_batch_norm;
mod layer_gru_cell;
mod var_ops;

use crate::nn::{Graph, GraphError, Var, VarLossOps};
use crate::tensor::Tensor;

const GRAD_CHECK_SEED: u64 = 20_260_306;
const EPSILON: f32 = 1e-2;

/// 固定但不对称的权重，避免`sum`把不同位置的梯度误差相互抵消
fn probe_weights(shape: &[usize]) -> Result<Tensor, GraphError> {
    let size: usize = shape.iter().product();
    let data: Vec<f32> = (0..size)
        .map(|i| ((i * 37 % 11) as f32 - 5.0) / 5.0)
        .collect();
    Ok(Tensor::new(&data, shape)?)
}

/// 在新图上以`input`为参数构建`build`，返回加权求和后的损失与参数梯度
fn loss_and_grad<F>(input: &Tensor, build: &F) -> Result<(f32, Tensor), GraphError>
where
    F: Fn(&Var) -> Result<Var, GraphError>,
{
    let graph = Graph::new_with_seed(GRAD_CHECK_SEED);
    let x = graph.wrap_node_id(graph.inner_mut().new_parameter_node(input, Some("x"))?);
    let out = build(&x)?;
    let probe = graph.input(&probe_weights(&out.shape()?)?)?;
    let loss = out.try_mul(&probe)?.sum()?;
    let value = loss.backward()?;
    let grad = x.grad()?.ok_or_else(|| {
        GraphError::ComputationError("参数没有得到梯度".to_string())
    })?;
    Ok((value, grad))
}

/// 用中心差分校验`build`对输入的梯度
pub(crate) fn assert_grad_matches_numeric<F>(input: &Tensor, build: F) -> Result<(), GraphError>
where
    F: Fn(&Var) -> Result<Var, GraphError>,
{
    let (_, analytic) = loss_and_grad(input, &build)?;
    assert_eq!(analytic.shape(), input.shape());

    let base = input.to_vec();
    let analytic = analytic.to_vec();
    for i in 0..base.len() {
        let mut plus = base.clone();
        plus[i] += EPSILON;
        let mut minus = base.clone();
        minus[i] -= EPSILON;
        let (loss_plus, _) = loss_and_grad(&Tensor::new(&plus, input.shape())?, &build)?;
        let (loss_minus, _) = loss_and_grad(&Tensor::new(&minus, input.shape())?, &build)?;
        let numeric = (loss_plus - loss_minus) / (2.0 * EPSILON);
        let tolerance = 2e-2 * analytic[i].abs().max(1.0);
        assert!(
            (numeric - analytic[i]).abs() <= tolerance,
            "第{i}个元素的梯度不符：解析{}，数值{numeric}",
            analytic[i]
        );
    }
    Ok(())
}
