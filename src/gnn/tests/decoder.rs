use std::cell::RefCell;
use std::rc::Rc;

use super::{assert_all_close, fully_connected_incidence, random_tensor};
use crate::assert_err;
use crate::errors::ModelError;
use crate::gnn::{
    CellStep, DecoderWrapper, RecurrentCell, Rgnn, StochasticDecoderWrapper,
};
use crate::nn::{Graph, GraphError, Module, Var, VarLossOps, VarShapeOps};
use crate::tensor::Tensor;

/// 无论输入为何，输出与新状态恒为0；记录每一步收到的输入
struct ZeroCell {
    hidden_size: usize,
    inputs: RefCell<Vec<Tensor>>,
}

impl ZeroCell {
    fn new(hidden_size: usize) -> Rc<Self> {
        Rc::new(Self {
            hidden_size,
            inputs: RefCell::new(Vec::new()),
        })
    }
}

impl RecurrentCell for ZeroCell {
    fn hidden_size(&self) -> usize {
        self.hidden_size
    }

    fn step(
        &self,
        input: &Var,
        _state: &Var,
        edge_weight: Option<&Var>,
    ) -> Result<CellStep, GraphError> {
        self.inputs.borrow_mut().push(input.value()?);
        let shape = input.shape()?;
        let zeros = input.get_graph().zeros(&[shape[0], shape[1], self.hidden_size])?;
        Ok(CellStep {
            output: zeros.clone(),
            state: zeros,
            edge_weight: edge_weight.cloned(),
        })
    }

    fn cell_parameters(&self) -> Vec<Var> {
        Vec::new()
    }
}

#[test]
fn test_point_decoder_outputs_zero_for_zero_cell() -> Result<(), ModelError> {
    let graph = Graph::new_with_seed(42);
    let decoder = DecoderWrapper::new(&graph, ZeroCell::new(4), 3, 5, false, "dec")?;
    let seed = graph.zeros(&[2, 3, 3])?;
    let state = graph.zeros(&[2, 3, 4])?;

    let decoded = decoder.forward(&seed, &state, None)?;
    assert_eq!(decoded.outputs.shape()?, vec![5, 2, 3, 3]);
    assert!(decoded.outputs.value()?.all(|v| v == 0.0));
    assert!(decoded.edge_weight.is_none());
    Ok(())
}

/// 残差模式下零输出的单元使每一帧都等于初始帧；其余通道原样带入下一步的输入
#[test]
fn test_residual_frames_and_carried_channels() -> Result<(), ModelError> {
    let graph = Graph::new_with_seed(42);
    let cell = ZeroCell::new(4);
    let decoder = DecoderWrapper::new(&graph, Rc::clone(&cell), 3, 3, true, "dec")?;
    let seed_value = random_tensor(&[2, 3, 5], 1);
    let seed = graph.input(&seed_value)?;
    let state = graph.zeros(&[2, 3, 4])?;

    let decoded = decoder.forward(&seed, &state, None)?;
    let leading = seed_value.narrow(2, 0, 3)?;
    for t in 0..3 {
        assert_eq!(decoded.outputs.select(0, t)?.value()?, leading);
    }

    let inputs = cell.inputs.borrow();
    assert_eq!(inputs.len(), 3);
    for input in inputs.iter() {
        assert_eq!(input, &seed_value);
    }
    Ok(())
}

#[test]
fn test_next_input_is_previous_prediction() -> Result<(), ModelError> {
    let graph = Graph::new_with_seed(42);
    let incidence = fully_connected_incidence(&graph, 3)?;
    let rgnn = Rc::new(Rgnn::new(&graph, &incidence, 5, 4, None, "rgnn")?);
    let decoder = DecoderWrapper::new(&graph, rgnn, 3, 3, false, "dec")?;
    let seed_value = random_tensor(&[2, 3, 5], 2);
    let seed = graph.input(&seed_value)?;
    let state = graph.input(&random_tensor(&[2, 3, 4], 3))?;
    let decoded = decoder.forward(&seed, &state, None)?;

    // 重新手动展开前两步，第二步的输入应为（第一步预测, 初始帧的后两个通道）
    let first = decoded.outputs.select(0, 0)?;
    let carried = seed.narrow(2, 3, 2)?;
    let frame = Var::concat(&[&first, &carried], 2)?;
    let cell = decoder.cell();
    let step0 = cell.step(&seed, &state, None)?;
    let step1 = cell.step(&frame, &step0.state, None)?;
    let head = &decoder.head_parameters();
    let expected = step1
        .output
        .value()?
        .reshape(&[6, 4])?
        .mat_mul(&head[0].value()?)?;
    let expected = &expected + &head[1].value()?;
    assert_all_close(
        &decoded.outputs.select(0, 1)?.value()?,
        &expected.to_vec(),
        1e-5,
    );
    Ok(())
}

#[test]
fn test_decoder_rejects_zero_length_and_narrow_seed() -> Result<(), ModelError> {
    let graph = Graph::new_with_seed(42);
    assert_err!(
        DecoderWrapper::new(&graph, ZeroCell::new(4), 3, 0, false, "dec").map(|_| ()),
        GraphError::InvalidOperation(msg) if msg.starts_with("dec的")
    );
    assert_err!(
        StochasticDecoderWrapper::new(&graph, ZeroCell::new(4), 3, 0, false, "sdec").map(|_| ()),
        GraphError::InvalidOperation(msg) if msg.starts_with("sdec的")
    );

    let decoder = DecoderWrapper::new(&graph, ZeroCell::new(4), 3, 2, false, "dec")?;
    let seed = graph.zeros(&[2, 3, 2])?;
    let state = graph.zeros(&[2, 3, 4])?;
    assert_err!(
        decoder.forward(&seed, &state, None).map(|_| ()),
        GraphError::ShapeMismatch { message, .. } if message.starts_with("dec的")
    );
    Ok(())
}

#[test]
fn test_point_decoder_head_init() -> Result<(), ModelError> {
    let graph = Graph::new_with_seed(42);
    let decoder = DecoderWrapper::new(&graph, ZeroCell::new(8), 3, 2, false, "dec")?;
    let params = decoder.head_parameters();
    assert_eq!(params.len(), 2);
    assert!(params[0].value()?.all(|w| (-0.04..=0.04).contains(&w)));
    assert!(params[1].value()?.all(|b| b == 0.0));
    assert_eq!(decoder.num_params(), 2);
    Ok(())
}

#[test]
fn test_stochastic_outputs_and_positive_std() -> Result<(), ModelError> {
    let graph = Graph::new_with_seed(42);
    let incidence = fully_connected_incidence(&graph, 3)?;
    let rgnn = Rc::new(Rgnn::new(&graph, &incidence, 5, 4, None, "rgnn")?);
    let decoder = StochasticDecoderWrapper::new(&graph, rgnn, 3, 4, true, "sdec")?;
    for param in decoder.head_parameters() {
        assert!(param.value()?.all(|w| (-0.05..=0.05).contains(&w)));
    }

    let seed = graph.input(&random_tensor(&[2, 3, 5], 4).map(|v| 10.0 * v))?;
    let state = graph.input(&random_tensor(&[2, 3, 4], 5))?;
    let decoded = decoder.forward(&seed, &state, None)?;
    for var in [&decoded.means, &decoded.stds, &decoded.samples] {
        assert_eq!(var.shape()?, vec![4, 2, 3, 3]);
    }
    assert!(decoded.stds.value()?.all(|s| s > 0.0));

    decoded.samples.mean()?.backward()?;
    for param in decoder.parameters() {
        assert!(param.grad()?.is_some(), "{}没有梯度", param.name()?);
    }
    Ok(())
}

/// 零输出的单元：均值为0，标准差为softplus(0) = ln2
#[test]
fn test_stochastic_heads_with_zero_cell() -> Result<(), ModelError> {
    let graph = Graph::new_with_seed(42);
    let decoder = StochasticDecoderWrapper::new(&graph, ZeroCell::new(4), 3, 2, false, "sdec")?;
    let decoded = decoder.forward(&graph.zeros(&[1, 3, 3])?, &graph.zeros(&[1, 3, 4])?, None)?;
    assert!(decoded.means.value()?.all(|m| m == 0.0));
    assert!(decoded.stds.value()?.all(|s| (s - std::f32::consts::LN_2).abs() < 1e-6));
    // 非残差时采样即为 ln2 * ε，不会恒为0
    assert!(!decoded.samples.value()?.all(|s| s == 0.0));
    Ok(())
}

#[test]
fn test_stochastic_sampling_is_reproducible_with_seed() -> Result<(), ModelError> {
    let graph = Graph::new_with_seed(42);
    let incidence = fully_connected_incidence(&graph, 3)?;
    let rgnn = Rc::new(Rgnn::new(&graph, &incidence, 5, 4, None, "rgnn")?);
    let decoder = StochasticDecoderWrapper::new(&graph, rgnn, 3, 3, false, "sdec")?;
    let seed = graph.input(&random_tensor(&[2, 3, 5], 6))?;
    let state = graph.input(&random_tensor(&[2, 3, 4], 7))?;

    graph.set_seed(7);
    let first = decoder.forward(&seed, &state, None)?.samples.value()?;
    graph.set_seed(7);
    let second = decoder.forward(&seed, &state, None)?.samples.value()?;
    assert_eq!(first, second);

    graph.set_seed(8);
    let third = decoder.forward(&seed, &state, None)?.samples.value()?;
    assert_ne!(first, third);
    Ok(())
}
