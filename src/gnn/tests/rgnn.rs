use approx::assert_abs_diff_eq;

use super::{fully_connected_incidence, random_tensor};
use crate::assert_err;
use crate::errors::ModelError;
use crate::gnn::{GnnEncoderConfig, RecurrentCell, Rgnn};
use crate::nn::{Graph, GraphError, Module, VarLossOps, VarShapeOps};
use crate::tensor::Tensor;

fn propagation_config(hidden: usize) -> GnnEncoderConfig {
    GnnEncoderConfig {
        input_dim: hidden,
        node_hidden_dim: 5,
        node_out_dim: hidden,
        edge_hidden_dim: 5,
        edge_out_dim: 3,
        num_passing: 1,
        weight_share: false,
        dropout: 0.0,
    }
}

#[test]
fn test_forward_shapes_and_final_state() -> Result<(), ModelError> {
    let graph = Graph::new_with_seed(42);
    let incidence = fully_connected_incidence(&graph, 4)?;
    let rgnn = Rgnn::new(&graph, &incidence, 5, 6, None, "rgnn")?;
    assert_eq!(rgnn.num_joints(), 4);
    assert_eq!(rgnn.hidden_size(), 6);

    let input = graph.input(&random_tensor(&[3, 2, 4, 5], 1))?;
    let out = rgnn.forward(&input, None, None)?;
    assert_eq!(out.outputs.shape()?, vec![3, 2, 4, 6]);
    assert_eq!(out.hidden.shape()?, vec![2, 4, 6]);
    assert!(out.edge_weight.is_none());
    assert_eq!(out.outputs.select(0, 2)?.value()?, out.hidden.value()?);
    Ok(())
}

#[test]
fn test_three_dim_input_is_one_step() -> Result<(), ModelError> {
    let graph = Graph::new_with_seed(42);
    let incidence = fully_connected_incidence(&graph, 4)?;
    let rgnn = Rgnn::new(&graph, &incidence, 5, 6, None, "rgnn")?;
    let input = graph.input(&random_tensor(&[2, 4, 5], 2))?;
    let out = rgnn.forward(&input, None, None)?;
    assert_eq!(out.outputs.shape()?, vec![1, 2, 4, 6]);
    Ok(())
}

#[test]
fn test_each_joint_owns_its_cell() -> Result<(), ModelError> {
    let graph = Graph::new_with_seed(42);
    let incidence = fully_connected_incidence(&graph, 4)?;
    let rgnn = Rgnn::new(&graph, &incidence, 5, 6, None, "rgnn")?;
    assert_eq!(rgnn.cells().len(), 4);
    assert_eq!(rgnn.num_params(), 4 * 10);
    let w0 = rgnn.cells()[0].parameters()[0].value()?;
    let w1 = rgnn.cells()[1].parameters()[0].value()?;
    assert_ne!(w0, w1);
    Ok(())
}

/// 只改变关节2的输入，其余关节的状态不受影响
#[test]
fn test_joints_advance_independently() -> Result<(), ModelError> {
    let graph = Graph::new_with_seed(42);
    let incidence = fully_connected_incidence(&graph, 4)?;
    let rgnn = Rgnn::new(&graph, &incidence, 3, 4, None, "rgnn")?;

    let base = random_tensor(&[2, 2, 4, 3], 3);
    let mut perturbed = base.to_vec();
    for t in 0..2 {
        for b in 0..2 {
            for d in 0..3 {
                perturbed[((t * 2 + b) * 4 + 2) * 3 + d] += 1.0;
            }
        }
    }
    let perturbed = Tensor::new(&perturbed, &[2, 2, 4, 3])?;

    let h_base = rgnn.forward(&graph.input(&base)?, None, None)?.hidden.value()?;
    let h_perturbed = rgnn
        .forward(&graph.input(&perturbed)?, None, None)?
        .hidden
        .value()?;
    for joint in 0..4 {
        let a = h_base.narrow(1, joint, 1)?;
        let b = h_perturbed.narrow(1, joint, 1)?;
        if joint == 2 {
            assert_ne!(a, b);
        } else {
            assert_eq!(a, b);
        }
    }
    Ok(())
}

/// 参数全为0时每个GRU的更新为 h' = 0.5 * h
#[test]
fn test_step_with_zero_parameters_halves_state() -> Result<(), ModelError> {
    let graph = Graph::new_with_seed(42);
    let incidence = fully_connected_incidence(&graph, 3)?;
    let rgnn = Rgnn::new(&graph, &incidence, 2, 2, None, "rgnn")?;
    for param in rgnn.parameters() {
        param.set_value(&Tensor::zeros(&param.shape()?))?;
    }
    let state = random_tensor(&[2, 3, 2], 4);
    let step = rgnn.step(
        &graph.input(&random_tensor(&[2, 3, 2], 5))?,
        &graph.input(&state)?,
        None,
    )?;
    for (actual, before) in step.state.value()?.to_vec().iter().zip(state.to_vec()) {
        assert_abs_diff_eq!(*actual, 0.5 * before, epsilon = 1e-6);
    }
    Ok(())
}

#[test]
fn test_propagation_refines_edge_weight() -> Result<(), ModelError> {
    let graph = Graph::new_with_seed(42);
    let incidence = fully_connected_incidence(&graph, 4)?;
    let rgnn = Rgnn::new(&graph, &incidence, 3, 6, Some(&propagation_config(6)), "rgnn")?;
    assert!(rgnn.propagation().is_some());

    let input = graph.input(&random_tensor(&[2, 2, 4, 3], 6))?;
    let out = rgnn.forward(&input, None, None)?;
    assert_eq!(out.outputs.shape()?, vec![2, 2, 4, 6]);
    let weight = out.edge_weight.ok_or_else(|| {
        GraphError::ComputationError("带图传播时应返回边权重".to_string())
    })?;
    assert_eq!(weight.shape()?, vec![2, 12, 1]);

    out.hidden.mean()?.try_add(&weight.mean()?)?.backward()?;
    assert!(rgnn.cells()[3].parameters()[0].grad()?.is_some());
    Ok(())
}

#[test]
fn test_propagation_must_keep_hidden_size() -> Result<(), ModelError> {
    let graph = Graph::new_with_seed(42);
    let incidence = fully_connected_incidence(&graph, 4)?;
    assert_err!(
        Rgnn::new(&graph, &incidence, 3, 5, Some(&propagation_config(6)), "rgnn").map(|_| ()),
        GraphError::InvalidOperation(_)
    );
    Ok(())
}

#[test]
fn test_step_rejects_mismatched_state() -> Result<(), ModelError> {
    let graph = Graph::new_with_seed(42);
    let incidence = fully_connected_incidence(&graph, 4)?;
    let rgnn = Rgnn::new(&graph, &incidence, 3, 6, None, "rgnn")?;
    let input = graph.zeros(&[2, 4, 3])?;
    let state = graph.zeros(&[2, 4, 5])?;
    assert_err!(
        rgnn.step(&input, &state, None).map(|_| ()),
        GraphError::ShapeMismatch([2, 4, 6], [2, 4, 5])
    );
    let bad_input = graph.zeros(&[2, 3, 3])?;
    assert_err!(
        rgnn.forward(&bad_input, None, None).map(|_| ()),
        GraphError::ShapeMismatch([2, 4, 3], [2, 3, 3])
    );
    Ok(())
}
