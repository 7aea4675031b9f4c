/*
 * @Author       : 老董
 * @Description  : 计算图基础功能单元测试（建节点即计算、命名、随机种子、模式、释放中间结果）
 */

use crate::assert_err;
use crate::nn::{
    Graph, GraphError, GraphInner, Init, VarActivationOps, VarLossOps, VarShapeOps,
};
use crate::tensor::Tensor;

#[test]
fn test_value_is_computed_on_creation() -> Result<(), GraphError> {
    let graph = Graph::new();
    let a = graph.input(&Tensor::new(&[1.0, 2.0], &[1, 2])?)?;
    let b = graph.input(&Tensor::new(&[3.0, 4.0], &[1, 2])?)?;
    let c = a.try_add(&b)?;
    assert_eq!(c.value()?, Tensor::new(&[4.0, 6.0], &[1, 2])?);
    assert_eq!(c.shape()?, vec![1, 2]);
    Ok(())
}

#[test]
fn test_node_name_generation() -> Result<(), GraphError> {
    let mut graph = GraphInner::new();
    let input = graph.new_input_node(&Tensor::zeros(&[2, 2]), Some("input"))?;

    // 1. 显式命名
    let sigmoid1 = graph.new_sigmoid_node(input, Some("my_sigmoid"))?;
    assert_eq!(graph.get_node_name(sigmoid1)?, "my_sigmoid");

    // 2. 自动命名
    let sigmoid2 = graph.new_sigmoid_node(input, None)?;
    assert_eq!(graph.get_node_name(sigmoid2)?, format!("Sigmoid_{}", sigmoid2.0));
    assert_eq!(graph.get_node_parents(sigmoid2)?, vec![input]);

    // 3. 名称重复
    let result = graph.new_sigmoid_node(input, Some("my_sigmoid"));
    assert_err!(result, GraphError::DuplicateNodeName("my_sigmoid"));
    Ok(())
}

#[test]
fn test_shape_errors_surface_at_creation() -> Result<(), GraphError> {
    let graph = Graph::new();
    let a = graph.zeros(&[2, 3])?;
    let b = graph.zeros(&[4, 3])?;
    assert_err!(a.try_add(&b), GraphError::ShapeMismatch([2, 3], [4, 3]));
    assert_err!(a.narrow(1, 2, 2), GraphError::InvalidOperation(_));
    assert_err!(a.permute(&[0, 0]), GraphError::InvalidOperation(_));
    assert_err!(a.reshape(&[5]), GraphError::ShapeMismatch { .. });
    Ok(())
}

#[test]
fn test_vars_from_different_graphs_are_rejected() -> Result<(), GraphError> {
    let a = Graph::new().zeros(&[1, 1])?;
    let b = Graph::new().zeros(&[1, 1])?;
    assert_err!(a.try_add(&b), GraphError::InvalidOperation(_));
    Ok(())
}

#[test]
fn test_seeded_graphs_are_reproducible() -> Result<(), GraphError> {
    let sample = |seed| -> Result<(Tensor, Tensor), GraphError> {
        let graph = Graph::new_with_seed(seed);
        let w = graph.parameter(&[3, 4], Init::Normal { mean: 0.0, std: 1.0 }, "w")?;
        let noise = graph.randn(&[2, 2])?;
        Ok((w.value()?, noise.value()?))
    };
    assert_eq!(sample(7)?, sample(7)?);
    assert_ne!(sample(7)?.0, sample(8)?.0);

    // 重设种子后序列重新开始
    let graph = Graph::new_with_seed(7);
    let first = graph.randn(&[2, 2])?.value()?;
    graph.set_seed(7);
    assert_eq!(graph.randn(&[2, 2])?.value()?, first);
    Ok(())
}

#[test]
fn test_dropout_is_identity_in_eval_mode() -> Result<(), GraphError> {
    let graph = Graph::new_with_seed(3);
    let x = graph.input(&Tensor::ones(&[4, 8]))?;

    let train_out = x.dropout(0.5)?.value()?;
    // 被保留的元素放大为 1/(1-p)
    assert!(train_out.all(|v| v == 0.0 || v == 2.0));

    graph.eval();
    assert!(graph.is_eval());
    let eval_out = x.dropout(0.5)?;
    assert_eq!(eval_out.node_id(), x.node_id());
    graph.train();
    assert_eq!(x.dropout(0.0)?.node_id(), x.node_id());
    assert_err!(x.dropout(1.5), GraphError::InvalidOperation(_));
    Ok(())
}

#[test]
fn test_dropout_with_probability_one_zeroes_everything() -> Result<(), GraphError> {
    let graph = Graph::new_with_seed(3);
    let x = graph.parameter(&[3, 4], Init::Ones, "x")?;
    let y = x.dropout(1.0)?;
    assert!(y.value()?.all(|v| v == 0.0));

    y.sum()?.backward()?;
    let grad = x.grad()?.ok_or_else(|| GraphError::ComputationError("x没有梯度".to_string()))?;
    assert!(grad.all(|v| v == 0.0));
    Ok(())
}

#[test]
fn test_release_intermediate_results_keeps_persistent_nodes() -> Result<(), GraphError> {
    let graph = Graph::new_with_seed(1);
    let w = graph.parameter(&[2, 2], Init::Ones, "w")?;
    let c = graph.constant_named(&Tensor::ones(&[2, 2]), "incidence")?;
    let x = graph.input_named(&Tensor::ones(&[2, 2]), "x")?;
    let loss = w.try_mul(&c)?.try_mul(&x)?.sum()?;
    loss.backward()?;
    assert_eq!(graph.nodes_count(), 6);

    graph.release_intermediate_results();
    assert_eq!(graph.nodes_count(), 2);
    assert_eq!(graph.parameters().len(), 1);
    assert!(w.grad()?.is_some());
    assert_err!(loss.value(), GraphError::NodeNotFound(_));
    // 释放后名称可以复用
    graph.input_named(&Tensor::ones(&[2, 2]), "x")?;
    Ok(())
}

#[test]
fn test_set_value_only_for_leaf_nodes() -> Result<(), GraphError> {
    let graph = Graph::new();
    let x = graph.input(&Tensor::zeros(&[1, 2]))?;
    x.set_value(&Tensor::ones(&[1, 2]))?;
    assert_eq!(x.value()?, Tensor::ones(&[1, 2]));
    assert_err!(x.set_value(&Tensor::ones(&[2, 2])), GraphError::ShapeMismatch([1, 2], [2, 2]));

    let y = x.sigmoid()?;
    assert_err!(y.set_value(&Tensor::ones(&[1, 2])), GraphError::InvalidOperation(_));
    Ok(())
}
