/*
 * @Author       : 老董
 * @Description  : gnn模块单元测试
 */

mod decoder;
mod rgnn;

use rand::SeedableRng;
use rand::rngs::StdRng;

use super::{Incidence, ModelConfig, ModelVariant, SkeletonGraph};
use crate::errors::ModelError;
use crate::nn::Graph;
use crate::tensor::Tensor;

/// 全连接骨架图在`graph`上的常量形式
fn fully_connected_incidence(graph: &Graph, num_joints: usize) -> Result<Incidence, ModelError> {
    let skeleton = SkeletonGraph::fully_connected(num_joints)?;
    Ok(Incidence::new(graph, &skeleton, "skeleton")?)
}

/// 标准正态随机张量（固定种子）
fn random_tensor(shape: &[usize], seed: u64) -> Tensor {
    let mut rng = StdRng::seed_from_u64(seed);
    Tensor::normal_with_rng(0.0, 1.0, shape, &mut rng)
}

/// 4个关节的小模型配置，便于快速跑通前向与反向
fn small_config(variant: ModelVariant, stochastic: bool) -> ModelConfig {
    ModelConfig {
        num_joints: 4,
        source_seq_len: 3,
        target_seq_len: 2,
        edge_hidden_dim: 5,
        edge_out_dim: 4,
        node_hidden_dim: 5,
        node_out_dim: 6,
        num_passing: 1,
        number_of_actions: 15,
        one_hot: true,
        weight_share: false,
        dropout: 0.0,
        residual_velocities: true,
        stochastic,
        variant,
        ..ModelConfig::default()
    }
}

fn assert_all_close(actual: &Tensor, expected: &[f32], epsilon: f32) {
    let actual = actual.to_vec();
    assert_eq!(actual.len(), expected.len());
    for (i, (a, e)) in actual.iter().zip(expected).enumerate() {
        assert!((a - e).abs() <= epsilon, "第{i}个元素不符：实际{a}，期望{e}");
    }
}
