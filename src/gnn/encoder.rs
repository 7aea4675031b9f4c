/*
 * @Author       : 老董
 * @Date         : 2026-03-11
 * @Description  : GnnEncoder：在固定骨架图上做若干轮消息传递
 *
 * 每一轮：
 *   1. 节点 -> 边：edge = node_to_edge(node)
 *   2. 边更新MLP：2*D -> edge_hidden -> edge_out
 *   3. 边 -> 节点：按边权重聚合
 *   4. 与上一轮的节点特征（跳连）拼接后过节点更新MLP：edge_out + D -> node_hidden -> node_out
 *   5. 结果作为下一轮的跳连特征
 * 最后一轮的边特征经 Linear(edge_out, 1) + sigmoid 解码为学到的边权重
 */

use tracing::debug;

use super::message::{Incidence, edge_to_node, node_to_edge};
use super::mlp::Mlp;
use crate::nn::{Graph, GraphError, Linear, Module, Var, VarActivationOps};

/// 编码器的维度与消息传递设置
#[derive(Debug, Clone, PartialEq)]
pub struct GnnEncoderConfig {
    /// 第0轮输入的节点特征维度
    pub input_dim: usize,
    pub node_hidden_dim: usize,
    pub node_out_dim: usize,
    pub edge_hidden_dim: usize,
    pub edge_out_dim: usize,
    pub num_passing: usize,
    /// 各轮是否共用同一对MLP（要求`input_dim == node_out_dim`）
    pub weight_share: bool,
    pub dropout: f32,
}

/// 一轮消息传递用到的一对变换
pub struct RoundTransform {
    edge_mlp: Mlp,
    node_mlp: Mlp,
}

impl RoundTransform {
    fn new(
        graph: &Graph,
        node_in: usize,
        config: &GnnEncoderConfig,
        name: &str,
    ) -> Result<Self, GraphError> {
        Ok(Self {
            edge_mlp: Mlp::new(
                graph,
                2 * node_in,
                config.edge_hidden_dim,
                config.edge_out_dim,
                config.dropout,
                &format!("{name}_edge"),
            )?,
            node_mlp: Mlp::new(
                graph,
                config.edge_out_dim + node_in,
                config.node_hidden_dim,
                config.node_out_dim,
                config.dropout,
                &format!("{name}_node"),
            )?,
        })
    }

    pub const fn edge_mlp(&self) -> &Mlp {
        &self.edge_mlp
    }

    pub const fn node_mlp(&self) -> &Mlp {
        &self.node_mlp
    }
}

impl Module for RoundTransform {
    fn parameters(&self) -> Vec<Var> {
        [self.edge_mlp.parameters(), self.node_mlp.parameters()].concat()
    }
}

/// 各轮变换的组织方式，在构造时确定
pub enum PassingRounds {
    /// 所有轮次复用同一对变换
    Shared {
        transform: RoundTransform,
        num_passing: usize,
    },
    /// 每轮各自拥有一对变换，按轮次下标排列
    PerRound(Vec<RoundTransform>),
}

impl PassingRounds {
    /// 第`i`轮使用的变换，越界时为None
    pub fn round(&self, i: usize) -> Option<&RoundTransform> {
        match self {
            Self::Shared {
                transform,
                num_passing,
            } => (i < *num_passing).then_some(transform),
            Self::PerRound(transforms) => transforms.get(i),
        }
    }

    pub fn num_passing(&self) -> usize {
        match self {
            Self::Shared { num_passing, .. } => *num_passing,
            Self::PerRound(transforms) => transforms.len(),
        }
    }
}

impl Module for PassingRounds {
    fn parameters(&self) -> Vec<Var> {
        match self {
            Self::Shared { transform, .. } => transform.parameters(),
            Self::PerRound(transforms) => {
                transforms.iter().flat_map(Module::parameters).collect()
            }
        }
    }
}

pub struct GnnEncoder {
    rounds: PassingRounds,
    edge_decode: Linear,
    incidence: Incidence,
    input_dim: usize,
    name: String,
}

impl GnnEncoder {
    pub fn new(
        graph: &Graph,
        incidence: &Incidence,
        config: &GnnEncoderConfig,
        name: &str,
    ) -> Result<Self, GraphError> {
        let rounds = if config.weight_share && config.num_passing > 0 {
            if config.input_dim != config.node_out_dim {
                return Err(GraphError::InvalidOperation(format!(
                    "{name}各轮共享权重时输入维度({})须等于node_out_dim({})",
                    config.input_dim, config.node_out_dim
                )));
            }
            PassingRounds::Shared {
                transform: RoundTransform::new(
                    graph,
                    config.input_dim,
                    config,
                    &format!("{name}_shared"),
                )?,
                num_passing: config.num_passing,
            }
        } else {
            PassingRounds::PerRound(
                (0..config.num_passing)
                    .map(|i| {
                        let node_in = if i == 0 {
                            config.input_dim
                        } else {
                            config.node_out_dim
                        };
                        RoundTransform::new(graph, node_in, config, &format!("{name}_round{i}"))
                    })
                    .collect::<Result<_, _>>()?,
            )
        };

        Ok(Self {
            rounds,
            edge_decode: Linear::new(
                graph,
                config.edge_out_dim,
                1,
                true,
                &format!("{name}_edge_decode"),
            )?,
            incidence: incidence.clone(),
            input_dim: config.input_dim,
            name: name.to_string(),
        })
    }

    /// 前向传播
    ///
    /// - `node`: [B, J, input_dim]
    /// - `edge_weight`: [B, E, 1]，缺省时为全1
    ///
    /// 返回（节点特征[B, J, node_out_dim], 边权重[B, E, 1]）。
    /// 0轮时原样返回输入节点特征与传入（或缺省）的边权重。
    pub fn forward(
        &self,
        node: &Var,
        edge_weight: Option<&Var>,
    ) -> Result<(Var, Var), GraphError> {
        let shape = node.shape()?;
        let expected = [
            shape.first().copied().unwrap_or(0),
            self.incidence.num_joints(),
            self.input_dim,
        ];
        if shape != expected {
            return Err(GraphError::ShapeMismatch {
                expected: expected.to_vec(),
                got: shape,
                message: format!("{}的输入须为[B, J, input_dim]", self.name),
            });
        }
        let weight = match edge_weight {
            Some(w) => w.clone(),
            None => node
                .get_graph()
                .ones(&[shape[0], self.incidence.num_edges(), 1])?,
        };

        let mut node = node.clone();
        let mut last_edge = None;
        for i in 0..self.rounds.num_passing() {
            let transform = self.rounds.round(i).ok_or_else(|| {
                GraphError::InvalidOperation(format!("{}缺少第{i}轮的变换", self.name))
            })?;
            let edge = transform
                .edge_mlp
                .forward(&node_to_edge(&node, &self.incidence)?)?;
            let aggregated = edge_to_node(&edge, &self.incidence, &weight)?;
            node = transform
                .node_mlp
                .forward(&Var::concat(&[&node, &aggregated], 2)?)?;
            debug!(encoder = %self.name, round = i, "消息传递完成一轮");
            last_edge = Some(edge);
        }

        let learned_weight = match last_edge {
            Some(edge) => self.edge_decode.forward(&edge)?.sigmoid()?,
            None => weight,
        };
        Ok((node, learned_weight))
    }

    pub const fn rounds(&self) -> &PassingRounds {
        &self.rounds
    }

    pub fn num_passing(&self) -> usize {
        self.rounds.num_passing()
    }
}

impl Module for GnnEncoder {
    fn parameters(&self) -> Vec<Var> {
        [self.rounds.parameters(), self.edge_decode.parameters()].concat()
    }
}
