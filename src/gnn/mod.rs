/*
 * @Author       : 老董
 * @Date         : 2026-03-10
 * @Description  : 人体运动预测：图神经网络编码器 + 逐关节循环解码器
 *
 * 数据流：
 *   编码器输入 -> GnnEncoder/Rgnn -> 逐关节隐藏状态 -> 解码器自回归展开 -> 预测序列（点估计或高斯分布）
 *
 * # 模块结构
 * - `topology`: 骨架图（关节间有向边的关联矩阵）
 * - `message`: 节点↔边的特征变换
 * - `mlp`: 两层前馈块（含dropout与批归一化）
 * - `encoder`: 消息传递编码器
 * - `rgnn`: 每个关节独立一个GRU的循环图单元
 * - `decoder`: 点估计/随机两种自回归解码器
 * - `model`: 编码器与解码器的组合（模型族）
 * - `config`: 模型配置（serde）
 * - `actions`: 动作标签与评估用的固定种子下标
 */

mod actions;
mod config;
mod decoder;
mod encoder;
mod message;
mod mlp;
mod model;
mod rgnn;
mod topology;

pub use actions::{
    ACTIONS, SRNN_SEED, action_index, action_one_hot, define_actions, srnn_seed_indices,
};
pub use config::{LossKind, ModelConfig, ModelVariant};
pub use decoder::{
    CellStep, DecoderWrapper, DistributionDecoding, PointDecoding, RecurrentCell,
    StochasticDecoderWrapper,
};
pub use encoder::{GnnEncoder, GnnEncoderConfig, PassingRounds, RoundTransform};
pub use message::{Incidence, edge_to_node, node_to_edge};
pub use mlp::Mlp;
pub use model::{Forecast, GnnModel};
pub use rgnn::{Rgnn, RgnnOutput};
pub use topology::SkeletonGraph;

#[cfg(test)]
mod tests;
