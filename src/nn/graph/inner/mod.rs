/*
 * @Author       : 老董
 * @Date         : 2026-03-05
 * @Description  : GraphInner 计算图的底层实现
 *
 * 各 impl 块分散在子模块中：
 * - core.rs: 创建、访问器、随机数
 * - node_builders.rs: new_*_node（创建即前向计算）
 * - backward.rs: VJP 反向传播
 * - mode.rs: train/eval、梯度清零、释放中间结果
 */

mod backward;
mod core;
mod mode;
mod node_builders;

use crate::nn::NodeId;
use crate::nn::nodes::NodeHandle;
use rand::rngs::StdRng;
use std::collections::{HashMap, HashSet};

/// 图的完整定义（核心实现）
///
/// 用户通常通过 `Graph` 句柄使用此结构
pub struct GraphInner {
    pub(in crate::nn::graph) name: String,
    pub(in crate::nn::graph) nodes: HashMap<NodeId, NodeHandle>,
    /// 已被占用的节点名，保证节点名在图内唯一
    pub(in crate::nn::graph) node_names: HashSet<String>,
    pub(in crate::nn::graph) next_id: u64,
    pub(in crate::nn::graph) is_eval_mode: bool,
    /// 图级别的随机数生成器（参数初始化、dropout掩码、高斯噪声）
    /// None 表示使用 thread_rng（非确定性）
    pub(in crate::nn::graph) rng: Option<StdRng>,
}

impl Default for GraphInner {
    fn default() -> Self {
        Self::new()
    }
}
