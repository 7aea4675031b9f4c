/*
 * @Author       : 老董
 * @Date         : 2026-03-05
 * @Description  : GraphInner 核心操作
 */

use super::super::error::GraphError;
use super::GraphInner;
use crate::nn::NodeId;
use crate::nn::nodes::{NodeHandle, NodeType};
use crate::tensor::Tensor;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use std::collections::{HashMap, HashSet};

impl GraphInner {
    // ========== 创建 ==========

    pub fn new() -> Self {
        Self::with_name("default_graph")
    }

    /// 创建一个带固定种子的计算图（确保可重复性）
    pub fn new_with_seed(seed: u64) -> Self {
        let mut graph = Self::new();
        graph.set_seed(seed);
        graph
    }

    pub fn with_name(name: &str) -> Self {
        Self {
            name: name.to_string(),
            nodes: HashMap::new(),
            node_names: HashSet::new(),
            next_id: 0,
            is_eval_mode: false,
            rng: None,
        }
    }

    // ========== 基础访问器 ==========

    /// 设置/重置图的随机种子
    pub fn set_seed(&mut self, seed: u64) {
        self.rng = Some(StdRng::seed_from_u64(seed));
    }

    /// 检查图是否有固定种子
    pub const fn has_seed(&self) -> bool {
        self.rng.is_some()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn nodes_count(&self) -> usize {
        self.nodes.len()
    }

    pub(in crate::nn) fn get_node(&self, id: NodeId) -> Result<&NodeHandle, GraphError> {
        self.nodes.get(&id).ok_or(GraphError::NodeNotFound(id))
    }

    pub(in crate::nn) fn get_node_mut(&mut self, id: NodeId) -> Result<&mut NodeHandle, GraphError> {
        self.nodes.get_mut(&id).ok_or(GraphError::NodeNotFound(id))
    }

    pub fn get_node_name(&self, id: NodeId) -> Result<&str, GraphError> {
        Ok(self.get_node(id)?.name())
    }

    pub fn get_node_parents(&self, id: NodeId) -> Result<Vec<NodeId>, GraphError> {
        Ok(self.get_node(id)?.parents().to_vec())
    }

    pub fn get_node_value(&self, id: NodeId) -> Result<&Tensor, GraphError> {
        Ok(self.get_node(id)?.value())
    }

    /// 替换叶子节点（输入、参数）的值，形状必须不变
    pub fn set_node_value(&mut self, id: NodeId, value: &Tensor) -> Result<(), GraphError> {
        self.get_node_mut(id)?.set_value(value)
    }

    pub fn get_node_grad(&self, id: NodeId) -> Result<Option<&Tensor>, GraphError> {
        let node = self.get_node(id)?;
        // 输入节点不应该有梯度
        if let NodeType::Input(_) = node.raw_node() {
            return Err(GraphError::InvalidOperation(format!(
                "输入{node}不应该有梯度"
            )));
        }
        Ok(node.grad())
    }

    /// 所有可训练参数节点，按创建顺序排列
    pub fn get_trainable_nodes(&self) -> Vec<NodeId> {
        let mut ids: Vec<NodeId> = self
            .nodes
            .values()
            .filter(|node| node.is_trainable())
            .map(NodeHandle::id)
            .collect();
        ids.sort_unstable();
        ids
    }

    // ========== 随机数 ==========

    /// 用图的随机数生成器执行`f`；未设种子时退回`thread_rng`
    pub(in crate::nn) fn with_rng<T>(&mut self, f: impl FnOnce(&mut dyn RngCore) -> T) -> T {
        match self.rng.as_mut() {
            Some(rng) => f(rng),
            None => f(&mut rand::thread_rng()),
        }
    }

    pub(in crate::nn::graph) fn generate_valid_node_id(&mut self) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        id
    }

    /// 未指定名称时按"类型名_编号"生成；指定的名称若已被占用则报错
    pub(in crate::nn::graph) fn generate_valid_new_node_name(
        &self,
        name: Option<&str>,
        type_name: &str,
        id: NodeId,
    ) -> Result<String, GraphError> {
        match name {
            Some(name) if self.node_names.contains(name) => {
                Err(GraphError::DuplicateNodeName(name.to_string()))
            }
            Some(name) => Ok(name.to_string()),
            None => Ok(format!("{type_name}_{}", id.0)),
        }
    }
}
