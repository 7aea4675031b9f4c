/*
 * @Author       : 老董
 * @Date         : 2026-03-05
 * @Description  : GraphInner VJP 反向传播
 */

use super::super::error::GraphError;
use super::GraphInner;
use crate::nn::NodeId;
use crate::nn::nodes::raw_node::TraitNode;
use crate::tensor::Tensor;
use std::collections::HashSet;
use tracing::warn;

impl GraphInner {
    /// 反向传播，返回损失的标量值
    ///
    /// 参数节点的梯度跨多次调用累加（直到`zero_grad`），中间节点的梯度在每次调用前重置
    pub fn backward(&mut self, loss: NodeId) -> Result<f32, GraphError> {
        if self.is_eval_mode {
            warn!("在eval模式下调用backward，这通常是误用");
        }

        let loss_node = self.get_node(loss)?;
        let loss_scalar = loss_node.value().number().ok_or_else(|| {
            GraphError::InvalidOperation(format!(
                "反向传播要求损失为标量，但{loss_node}的形状为{:?}",
                loss_node.value().shape()
            ))
        })?;
        if !loss_node.requires_grad() {
            return Err(GraphError::InvalidOperation(format!(
                "{loss_node}不依赖任何参数，无法反向传播"
            )));
        }
        let loss_grad = Tensor::ones(loss_node.value().shape());

        self.reset_intermediate_grad();
        self.get_node_mut(loss)?.accumulate_grad(loss_grad)?;

        let topo_order = self.topological_sort_backward(loss)?;
        for node_id in topo_order {
            self.propagate_grad_to_parents(node_id)?;
        }
        Ok(loss_scalar)
    }

    /// 把节点自身的梯度按VJP分发给需要梯度的父节点
    fn propagate_grad_to_parents(&mut self, node_id: NodeId) -> Result<(), GraphError> {
        let parent_grads = {
            let node = self.get_node(node_id)?;
            let Some(upstream_grad) = node.grad() else {
                return Ok(());
            };
            let parent_nodes = node
                .parents()
                .iter()
                .map(|&id| self.get_node(id))
                .collect::<Result<Vec<_>, _>>()?;
            let parent_values: Vec<&Tensor> = parent_nodes.iter().map(|n| n.value()).collect();

            let mut grads = Vec::with_capacity(parent_nodes.len());
            for (index, parent) in parent_nodes.iter().enumerate() {
                if !parent.requires_grad() {
                    continue;
                }
                let grad = node.raw_node().calc_grad_to_parent(
                    index,
                    &parent_values,
                    node.value(),
                    upstream_grad,
                )?;
                grads.push((parent.id(), grad));
            }
            grads
        };

        for (parent_id, grad) in parent_grads {
            self.get_node_mut(parent_id)?.accumulate_grad(grad)?;
        }
        Ok(())
    }

    /// 从损失出发、只沿需要梯度的节点做拓扑排序，结果中子节点总在父节点之前
    fn topological_sort_backward(&self, loss: NodeId) -> Result<Vec<NodeId>, GraphError> {
        let mut visited = HashSet::new();
        let mut post_order = Vec::new();
        // (节点, 其父节点是否已入栈)
        let mut stack = vec![(loss, false)];

        while let Some((id, expanded)) = stack.pop() {
            if expanded {
                post_order.push(id);
                continue;
            }
            if !visited.insert(id) {
                continue;
            }
            stack.push((id, true));
            for &parent_id in self.get_node(id)?.parents() {
                if !visited.contains(&parent_id) && self.get_node(parent_id)?.requires_grad() {
                    stack.push((parent_id, false));
                }
            }
        }

        post_order.reverse();
        Ok(post_order)
    }
}
