/*
 * @Author       : 老董
 * @Date         : 2026-03-04
 * @Description  : 节点句柄：统一持有节点的值、梯度、父节点等图层面的信息，
 *                 具体的数值计算委托给`raw_node`
 */

use std::fmt;

use super::raw_node::{NodeType, TraitNode};
use crate::nn::GraphError;
use crate::tensor::Tensor;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

pub(in crate::nn) struct NodeHandle {
    id: NodeId,
    name: String,
    raw_node: NodeType,
    /// NOTE: 注意顺序，部分节点（如MatMul、Divide）的梯度依赖父节点的位置
    parents: Vec<NodeId>,
    value: Tensor,
    grad: Option<Tensor>,
    /// 本节点或其上游存在可训练参数时为true，反向传播只沿这类节点进行
    requires_grad: bool,
    /// 常驻节点（参数、常量）在`release_intermediate_results`时保留
    persistent: bool,
}

impl NodeHandle {
    pub(in crate::nn) fn new(
        id: NodeId,
        name: String,
        raw_node: NodeType,
        parents: Vec<NodeId>,
        value: Tensor,
        requires_grad: bool,
        persistent: bool,
    ) -> Self {
        Self {
            id,
            name,
            raw_node,
            parents,
            value,
            grad: None,
            requires_grad,
            persistent,
        }
    }

    pub(in crate::nn) const fn id(&self) -> NodeId {
        self.id
    }

    pub(in crate::nn) fn name(&self) -> &str {
        &self.name
    }

    pub(in crate::nn) const fn raw_node(&self) -> &NodeType {
        &self.raw_node
    }

    pub(in crate::nn) fn parents(&self) -> &[NodeId] {
        &self.parents
    }

    pub(in crate::nn) const fn value(&self) -> &Tensor {
        &self.value
    }

    /// 直接替换节点的值（仅允许叶子节点，且形状不可变）
    pub(in crate::nn) fn set_value(&mut self, value: &Tensor) -> Result<(), GraphError> {
        if !self.parents.is_empty() {
            return Err(GraphError::InvalidOperation(format!(
                "{self}的值由父节点计算，不应该被手动设置"
            )));
        }
        if !value.is_same_shape(&self.value) {
            return Err(GraphError::ShapeMismatch {
                expected: self.value.shape().to_vec(),
                got: value.shape().to_vec(),
                message: format!("{self}的新值形状与原值不一致"),
            });
        }
        self.value = value.clone();
        Ok(())
    }

    pub(in crate::nn) const fn grad(&self) -> Option<&Tensor> {
        self.grad.as_ref()
    }

    pub(in crate::nn) fn clear_grad(&mut self) {
        self.grad = None;
    }

    /// 累加梯度（同一节点可能被多个子节点使用）
    pub(in crate::nn) fn accumulate_grad(&mut self, grad: Tensor) -> Result<(), GraphError> {
        if !grad.is_same_shape(&self.value) {
            return Err(GraphError::ShapeMismatch {
                expected: self.value.shape().to_vec(),
                got: grad.shape().to_vec(),
                message: format!("传给{self}的梯度形状与其值不一致"),
            });
        }
        self.grad = Some(match self.grad.take() {
            Some(existing) => &existing + &grad,
            None => grad,
        });
        Ok(())
    }

    pub(in crate::nn) fn set_grad(&mut self, grad: Tensor) {
        self.grad = Some(grad);
    }

    pub(in crate::nn) const fn requires_grad(&self) -> bool {
        self.requires_grad
    }

    pub(in crate::nn) fn is_trainable(&self) -> bool {
        self.raw_node.is_trainable()
    }

    pub(in crate::nn) const fn is_persistent(&self) -> bool {
        self.persistent
    }
}

impl fmt::Display for NodeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "节点[{}]({})", self.name, self.id)
    }
}
