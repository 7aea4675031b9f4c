/*
 * @Author       : 老董
 * @Date         : 2026-03-05
 * @Description  : GraphInner 节点构建方法（new_*_node）
 *
 * 节点在创建时即由父节点的值算出自身的值（define-by-run）
 */

use super::super::error::GraphError;
use super::GraphInner;
use crate::nn::NodeId;
use crate::nn::nodes::raw_node::{
    Abs, Add, BatchNormalize, BatchStatistics, Concat, Divide, Dropout, Elu, IndexSelect, Input,
    Ln, MatMul, Mean, Multiply, Narrow, Parameter, Permute, Reshape, ScalarMultiply, Sigmoid,
    SoftPlus, Subtract, Sum, Tanh, TraitNode,
};
use crate::nn::nodes::{NodeHandle, NodeType};
use crate::tensor::Tensor;
use rand::distributions::{Bernoulli, Distribution};

impl GraphInner {
    /// 添加叶子节点
    fn add_leaf_node(
        &mut self,
        raw_node: NodeType,
        value: &Tensor,
        name: Option<&str>,
        persistent: bool,
    ) -> Result<NodeId, GraphError> {
        let node_id = self.generate_valid_node_id();
        let node_name = self.generate_valid_new_node_name(name, raw_node.type_name(), node_id)?;
        let requires_grad = raw_node.is_trainable();
        if name.is_some() {
            self.node_names.insert(node_name.clone());
        }
        let node = NodeHandle::new(
            node_id,
            node_name,
            raw_node,
            Vec::new(),
            value.clone(),
            requires_grad,
            persistent,
        );
        self.nodes.insert(node_id, node);
        Ok(node_id)
    }

    /// 添加算子节点，并立即由父节点的值计算其值
    fn add_op_node(
        &mut self,
        mut raw_node: NodeType,
        parents: &[NodeId],
        name: Option<&str>,
    ) -> Result<NodeId, GraphError> {
        let (value, requires_grad) = {
            let parent_nodes = parents
                .iter()
                .map(|&id| self.get_node(id))
                .collect::<Result<Vec<_>, _>>()?;
            let parent_values: Vec<&Tensor> = parent_nodes.iter().map(|n| n.value()).collect();
            let value = raw_node.calc_value_by_parents(&parent_values)?;
            let requires_grad = parent_nodes.iter().any(|n| n.requires_grad());
            (value, requires_grad)
        };

        let node_id = self.generate_valid_node_id();
        let node_name = self.generate_valid_new_node_name(name, raw_node.type_name(), node_id)?;
        if name.is_some() {
            self.node_names.insert(node_name.clone());
        }
        let node = NodeHandle::new(
            node_id,
            node_name,
            raw_node,
            parents.to_vec(),
            value,
            requires_grad,
            false,
        );
        self.nodes.insert(node_id, node);
        Ok(node_id)
    }

    fn node_shape(&self, id: NodeId) -> Result<Vec<usize>, GraphError> {
        Ok(self.get_node(id)?.value().shape().to_vec())
    }

    // ========== 叶子节点 ==========

    /// 创建输入节点（每个训练步重新创建，`release_intermediate_results`时释放）
    pub fn new_input_node(&mut self, value: &Tensor, name: Option<&str>) -> Result<NodeId, GraphError> {
        self.add_leaf_node(Input.into(), value, name, false)
    }

    /// 创建常量节点（如关联矩阵），与参数一样常驻于图中
    pub fn new_constant_node(
        &mut self,
        value: &Tensor,
        name: Option<&str>,
    ) -> Result<NodeId, GraphError> {
        self.add_leaf_node(Input.into(), value, name, true)
    }

    /// 创建参数节点
    pub fn new_parameter_node(
        &mut self,
        value: &Tensor,
        name: Option<&str>,
    ) -> Result<NodeId, GraphError> {
        self.add_leaf_node(Parameter.into(), value, name, true)
    }

    // ========== 逐元素二元算子 ==========

    pub fn new_add_node(&mut self, a: NodeId, b: NodeId, name: Option<&str>) -> Result<NodeId, GraphError> {
        let node = Add::new(&self.node_shape(a)?, &self.node_shape(b)?)?;
        self.add_op_node(node.into(), &[a, b], name)
    }

    pub fn new_subtract_node(
        &mut self,
        a: NodeId,
        b: NodeId,
        name: Option<&str>,
    ) -> Result<NodeId, GraphError> {
        let node = Subtract::new(&self.node_shape(a)?, &self.node_shape(b)?)?;
        self.add_op_node(node.into(), &[a, b], name)
    }

    pub fn new_multiply_node(
        &mut self,
        a: NodeId,
        b: NodeId,
        name: Option<&str>,
    ) -> Result<NodeId, GraphError> {
        let node = Multiply::new(&self.node_shape(a)?, &self.node_shape(b)?)?;
        self.add_op_node(node.into(), &[a, b], name)
    }

    pub fn new_divide_node(
        &mut self,
        a: NodeId,
        b: NodeId,
        name: Option<&str>,
    ) -> Result<NodeId, GraphError> {
        let node = Divide::new(&self.node_shape(a)?, &self.node_shape(b)?)?;
        self.add_op_node(node.into(), &[a, b], name)
    }

    pub fn new_scalar_multiply_node(
        &mut self,
        a: NodeId,
        scalar: f32,
        name: Option<&str>,
    ) -> Result<NodeId, GraphError> {
        self.add_op_node(ScalarMultiply::new(scalar).into(), &[a], name)
    }

    pub fn new_mat_mul_node(
        &mut self,
        a: NodeId,
        b: NodeId,
        name: Option<&str>,
    ) -> Result<NodeId, GraphError> {
        let node = MatMul::new(&self.node_shape(a)?, &self.node_shape(b)?)?;
        self.add_op_node(node.into(), &[a, b], name)
    }

    // ========== 形状算子 ==========

    pub fn new_concat_node(
        &mut self,
        parents: &[NodeId],
        axis: usize,
        name: Option<&str>,
    ) -> Result<NodeId, GraphError> {
        let shapes = parents
            .iter()
            .map(|&id| self.node_shape(id))
            .collect::<Result<Vec<_>, _>>()?;
        let shape_refs: Vec<&[usize]> = shapes.iter().map(Vec::as_slice).collect();
        let node = Concat::new(&shape_refs, axis)?;
        self.add_op_node(node.into(), parents, name)
    }

    pub fn new_reshape_node(
        &mut self,
        a: NodeId,
        shape: &[usize],
        name: Option<&str>,
    ) -> Result<NodeId, GraphError> {
        let node = Reshape::new(&self.node_shape(a)?, shape)?;
        self.add_op_node(node.into(), &[a], name)
    }

    pub fn new_permute_node(
        &mut self,
        a: NodeId,
        axes: &[usize],
        name: Option<&str>,
    ) -> Result<NodeId, GraphError> {
        let node = Permute::new(&self.node_shape(a)?, axes)?;
        self.add_op_node(node.into(), &[a], name)
    }

    pub fn new_narrow_node(
        &mut self,
        a: NodeId,
        axis: usize,
        start: usize,
        len: usize,
        name: Option<&str>,
    ) -> Result<NodeId, GraphError> {
        let node = Narrow::new(&self.node_shape(a)?, axis, start, len)?;
        self.add_op_node(node.into(), &[a], name)
    }

    pub fn new_index_select_node(
        &mut self,
        a: NodeId,
        axis: usize,
        indices: &[usize],
        name: Option<&str>,
    ) -> Result<NodeId, GraphError> {
        let node = IndexSelect::new(&self.node_shape(a)?, axis, indices)?;
        self.add_op_node(node.into(), &[a], name)
    }

    // ========== 激活函数 ==========

    pub fn new_sigmoid_node(&mut self, a: NodeId, name: Option<&str>) -> Result<NodeId, GraphError> {
        self.add_op_node(Sigmoid.into(), &[a], name)
    }

    pub fn new_tanh_node(&mut self, a: NodeId, name: Option<&str>) -> Result<NodeId, GraphError> {
        self.add_op_node(Tanh.into(), &[a], name)
    }

    pub fn new_softplus_node(&mut self, a: NodeId, name: Option<&str>) -> Result<NodeId, GraphError> {
        self.add_op_node(SoftPlus.into(), &[a], name)
    }

    pub fn new_elu_node(&mut self, a: NodeId, name: Option<&str>) -> Result<NodeId, GraphError> {
        self.add_op_node(Elu.into(), &[a], name)
    }

    pub fn new_abs_node(&mut self, a: NodeId, name: Option<&str>) -> Result<NodeId, GraphError> {
        self.add_op_node(Abs.into(), &[a], name)
    }

    pub fn new_ln_node(&mut self, a: NodeId, name: Option<&str>) -> Result<NodeId, GraphError> {
        self.add_op_node(Ln.into(), &[a], name)
    }

    // ========== 正则化 ==========

    /// 创建 Dropout 节点
    ///
    /// 评估模式或`p == 0`时为恒等映射，直接返回父节点本身；`p == 1`时掩码全为0
    pub fn new_dropout_node(
        &mut self,
        a: NodeId,
        p: f32,
        name: Option<&str>,
    ) -> Result<NodeId, GraphError> {
        if !(0.0..=1.0).contains(&p) {
            return Err(GraphError::InvalidOperation(format!(
                "Dropout的概率须在[0, 1]内，实际为{p}"
            )));
        }
        if self.is_eval_mode || p == 0.0 {
            return Ok(a);
        }
        let shape = self.node_shape(a)?;
        if p == 1.0 {
            let node = Dropout::new(&shape, Tensor::zeros(&shape))?;
            return self.add_op_node(node.into(), &[a], name);
        }
        let keep = Bernoulli::new(f64::from(1.0 - p))
            .map_err(|e| GraphError::InvalidOperation(format!("Dropout的概率无效：{e}")))?;
        let scale = 1.0 / (1.0 - p);
        let size: usize = shape.iter().product();
        let data: Vec<f32> = self.with_rng(|rng| {
            (0..size)
                .map(|_| if keep.sample(&mut *rng) { scale } else { 0.0 })
                .collect()
        });
        let mask = Tensor::new(&data, &shape)?;
        let node = Dropout::new(&shape, mask)?;
        self.add_op_node(node.into(), &[a], name)
    }

    /// 创建批归一化节点，父节点依次为 x:[N, C]、gamma:[1, C]、beta:[1, C]
    pub(in crate::nn) fn new_batch_normalize_node(
        &mut self,
        x: NodeId,
        gamma: NodeId,
        beta: NodeId,
        statistics: BatchStatistics,
        eps: f32,
        name: Option<&str>,
    ) -> Result<NodeId, GraphError> {
        let node = BatchNormalize::new(
            &self.node_shape(x)?,
            &self.node_shape(gamma)?,
            statistics,
            eps,
        )?;
        self.add_op_node(node.into(), &[x, gamma, beta], name)
    }

    // ========== 归约 ==========

    pub fn new_sum_node(&mut self, a: NodeId, name: Option<&str>) -> Result<NodeId, GraphError> {
        self.add_op_node(Sum.into(), &[a], name)
    }

    pub fn new_mean_node(&mut self, a: NodeId, name: Option<&str>) -> Result<NodeId, GraphError> {
        self.add_op_node(Mean.into(), &[a], name)
    }
}
