/*
 * @Author       : 老董
 * @Date         : 2026-03-05
 * @Description  : Graph 句柄（用户级 API）
 */

use super::error::GraphError;
use super::inner::GraphInner;
use crate::nn::NodeId;
use crate::nn::var::{Init, Var};
use crate::tensor::Tensor;
use std::cell::RefCell;
use std::rc::Rc;

/// Graph - 计算图句柄（PyTorch 风格用户 API）
///
/// # 设计原则
/// - 是 `Rc<RefCell<GraphInner>>` 的薄封装
/// - Clone 语义：多个 Graph 引用同一个 GraphInner
/// - 创建的 Var 自动持有图引用
#[derive(Clone)]
pub struct Graph {
    inner: Rc<RefCell<GraphInner>>,
}

impl Graph {
    // ==================== 创建 ====================

    /// 创建新图
    pub fn new() -> Self {
        Self::from_inner(GraphInner::new())
    }

    /// 创建带种子的图（参数初始化、dropout、采样噪声均可复现）
    pub fn new_with_seed(seed: u64) -> Self {
        Self::from_inner(GraphInner::new_with_seed(seed))
    }

    /// 从现有 GraphInner 创建句柄
    pub fn from_inner(inner: GraphInner) -> Self {
        Self {
            inner: Rc::new(RefCell::new(inner)),
        }
    }

    /// 从现有 Rc 创建句柄
    pub(crate) const fn from_rc(inner: Rc<RefCell<GraphInner>>) -> Self {
        Self { inner }
    }

    /// 获取内部 GraphInner 的不可变引用
    pub fn inner(&self) -> std::cell::Ref<'_, GraphInner> {
        self.inner.borrow()
    }

    /// 获取内部 GraphInner 的可变引用
    pub fn inner_mut(&self) -> std::cell::RefMut<'_, GraphInner> {
        self.inner.borrow_mut()
    }

    /// 将 NodeId 包装成 Var
    pub fn wrap_node_id(&self, node_id: NodeId) -> Var {
        Var::new(node_id, Rc::clone(&self.inner))
    }

    /// 两个句柄是否指向同一个图
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    // ==================== 创建变量 ====================

    /// 创建输入节点并设置数据
    pub fn input(&self, data: &Tensor) -> Result<Var, GraphError> {
        let node_id = self.inner.borrow_mut().new_input_node(data, None)?;
        Ok(self.wrap_node_id(node_id))
    }

    /// 创建命名输入节点
    pub fn input_named(&self, data: &Tensor, name: &str) -> Result<Var, GraphError> {
        let node_id = self.inner.borrow_mut().new_input_node(data, Some(name))?;
        Ok(self.wrap_node_id(node_id))
    }

    /// 创建常量张量（常驻于图中，不随中间结果释放）
    pub fn constant(&self, data: &Tensor) -> Result<Var, GraphError> {
        let node_id = self.inner.borrow_mut().new_constant_node(data, None)?;
        Ok(self.wrap_node_id(node_id))
    }

    /// 创建命名常量张量
    pub fn constant_named(&self, data: &Tensor, name: &str) -> Result<Var, GraphError> {
        let node_id = self.inner.borrow_mut().new_constant_node(data, Some(name))?;
        Ok(self.wrap_node_id(node_id))
    }

    /// 创建参数节点（使用图的 RNG 初始化）
    pub fn parameter(&self, shape: &[usize], init: Init, name: &str) -> Result<Var, GraphError> {
        let mut g = self.inner.borrow_mut();
        let init_data = g.with_rng(|rng| init.generate_with_rng(shape, rng));
        let node_id = g.new_parameter_node(&init_data, Some(name))?;
        drop(g);
        Ok(self.wrap_node_id(node_id))
    }

    /// 创建零张量输入
    pub fn zeros(&self, shape: &[usize]) -> Result<Var, GraphError> {
        self.input(&Tensor::zeros(shape))
    }

    /// 创建全一张量输入
    pub fn ones(&self, shape: &[usize]) -> Result<Var, GraphError> {
        self.input(&Tensor::ones(shape))
    }

    /// 创建标准正态分布的随机输入（使用图的 RNG）
    pub fn randn(&self, shape: &[usize]) -> Result<Var, GraphError> {
        let data = self
            .inner
            .borrow_mut()
            .with_rng(|rng| Tensor::normal_with_rng(0.0, 1.0, shape, rng));
        self.input(&data)
    }

    // ==================== 训练控制 ====================

    /// 反向传播
    pub fn backward(&self, loss: &Var) -> Result<f32, GraphError> {
        loss.backward()
    }

    /// 清零所有节点的梯度
    pub fn zero_grad(&self) {
        self.inner.borrow_mut().zero_grad();
    }

    /// 释放参数与常量以外的全部节点
    pub fn release_intermediate_results(&self) {
        self.inner.borrow_mut().release_intermediate_results();
    }

    /// 设置/重置随机种子
    pub fn set_seed(&self, seed: u64) {
        self.inner.borrow_mut().set_seed(seed);
    }

    /// 设置训练模式
    pub fn train(&self) {
        self.inner.borrow_mut().set_train_mode();
    }

    /// 设置评估模式
    pub fn eval(&self) {
        self.inner.borrow_mut().set_eval_mode();
    }

    /// 是否处于评估模式
    pub fn is_eval(&self) -> bool {
        !self.inner.borrow().is_train_mode()
    }

    /// 所有可训练参数，按创建顺序排列
    pub fn parameters(&self) -> Vec<Var> {
        let ids = self.inner.borrow().get_trainable_nodes();
        ids.into_iter().map(|id| self.wrap_node_id(id)).collect()
    }

    pub fn nodes_count(&self) -> usize {
        self.inner.borrow().nodes_count()
    }
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}
