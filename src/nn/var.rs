/*
 * @Author       : 老董
 * @Date         : 2026-03-05
 * @Description  : Var - 变量句柄，携带图引用，支持链式调用
 */

use super::graph::{Graph, GraphInner};
use super::{GraphError, NodeId};
use crate::tensor::Tensor;
use rand::Rng;
use std::cell::RefCell;
use std::rc::Rc;

// ==================== Init 枚举 ====================

/// 参数初始化策略
#[derive(Debug, Clone, PartialEq)]
pub enum Init {
    /// 常数初始化
    Constant(f32),
    /// 全零
    Zeros,
    /// 全一
    Ones,
    /// 均匀分布[low, high]（PyTorch 的 Linear/GRU 默认即为 ±1/√fan_in）
    Uniform { low: f32, high: f32 },
    /// 正态分布
    Normal { mean: f32, std: f32 },
    /// Kaiming/He 初始化（适用于 `ReLU`）
    Kaiming,
    /// Xavier/Glorot 初始化（适用于 Sigmoid/Tanh）
    Xavier,
}

impl Init {
    /// 对称均匀分布 ±bound
    pub const fn symmetric_uniform(bound: f32) -> Self {
        Self::Uniform {
            low: -bound,
            high: bound,
        }
    }

    /// 生成初始化后的 Tensor（使用指定的 RNG）。权重形状约定为[fan_in, fan_out, ...]
    pub fn generate_with_rng<R: Rng + ?Sized>(&self, shape: &[usize], rng: &mut R) -> Tensor {
        let fan_in = shape.first().copied().unwrap_or(1).max(1);
        let fan_out = shape.get(1).copied().unwrap_or(1);
        match self {
            Self::Constant(v) => Tensor::full(*v, shape),
            Self::Zeros => Tensor::zeros(shape),
            Self::Ones => Tensor::ones(shape),
            Self::Uniform { low, high } => Tensor::uniform_with_rng(*low, *high, shape, rng),
            Self::Normal { mean, std } => Tensor::normal_with_rng(*mean, *std, shape, rng),
            Self::Kaiming => {
                let std = (2.0 / fan_in as f32).sqrt();
                Tensor::normal_with_rng(0.0, std, shape, rng)
            }
            Self::Xavier => {
                let std = (2.0 / (fan_in + fan_out) as f32).sqrt();
                Tensor::normal_with_rng(0.0, std, shape, rng)
            }
        }
    }
}

// ==================== Var 结构 ====================

/// 变量句柄 - 携带图引用，支持链式调用
///
/// # 设计原则
/// - 持有 `Rc<RefCell<GraphInner>>` 引用
/// - Clone 语义（非 Copy），但开销极低（Rc clone）
/// - 所有运算都返回`Result`，形状错误在建节点时即被发现
///
/// # 使用示例
/// ```ignore
/// let graph = Graph::new();
/// let x = graph.input(&data)?;
/// let y = x.matmul(&w)?.try_add(&b)?.sigmoid()?;
/// let loss = y.mse_loss(&target)?;
/// loss.backward()?;
/// ```
#[derive(Clone)]
pub struct Var {
    id: NodeId,
    graph: Rc<RefCell<GraphInner>>,
}

impl std::fmt::Debug for Var {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Var").field("id", &self.id).finish()
    }
}

impl Var {
    /// 创建新的 Var（内部使用）
    pub(crate) const fn new(id: NodeId, graph: Rc<RefCell<GraphInner>>) -> Self {
        Self { id, graph }
    }

    /// 获取节点 ID
    pub const fn node_id(&self) -> NodeId {
        self.id
    }

    /// 获取内部图引用（供 trait 和内部模块使用）
    pub(crate) const fn graph(&self) -> &Rc<RefCell<GraphInner>> {
        &self.graph
    }

    /// 检查两个 Var 是否来自同一个 Graph
    pub fn same_graph(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.graph, &other.graph)
    }

    /// 获取 Var 所属的 Graph handle
    pub fn get_graph(&self) -> Graph {
        Graph::from_rc(Rc::clone(&self.graph))
    }

    /// 在本 Var 所在的图上创建节点，并包装成新的 Var
    pub(crate) fn derive<F>(&self, build: F) -> Result<Self, GraphError>
    where
        F: FnOnce(&mut GraphInner) -> Result<NodeId, GraphError>,
    {
        let id = build(&mut *self.graph.borrow_mut())?;
        Ok(Self::new(id, Rc::clone(&self.graph)))
    }

    pub(crate) fn ensure_same_graph(&self, other: &Self, op_name: &str) -> Result<(), GraphError> {
        if self.same_graph(other) {
            Ok(())
        } else {
            Err(GraphError::InvalidOperation(format!(
                "不能对来自不同 Graph 的 Var 进行{op_name}"
            )))
        }
    }

    // ==================== 执行 ====================

    /// 反向传播，返回 loss 的标量值
    pub fn backward(&self) -> Result<f32, GraphError> {
        self.graph.borrow_mut().backward(self.id)
    }

    // ==================== 值访问和设置 ====================

    /// 获取节点的值（克隆的 Tensor）
    pub fn value(&self) -> Result<Tensor, GraphError> {
        Ok(self.graph.borrow().get_node_value(self.id)?.clone())
    }

    /// 节点值的形状
    pub fn shape(&self) -> Result<Vec<usize>, GraphError> {
        Ok(self.graph.borrow().get_node_value(self.id)?.shape().to_vec())
    }

    /// 设置叶子节点的值
    pub fn set_value(&self, value: &Tensor) -> Result<(), GraphError> {
        self.graph.borrow_mut().set_node_value(self.id, value)
    }

    /// 获取标量值
    pub fn item(&self) -> Result<f32, GraphError> {
        self.value()?
            .number()
            .ok_or_else(|| GraphError::InvalidOperation("Tensor 不是标量".to_string()))
    }

    /// 获取节点的梯度（尚未反向传播时为None）
    pub fn grad(&self) -> Result<Option<Tensor>, GraphError> {
        Ok(self.graph.borrow().get_node_grad(self.id)?.cloned())
    }

    pub fn name(&self) -> Result<String, GraphError> {
        Ok(self.graph.borrow().get_node_name(self.id)?.to_string())
    }

    // ==================== 算术（返回 Result）====================

    /// 加法（支持广播）
    pub fn try_add(&self, other: &Self) -> Result<Self, GraphError> {
        self.ensure_same_graph(other, "加法")?;
        self.derive(|g| g.new_add_node(self.id, other.id, None))
    }

    /// 减法（支持广播）
    pub fn try_sub(&self, other: &Self) -> Result<Self, GraphError> {
        self.ensure_same_graph(other, "减法")?;
        self.derive(|g| g.new_subtract_node(self.id, other.id, None))
    }

    /// 逐元素乘法（支持广播）
    pub fn try_mul(&self, other: &Self) -> Result<Self, GraphError> {
        self.ensure_same_graph(other, "乘法")?;
        self.derive(|g| g.new_multiply_node(self.id, other.id, None))
    }

    /// 逐元素除法：`self / other`（支持广播）
    pub fn try_div(&self, other: &Self) -> Result<Self, GraphError> {
        self.ensure_same_graph(other, "除法")?;
        self.derive(|g| g.new_divide_node(self.id, other.id, None))
    }

    /// 乘以纯数
    pub fn scale(&self, scalar: f32) -> Result<Self, GraphError> {
        self.derive(|g| g.new_scalar_multiply_node(self.id, scalar, None))
    }

    /// 沿`axis`拼接多个 Var
    pub fn concat(vars: &[&Self], axis: usize) -> Result<Self, GraphError> {
        let first = vars.first().ok_or_else(|| {
            GraphError::InvalidOperation("Concat至少需要1个Var".to_string())
        })?;
        for var in vars {
            first.ensure_same_graph(var, "拼接")?;
        }
        let ids: Vec<NodeId> = vars.iter().map(|v| v.id).collect();
        first.derive(|g| g.new_concat_node(&ids, axis, None))
    }

    /// 沿新的第0维堆叠形状相同的 Var
    pub fn stack(vars: &[&Self]) -> Result<Self, GraphError> {
        let expanded = vars
            .iter()
            .map(|v| {
                let mut shape = v.shape()?;
                shape.insert(0, 1);
                v.derive(|g| g.new_reshape_node(v.id, &shape, None))
            })
            .collect::<Result<Vec<_>, _>>()?;
        let refs: Vec<&Self> = expanded.iter().collect();
        Self::concat(&refs, 0)
    }
}
