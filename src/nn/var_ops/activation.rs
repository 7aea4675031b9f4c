/*
 * @Author       : 老董
 * @Date         : 2026-03-05
 * @Description  : Var 激活函数扩展 trait
 */

use crate::nn::{GraphError, Var};

/// 激活函数扩展 trait
///
/// 提供常用逐元素函数的链式调用：
/// - `sigmoid()`: Sigmoid 激活
/// - `tanh()`: Tanh 激活
/// - `softplus()`: `SoftPlus` 激活（数值稳定）
/// - `elu()`: ELU 激活（alpha=1）
/// - `abs()`、`ln()`
/// - `dropout(p)`: 训练模式下的 inverted dropout
///
/// # 使用示例
/// ```ignore
/// use motion_gnn::nn::{Var, VarActivationOps};
///
/// let h = x.elu()?.dropout(0.1)?;
/// let std = raw.softplus()?;
/// ```
pub trait VarActivationOps {
    /// Sigmoid 激活：1 / (1 + exp(-x))
    fn sigmoid(&self) -> Result<Var, GraphError>;

    fn tanh(&self) -> Result<Var, GraphError>;

    /// `SoftPlus` 激活：log(1 + exp(x))
    fn softplus(&self) -> Result<Var, GraphError>;

    /// ELU 激活：x if x > 0 else exp(x) - 1
    fn elu(&self) -> Result<Var, GraphError>;

    fn abs(&self) -> Result<Var, GraphError>;

    /// 自然对数（输入须为正）
    fn ln(&self) -> Result<Var, GraphError>;

    /// 以概率`p`置零并把保留的元素放大1/(1-p)；评估模式下原样返回
    fn dropout(&self, p: f32) -> Result<Var, GraphError>;
}

impl VarActivationOps for Var {
    fn sigmoid(&self) -> Result<Var, GraphError> {
        self.derive(|g| g.new_sigmoid_node(self.node_id(), None))
    }

    fn tanh(&self) -> Result<Var, GraphError> {
        self.derive(|g| g.new_tanh_node(self.node_id(), None))
    }

    fn softplus(&self) -> Result<Var, GraphError> {
        self.derive(|g| g.new_softplus_node(self.node_id(), None))
    }

    fn elu(&self) -> Result<Var, GraphError> {
        self.derive(|g| g.new_elu_node(self.node_id(), None))
    }

    fn abs(&self) -> Result<Var, GraphError> {
        self.derive(|g| g.new_abs_node(self.node_id(), None))
    }

    fn ln(&self) -> Result<Var, GraphError> {
        self.derive(|g| g.new_ln_node(self.node_id(), None))
    }

    fn dropout(&self, p: f32) -> Result<Var, GraphError> {
        self.derive(|g| g.new_dropout_node(self.node_id(), p, None))
    }
}
