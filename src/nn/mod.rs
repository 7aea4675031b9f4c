/*
 * @Author       : 老董
 * @Date         : 2026-03-04
 * @Description  : 负责神经网络（neural network）的构建：计算图、自动微分与基础层
 */

mod graph;
pub mod layer;
mod module;
mod nodes;
mod var;
mod var_ops;

pub use graph::{Graph, GraphError, GraphInner};
pub use layer::{BatchNorm, GruCell, Linear};
pub use module::Module;
pub use nodes::NodeId;
pub use var::{Init, Var};
pub use var_ops::{VarActivationOps, VarLossOps, VarMatrixOps, VarShapeOps};

#[cfg(test)]
pub(crate) mod tests;
