//! # Motion GNN
//!
//! `motion_gnn`用纯rust实现一个人体运动预测模型：以图神经网络（GNN）在骨架图上做消息传递来编码观测到的关节序列，
//! 再以每个关节各自独立的GRU组成的循环图单元自回归地解码出未来若干帧（点估计或逐元素高斯分布）。
//!
//! 模型所需的张量运算与反向自动微分由本crate自带的`tensor`与`nn`模块提供。
//!

pub mod errors;
pub mod gnn;
pub mod nn;
pub mod tensor;
pub mod utils;
