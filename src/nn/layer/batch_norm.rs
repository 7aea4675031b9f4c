/*
 * @Author       : 老董
 * @Date         : 2026-03-06
 * @Description  : BatchNorm (一维批归一化) 层
 *
 * 训练模式：用当前batch的均值与有偏方差归一化，并以动量更新滑动统计量（滑动方差用无偏估计）
 * 评估模式：用滑动统计量归一化
 */

use std::cell::RefCell;

use crate::nn::nodes::BatchStatistics;
use crate::nn::{Graph, GraphError, Init, Module, Var};
use crate::tensor::Tensor;

pub struct BatchNorm {
    /// 缩放参数 [1, num_features]
    gamma: Var,
    /// 平移参数 [1, num_features]
    beta: Var,
    running_mean: RefCell<Tensor>,
    running_var: RefCell<Tensor>,
    num_features: usize,
    momentum: f32,
    eps: f32,
    name: String,
}

impl BatchNorm {
    pub const DEFAULT_MOMENTUM: f32 = 0.1;
    pub const DEFAULT_EPS: f32 = 1e-5;

    pub fn new(graph: &Graph, num_features: usize, name: &str) -> Result<Self, GraphError> {
        if num_features == 0 {
            return Err(GraphError::InvalidOperation(format!(
                "BatchNorm层{name}的特征数必须为正"
            )));
        }
        Ok(Self {
            gamma: graph.parameter(&[1, num_features], Init::Ones, &format!("{name}_gamma"))?,
            beta: graph.parameter(&[1, num_features], Init::Zeros, &format!("{name}_beta"))?,
            running_mean: RefCell::new(Tensor::zeros(&[1, num_features])),
            running_var: RefCell::new(Tensor::ones(&[1, num_features])),
            num_features,
            momentum: Self::DEFAULT_MOMENTUM,
            eps: Self::DEFAULT_EPS,
            name: name.to_string(),
        })
    }

    /// 前向传播，输入须为[N, num_features]
    pub fn forward(&self, x: &Var) -> Result<Var, GraphError> {
        let value = x.value()?;
        let shape = value.shape();
        if shape.len() != 2 || shape[1] != self.num_features {
            return Err(GraphError::ShapeMismatch {
                expected: vec![shape.first().copied().unwrap_or(0), self.num_features],
                got: shape.to_vec(),
                message: format!("{}的输入须为[N, num_features]", self.name),
            });
        }

        let statistics = if x.get_graph().is_eval() {
            BatchStatistics::Running {
                mean: self.running_mean.borrow().clone(),
                var: self.running_var.borrow().clone(),
            }
        } else {
            self.update_running_statistics(&value)?;
            BatchStatistics::Batch
        };

        let (gamma, beta) = (self.gamma.node_id(), self.beta.node_id());
        x.derive(|g| {
            g.new_batch_normalize_node(x.node_id(), gamma, beta, statistics, self.eps, None)
        })
    }

    fn update_running_statistics(&self, value: &Tensor) -> Result<(), GraphError> {
        let n = value.shape()[0];
        if n < 2 {
            return Err(GraphError::InvalidOperation(format!(
                "{}在训练模式下每个特征至少需要2个样本，实际为{n}",
                self.name
            )));
        }
        let n = n as f32;
        let mean = &value.sum_axis_keepdims(0)? / n;
        let centered = value - &mean;
        let unbiased_var = &(&centered * &centered).sum_axis_keepdims(0)? / (n - 1.0);

        let m = self.momentum;
        let mut running_mean = self.running_mean.borrow_mut();
        *running_mean = &(&*running_mean * (1.0 - m)) + &(&mean * m);
        let mut running_var = self.running_var.borrow_mut();
        *running_var = &(&*running_var * (1.0 - m)) + &(&unbiased_var * m);
        Ok(())
    }

    pub fn running_mean(&self) -> Tensor {
        self.running_mean.borrow().clone()
    }

    pub fn running_var(&self) -> Tensor {
        self.running_var.borrow().clone()
    }
}

impl Module for BatchNorm {
    fn parameters(&self) -> Vec<Var> {
        vec![self.gamma.clone(), self.beta.clone()]
    }
}
