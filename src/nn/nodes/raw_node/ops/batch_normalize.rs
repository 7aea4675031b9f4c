use super::parent;
use crate::nn::GraphError;
use crate::nn::nodes::raw_node::TraitNode;
use crate::tensor::Tensor;

/// 归一化所用的统计量
#[derive(Clone, Debug)]
pub(in crate::nn) enum BatchStatistics {
    /// 训练模式：用当前batch按特征维求得的均值与（有偏）方差
    Batch,
    /// 评估模式：用层内累计的滑动均值与方差，形状均为[1, C]
    Running { mean: Tensor, var: Tensor },
}

/// 一维批归一化节点
///
/// 父节点依次为 x:[N, C]、gamma:[1, C]、beta:[1, C]；
/// y = gamma * x̂ + beta，x̂ = (x - mean) / sqrt(var + eps)
#[derive(Clone)]
pub(in crate::nn) struct BatchNormalize {
    statistics: BatchStatistics,
    eps: f32,
    /// 前向时缓存，供反向使用
    x_hat: Option<Tensor>,
    inv_std: Option<Tensor>,
}

impl BatchNormalize {
    pub(in crate::nn) fn new(
        input_shape: &[usize],
        param_shape: &[usize],
        statistics: BatchStatistics,
        eps: f32,
    ) -> Result<Self, GraphError> {
        if input_shape.len() != 2 {
            return Err(GraphError::DimensionMismatch {
                expected: 2,
                got: input_shape.len(),
                message: "BatchNormalize的输入必须是[N, C]矩阵".to_string(),
            });
        }
        let expected = [1, input_shape[1]];
        if param_shape != expected {
            return Err(GraphError::ShapeMismatch {
                expected: expected.to_vec(),
                got: param_shape.to_vec(),
                message: "BatchNormalize的gamma/beta形状必须为[1, C]".to_string(),
            });
        }
        if let BatchStatistics::Running { mean, var } = &statistics {
            if mean.shape() != expected || var.shape() != expected {
                return Err(GraphError::ShapeMismatch {
                    expected: expected.to_vec(),
                    got: mean.shape().to_vec(),
                    message: "BatchNormalize的滑动统计量形状必须为[1, C]".to_string(),
                });
            }
        }
        Ok(Self {
            statistics,
            eps,
            x_hat: None,
            inv_std: None,
        })
    }

    fn cached(&self) -> Result<(&Tensor, &Tensor), GraphError> {
        self.x_hat.as_ref().zip(self.inv_std.as_ref()).ok_or_else(|| {
            GraphError::ComputationError(
                "BatchNormalize尚未前向计算。不该触及本错误，否则说明crate代码有问题".to_string(),
            )
        })
    }
}

impl TraitNode for BatchNormalize {
    fn type_name(&self) -> &'static str {
        "BatchNormalize"
    }

    fn calc_value_by_parents(&mut self, parents: &[&Tensor]) -> Result<Tensor, GraphError> {
        let x = parent(parents, 0)?;
        let gamma = parent(parents, 1)?;
        let beta = parent(parents, 2)?;

        let (mean, var) = match &self.statistics {
            BatchStatistics::Batch => {
                let n = x.shape()[0].max(1) as f32;
                let mean = &x.sum_axis_keepdims(0)? / n;
                let centered = x - &mean;
                let var = &(&centered * &centered).sum_axis_keepdims(0)? / n;
                (mean, var)
            }
            BatchStatistics::Running { mean, var } => (mean.clone(), var.clone()),
        };
        let inv_std = (&var + self.eps).map(|v| 1.0 / v.sqrt());
        let x_hat = &(x - &mean) * &inv_std;
        let y = &(&x_hat * gamma) + beta;

        self.x_hat = Some(x_hat);
        self.inv_std = Some(inv_std);
        Ok(y)
    }

    fn calc_grad_to_parent(
        &self,
        index: usize,
        parents: &[&Tensor],
        _value: &Tensor,
        upstream_grad: &Tensor,
    ) -> Result<Tensor, GraphError> {
        let (x_hat, inv_std) = self.cached()?;
        match index {
            0 => {
                let gamma = parent(parents, 1)?;
                let d_x_hat = upstream_grad * gamma;
                match self.statistics {
                    BatchStatistics::Batch => {
                        // dx = inv_std / N * (N * dx̂ - Σdx̂ - x̂ * Σ(dx̂ * x̂))
                        let n = x_hat.shape()[0] as f32;
                        let sum_d = d_x_hat.sum_axis_keepdims(0)?;
                        let sum_d_x_hat = (&d_x_hat * x_hat).sum_axis_keepdims(0)?;
                        let inner = &(&(&d_x_hat * n) - &sum_d) - &(x_hat * &sum_d_x_hat);
                        Ok(&(&inner * inv_std) / n)
                    }
                    // 统计量为常量时，归一化只是逐特征的仿射变换
                    BatchStatistics::Running { .. } => Ok(&d_x_hat * inv_std),
                }
            }
            1 => Ok((upstream_grad * x_hat).sum_axis_keepdims(0)?),
            _ => Ok(upstream_grad.sum_axis_keepdims(0)?),
        }
    }
}
