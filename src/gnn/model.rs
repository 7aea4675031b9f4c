/*
 * @Author       : 老董
 * @Date         : 2026-03-13
 * @Description  : GnnModel：把编码器与解码器组装成端到端的运动预测模型
 */

use std::rc::Rc;

use tracing::info;

use super::config::{LossKind, ModelConfig, ModelVariant};
use super::decoder::{
    DecoderWrapper, DistributionDecoding, PointDecoding, StochasticDecoderWrapper,
};
use super::encoder::{GnnEncoder, GnnEncoderConfig};
use super::message::Incidence;
use super::mlp::Mlp;
use super::rgnn::Rgnn;
use super::topology::SkeletonGraph;
use crate::errors::ModelError;
use crate::nn::{Graph, GraphError, Module, Var, VarLossOps, VarShapeOps};

/// 模型的预测结果
pub enum Forecast {
    Point(PointDecoding),
    Distribution(DistributionDecoding),
}

impl Forecast {
    /// 点估计的输出，或分布的均值。[T, B, J, output_size]
    pub const fn prediction(&self) -> &Var {
        match self {
            Self::Point(p) => &p.outputs,
            Self::Distribution(d) => &d.means,
        }
    }

    pub const fn state(&self) -> &Var {
        match self {
            Self::Point(p) => &p.state,
            Self::Distribution(d) => &d.state,
        }
    }

    /// 仅ProjectedGnn变体会带出学到的边权重
    pub const fn edge_weight(&self) -> Option<&Var> {
        match self {
            Self::Point(p) => p.edge_weight.as_ref(),
            Self::Distribution(d) => d.edge_weight.as_ref(),
        }
    }
}

enum ModelEncoder {
    Graph {
        projection: Option<Mlp>,
        gnn: GnnEncoder,
        thread_edge_weight: bool,
    },
    Recurrent(Rc<Rgnn>),
}

enum ModelDecoder {
    Point(DecoderWrapper<Rgnn>),
    Stochastic(StochasticDecoderWrapper<Rgnn>),
}

pub struct GnnModel {
    config: ModelConfig,
    encoder: ModelEncoder,
    decoder: ModelDecoder,
    /// 编码器与解码器共用循环参数
    tied: bool,
}

impl GnnModel {
    pub fn new(
        graph: &Graph,
        skeleton: &SkeletonGraph,
        config: ModelConfig,
    ) -> Result<Self, ModelError> {
        config.validate()?;
        if skeleton.num_joints() != config.num_joints {
            return Err(ModelError::InvalidConfig(format!(
                "骨架图有{}个关节，而配置为{}",
                skeleton.num_joints(),
                config.num_joints
            )));
        }
        let incidence = Incidence::new(graph, skeleton, "skeleton")?;
        let encoder_config = |input_dim: usize, num_passing: usize, weight_share: bool| {
            GnnEncoderConfig {
                input_dim,
                node_hidden_dim: config.node_hidden_dim,
                node_out_dim: config.node_out_dim,
                edge_hidden_dim: config.edge_hidden_dim,
                edge_out_dim: config.edge_out_dim,
                num_passing,
                weight_share,
                dropout: config.dropout,
            }
        };
        let hidden = config.node_out_dim;

        let (encoder, decoder_cell, tied) = match config.variant {
            ModelVariant::Gnn => {
                let gnn = GnnEncoder::new(
                    graph,
                    &incidence,
                    &encoder_config(
                        config.encoder_input_size(),
                        config.num_passing,
                        config.weight_share,
                    ),
                    "encoder",
                )?;
                let cell = Rgnn::new(
                    graph,
                    &incidence,
                    config.decoder_input_size(),
                    hidden,
                    None,
                    "decoder_rgnn",
                )?;
                let encoder = ModelEncoder::Graph {
                    projection: None,
                    gnn,
                    thread_edge_weight: false,
                };
                (encoder, Rc::new(cell), false)
            }
            ModelVariant::ProjectedGnn => {
                let projection = Mlp::new(
                    graph,
                    config.encoder_input_size(),
                    config.node_hidden_dim,
                    hidden,
                    config.dropout,
                    "encoder_projection",
                )?;
                let gnn = GnnEncoder::new(
                    graph,
                    &incidence,
                    &encoder_config(hidden, config.num_passing + 1, config.weight_share),
                    "encoder",
                )?;
                let cell = Rgnn::new(
                    graph,
                    &incidence,
                    config.decoder_input_size(),
                    hidden,
                    Some(&encoder_config(hidden, config.num_passing, false)),
                    "decoder_rgnn",
                )?;
                let encoder = ModelEncoder::Graph {
                    projection: Some(projection),
                    gnn,
                    thread_edge_weight: true,
                };
                (encoder, Rc::new(cell), false)
            }
            ModelVariant::Rgnn { tied } => {
                let rgnn = Rc::new(Rgnn::new(
                    graph,
                    &incidence,
                    config.encoder_input_size(),
                    hidden,
                    None,
                    "encoder_rgnn",
                )?);
                let cell = if tied {
                    Rc::clone(&rgnn)
                } else {
                    Rc::new(Rgnn::new(
                        graph,
                        &incidence,
                        config.decoder_input_size(),
                        hidden,
                        None,
                        "decoder_rgnn",
                    )?)
                };
                (ModelEncoder::Recurrent(rgnn), cell, tied)
            }
        };

        let decoder = if config.stochastic {
            ModelDecoder::Stochastic(StochasticDecoderWrapper::new(
                graph,
                decoder_cell,
                config.output_size,
                config.target_seq_len,
                config.residual_velocities,
                "decoder",
            )?)
        } else {
            ModelDecoder::Point(DecoderWrapper::new(
                graph,
                decoder_cell,
                config.output_size,
                config.target_seq_len,
                config.residual_velocities,
                "decoder",
            )?)
        };

        let model = Self {
            config,
            encoder,
            decoder,
            tied,
        };
        info!(
            variant = ?model.config.variant,
            stochastic = model.config.stochastic,
            encoder_input_size = model.config.encoder_input_size(),
            decoder_input_size = model.config.decoder_input_size(),
            num_params = model.num_params(),
            "GnnModel构建完成"
        );
        Ok(model)
    }

    /// 前向传播
    ///
    /// - `encoder_input`: Gnn类变体为[B, J, encoder_input_size]；Rgnn变体为[T_src, B, J, encoder_input_size]
    /// - `decoder_input`: [T, B, J, decoder_input_size]或[B, J, decoder_input_size]，只用第0帧作为解码起点
    pub fn forward(&self, encoder_input: &Var, decoder_input: &Var) -> Result<Forecast, ModelError> {
        let seed = self.decoder_seed(decoder_input)?;
        let (state, edge_weight) = match &self.encoder {
            ModelEncoder::Graph {
                projection,
                gnn,
                thread_edge_weight,
            } => {
                let node = match projection {
                    Some(mlp) => mlp.forward(encoder_input)?,
                    None => encoder_input.clone(),
                };
                let (node, weight) = gnn.forward(&node, None)?;
                (node, thread_edge_weight.then_some(weight))
            }
            ModelEncoder::Recurrent(rgnn) => (rgnn.forward(encoder_input, None, None)?.hidden, None),
        };

        let forecast = match &self.decoder {
            ModelDecoder::Point(decoder) => {
                Forecast::Point(decoder.forward(&seed, &state, edge_weight.as_ref())?)
            }
            ModelDecoder::Stochastic(decoder) => {
                Forecast::Distribution(decoder.forward(&seed, &state, edge_weight.as_ref())?)
            }
        };
        Ok(forecast)
    }

    fn decoder_seed(&self, decoder_input: &Var) -> Result<Var, ModelError> {
        let shape = decoder_input.shape()?;
        let seed = match shape.len() {
            4 => decoder_input.select(0, 0)?,
            3 => decoder_input.clone(),
            _ => {
                return Err(GraphError::DimensionMismatch {
                    expected: 4,
                    got: shape.len(),
                    message: "解码器输入须为[T, B, J, D]或[B, J, D]".to_string(),
                }
                .into());
            }
        };
        let seed_dim = seed.shape()?.last().copied().unwrap_or(0);
        if seed_dim != self.config.decoder_input_size() {
            return Err(ModelError::InvalidArgument(format!(
                "解码器输入的最后一维须为{}，实际为{seed_dim}",
                self.config.decoder_input_size()
            )));
        }
        Ok(seed)
    }

    /// 在通道子集`index_subset`上计算损失
    ///
    /// - `target`: [T, B, J * output_size]
    /// - 预测按[T, B, J * output_size]展平后与`target`对齐
    pub fn loss(
        &self,
        forecast: &Forecast,
        target: &Var,
        index_subset: &[usize],
    ) -> Result<Var, ModelError> {
        if index_subset.is_empty() {
            return Err(ModelError::InvalidArgument("损失的通道子集为空".to_string()));
        }
        let human_size = self.config.human_size();
        if let Some(&bad) = index_subset.iter().find(|&&i| i >= human_size) {
            return Err(ModelError::InvalidArgument(format!(
                "通道下标{bad}超出范围[0, {human_size})"
            )));
        }
        let pick = |x: &Var| -> Result<Var, GraphError> {
            let shape = x.shape()?;
            x.reshape(&[shape[0], shape[1], human_size])?
                .index_select(2, index_subset)
        };
        let target = target.index_select(2, index_subset)?;

        let loss = match (self.config.loss, forecast) {
            (LossKind::Mse, _) => pick(forecast.prediction())?.mse_loss(&target)?,
            (LossKind::AbsSum, _) => pick(forecast.prediction())?.abs_sum_loss(&target)?,
            (LossKind::GaussianNll, Forecast::Distribution(d)) => {
                pick(&d.means)?.gaussian_nll(&pick(&d.stds)?, &target)?
            }
            (LossKind::GaussianNll, Forecast::Point(_)) => {
                return Err(ModelError::InvalidArgument(
                    "GaussianNll损失需要分布预测".to_string(),
                ));
            }
        };
        Ok(loss)
    }

    pub const fn config(&self) -> &ModelConfig {
        &self.config
    }

    pub const fn is_tied(&self) -> bool {
        self.tied
    }
}

impl Module for GnnModel {
    fn parameters(&self) -> Vec<Var> {
        let mut params = match &self.encoder {
            ModelEncoder::Graph {
                projection, gnn, ..
            } => {
                let mut params = projection.as_ref().map(Module::parameters).unwrap_or_default();
                params.extend(gnn.parameters());
                params
            }
            ModelEncoder::Recurrent(rgnn) => rgnn.parameters(),
        };
        let (cell_params, head_params) = match &self.decoder {
            ModelDecoder::Point(d) => (d.cell().parameters(), d.head_parameters()),
            ModelDecoder::Stochastic(d) => (d.cell().parameters(), d.head_parameters()),
        };
        if !self.tied {
            params.extend(cell_params);
        }
        params.extend(head_params);
        params
    }
}
