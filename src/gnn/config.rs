/*
 * @Author       : 老董
 * @Date         : 2026-03-13
 * @Description  : 模型配置：可序列化为JSON，缺省字段取默认值
 */

use serde::{Deserialize, Serialize};

use crate::errors::ModelError;

/// 模型族中的拓扑变体
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ModelVariant {
    /// GnnEncoder编码整段观测窗口，Rgnn解码
    Gnn,
    /// 先经一个MLP投影，再以`num_passing + 1`轮的GnnEncoder编码；
    /// 学到的边权重传入带图传播的Rgnn解码器，并逐步更新
    ProjectedGnn,
    /// Rgnn逐帧编码观测序列；`tied`时解码器与编码器共用同一组循环参数
    Rgnn { tied: bool },
}

/// 损失函数，只在调用方指定的通道子集上计算
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum LossKind {
    /// 均方误差（逐元素平均）
    Mse,
    /// 绝对误差之和
    AbsSum,
    /// 高斯负对数似然，需要随机解码器
    GaussianNll,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub num_joints: usize,
    pub source_seq_len: usize,
    pub target_seq_len: usize,
    pub edge_hidden_dim: usize,
    pub edge_out_dim: usize,
    pub node_hidden_dim: usize,
    pub node_out_dim: usize,
    pub num_passing: usize,
    pub number_of_actions: usize,
    /// 输入是否附带动作的独热编码
    pub one_hot: bool,
    /// 消息传递各轮是否共享权重
    pub weight_share: bool,
    pub dropout: f32,
    /// 解码器是否预测相对上一帧的偏移
    pub residual_velocities: bool,
    /// 是否使用随机（高斯）解码器
    pub stochastic: bool,
    pub variant: ModelVariant,
    pub loss: LossKind,
    /// 每个关节每帧输出的通道数（三维坐标或角度）
    pub output_size: usize,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            num_joints: 21,
            source_seq_len: 50,
            target_seq_len: 25,
            edge_hidden_dim: 256,
            edge_out_dim: 256,
            node_hidden_dim: 256,
            node_out_dim: 256,
            num_passing: 2,
            number_of_actions: 15,
            one_hot: false,
            weight_share: false,
            dropout: 0.0,
            residual_velocities: false,
            stochastic: false,
            variant: ModelVariant::Gnn,
            loss: LossKind::Mse,
            output_size: 3,
        }
    }
}

impl ModelConfig {
    /// 整个人体一帧的通道数：J * output_size
    pub const fn human_size(&self) -> usize {
        self.num_joints * self.output_size
    }

    const fn action_channels(&self) -> usize {
        if self.one_hot {
            self.number_of_actions
        } else {
            0
        }
    }

    /// 编码器每个关节的输入维度
    ///
    /// - Gnn类变体：整段窗口按关节展开，`output_size * source_seq_len`（+ 动作数）
    /// - Rgnn变体：逐帧输入，`output_size`（+ 动作数）
    pub const fn encoder_input_size(&self) -> usize {
        match self.variant {
            ModelVariant::Gnn | ModelVariant::ProjectedGnn => {
                self.output_size * self.source_seq_len + self.action_channels()
            }
            ModelVariant::Rgnn { .. } => self.output_size + self.action_channels(),
        }
    }

    /// 解码器每个关节每帧的输入维度：`output_size`（+ 动作数）
    pub const fn decoder_input_size(&self) -> usize {
        self.output_size + self.action_channels()
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        let invalid = |msg: String| Err(ModelError::InvalidConfig(msg));
        if self.num_joints < 2 {
            return invalid(format!("num_joints至少为2，实际为{}", self.num_joints));
        }
        let positive = [
            ("source_seq_len", self.source_seq_len),
            ("target_seq_len", self.target_seq_len),
            ("edge_hidden_dim", self.edge_hidden_dim),
            ("edge_out_dim", self.edge_out_dim),
            ("node_hidden_dim", self.node_hidden_dim),
            ("node_out_dim", self.node_out_dim),
            ("output_size", self.output_size),
        ];
        if let Some((field, _)) = positive.iter().find(|(_, v)| *v == 0) {
            return invalid(format!("{field}必须为正"));
        }
        if self.one_hot && self.number_of_actions == 0 {
            return invalid("one_hot时number_of_actions必须为正".to_string());
        }
        if !(0.0..=1.0).contains(&self.dropout) {
            return invalid(format!("dropout须在[0, 1]内，实际为{}", self.dropout));
        }
        if self.loss == LossKind::GaussianNll && !self.stochastic {
            return invalid("GaussianNll损失需要stochastic解码器".to_string());
        }
        // 0轮消息传递时编码器原样输出输入特征，它直接作为解码器的初始隐藏状态
        if self.variant == ModelVariant::Gnn
            && self.num_passing == 0
            && self.encoder_input_size() != self.node_out_dim
        {
            return invalid(format!(
                "Gnn变体num_passing为0时编码器输入维度({})须等于node_out_dim({})",
                self.encoder_input_size(),
                self.node_out_dim
            ));
        }
        if self.variant == ModelVariant::Gnn
            && self.weight_share
            && self.num_passing > 0
            && self.encoder_input_size() != self.node_out_dim
        {
            return invalid(format!(
                "Gnn变体共享权重时编码器输入维度({})须等于node_out_dim({})",
                self.encoder_input_size(),
                self.node_out_dim
            ));
        }
        Ok(())
    }

    /// 解析JSON并校验
    pub fn from_json(json: &str) -> Result<Self, ModelError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ModelError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ModelError> {
        serde_json::to_string_pretty(self).map_err(|e| ModelError::InvalidConfig(e.to_string()))
    }
}
