/*
 * @Author       : 老董
 * @Date         : 2026-03-11
 * @Description  : Rgnn（循环图神经网络）：每个关节各有一个独立参数的GRU，所有关节在每个时间步同步推进
 *
 * 可选地，在每个时间步的GRU更新之后再做一次图传播（内部的GnnEncoder，H -> H），
 * 并把学到的边权重带到下一个时间步。
 */

use tracing::debug;

use super::decoder::{CellStep, RecurrentCell};
use super::encoder::{GnnEncoder, GnnEncoderConfig};
use super::message::Incidence;
use crate::nn::{Graph, GraphError, GruCell, Module, Var, VarShapeOps};

/// `Rgnn::forward`的结果
pub struct RgnnOutput {
    /// 每个时间步的隐藏状态 [T, B, J, H]
    pub outputs: Var,
    /// 最后一个时间步的隐藏状态 [B, J, H]
    pub hidden: Var,
    /// 带图传播时为最后学到的边权重
    pub edge_weight: Option<Var>,
}

pub struct Rgnn {
    cells: Vec<GruCell>,
    propagation: Option<GnnEncoder>,
    input_size: usize,
    hidden_size: usize,
    name: String,
}

impl Rgnn {
    /// - `propagation`: 传入时在每步GRU之后做图传播，其`input_dim`与`node_out_dim`须等于`hidden_size`
    pub fn new(
        graph: &Graph,
        incidence: &Incidence,
        input_size: usize,
        hidden_size: usize,
        propagation: Option<&GnnEncoderConfig>,
        name: &str,
    ) -> Result<Self, GraphError> {
        let cells = (0..incidence.num_joints())
            .map(|j| GruCell::new(graph, input_size, hidden_size, &format!("{name}_joint{j}")))
            .collect::<Result<Vec<_>, _>>()?;

        let propagation = match propagation {
            Some(config) => {
                if config.input_dim != hidden_size || config.node_out_dim != hidden_size {
                    return Err(GraphError::InvalidOperation(format!(
                        "{name}的图传播须保持隐藏维度{hidden_size}不变，实际为{}->{}",
                        config.input_dim, config.node_out_dim
                    )));
                }
                Some(GnnEncoder::new(
                    graph,
                    incidence,
                    config,
                    &format!("{name}_propagate"),
                )?)
            }
            None => None,
        };

        Ok(Self {
            cells,
            propagation,
            input_size,
            hidden_size,
            name: name.to_string(),
        })
    }

    /// 按时间步顺序推进
    ///
    /// - `input`: [T, B, J, D]，也可以是[B, J, D]（视为T=1）
    /// - `hidden`: [B, J, H]，缺省时为全0
    pub fn forward(
        &self,
        input: &Var,
        hidden: Option<&Var>,
        edge_weight: Option<&Var>,
    ) -> Result<RgnnOutput, GraphError> {
        let shape = input.shape()?;
        let input = match shape.len() {
            3 => input.reshape(&[1, shape[0], shape[1], shape[2]])?,
            4 => input.clone(),
            _ => {
                return Err(GraphError::DimensionMismatch {
                    expected: 4,
                    got: shape.len(),
                    message: format!("{}的输入须为[T, B, J, D]或[B, J, D]", self.name),
                });
            }
        };
        let [steps, batch] = {
            let shape = input.shape()?;
            [shape[0], shape[1]]
        };

        let mut hidden = match hidden {
            Some(h) => h.clone(),
            None => input
                .get_graph()
                .zeros(&[batch, self.num_joints(), self.hidden_size])?,
        };
        let mut edge_weight = edge_weight.cloned();
        let mut outputs = Vec::with_capacity(steps);
        for t in 0..steps {
            let step = self.step(&input.select(0, t)?, &hidden, edge_weight.as_ref())?;
            hidden = step.state;
            edge_weight = step.edge_weight;
            outputs.push(step.output);
        }
        debug!(rgnn = %self.name, steps, "循环图单元展开完成");

        let refs: Vec<&Var> = outputs.iter().collect();
        Ok(RgnnOutput {
            outputs: Var::stack(&refs)?,
            hidden,
            edge_weight,
        })
    }

    pub fn num_joints(&self) -> usize {
        self.cells.len()
    }

    pub const fn input_size(&self) -> usize {
        self.input_size
    }

    pub fn cells(&self) -> &[GruCell] {
        &self.cells
    }

    pub const fn propagation(&self) -> Option<&GnnEncoder> {
        self.propagation.as_ref()
    }

    fn check_step_shapes(&self, input: &Var, state: &Var) -> Result<(), GraphError> {
        let input_shape = input.shape()?;
        let batch = input_shape.first().copied().unwrap_or(0);
        let expected = [batch, self.num_joints(), self.input_size];
        if input_shape != expected {
            return Err(GraphError::ShapeMismatch {
                expected: expected.to_vec(),
                got: input_shape,
                message: format!("{}每步的输入须为[B, J, input_size]", self.name),
            });
        }
        let state_shape = state.shape()?;
        let expected = [batch, self.num_joints(), self.hidden_size];
        if state_shape != expected {
            return Err(GraphError::ShapeMismatch {
                expected: expected.to_vec(),
                got: state_shape,
                message: format!("{}的隐藏状态须为[B, J, hidden_size]", self.name),
            });
        }
        Ok(())
    }
}

impl RecurrentCell for Rgnn {
    fn hidden_size(&self) -> usize {
        self.hidden_size
    }

    /// 每个关节用自己的GRU更新自己的隐藏状态，再拼回[B, J, H]
    fn step(
        &self,
        input: &Var,
        state: &Var,
        edge_weight: Option<&Var>,
    ) -> Result<CellStep, GraphError> {
        self.check_step_shapes(input, state)?;
        let per_joint = self
            .cells
            .iter()
            .enumerate()
            .map(|(j, cell)| cell.step(&input.select(1, j)?, &state.select(1, j)?))
            .collect::<Result<Vec<_>, _>>()?;
        let refs: Vec<&Var> = per_joint.iter().collect();
        // [J, B, H] -> [B, J, H]
        let hidden = Var::stack(&refs)?.permute(&[1, 0, 2])?;

        let (hidden, edge_weight) = match &self.propagation {
            Some(encoder) => {
                let (hidden, weight) = encoder.forward(&hidden, edge_weight)?;
                (hidden, Some(weight))
            }
            None => (hidden, edge_weight.cloned()),
        };
        Ok(CellStep {
            output: hidden.clone(),
            state: hidden,
            edge_weight,
        })
    }

    fn cell_parameters(&self) -> Vec<Var> {
        self.parameters()
    }
}

impl Module for Rgnn {
    fn parameters(&self) -> Vec<Var> {
        let mut params: Vec<Var> = self.cells.iter().flat_map(Module::parameters).collect();
        if let Some(encoder) = &self.propagation {
            params.extend(encoder.parameters());
        }
        params
    }
}
