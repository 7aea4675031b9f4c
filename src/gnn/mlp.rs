/*
 * @Author       : 老董
 * @Date         : 2026-03-10
 * @Description  : 两层前馈块：fc1 -> ELU -> dropout -> fc2 -> ELU -> BatchNorm
 */

use crate::nn::{
    BatchNorm, Graph, GraphError, Linear, Module, Var, VarActivationOps, VarShapeOps,
};

/// 两层MLP
///
/// 输入可以是任意阶张量[..., n_in]，批归一化在把前导维度展平成[-1, n_out]后进行
pub struct Mlp {
    fc1: Linear,
    fc2: Linear,
    bn: BatchNorm,
    dropout: f32,
}

impl Mlp {
    pub fn new(
        graph: &Graph,
        n_in: usize,
        n_hidden: usize,
        n_out: usize,
        dropout: f32,
        name: &str,
    ) -> Result<Self, GraphError> {
        if !(0.0..=1.0).contains(&dropout) {
            return Err(GraphError::InvalidOperation(format!(
                "{name}的dropout概率须在[0, 1]内，实际为{dropout}"
            )));
        }
        Ok(Self {
            fc1: Linear::new(graph, n_in, n_hidden, true, &format!("{name}_fc1"))?,
            fc2: Linear::new(graph, n_hidden, n_out, true, &format!("{name}_fc2"))?,
            bn: BatchNorm::new(graph, n_out, &format!("{name}_bn"))?,
            dropout,
        })
    }

    pub fn forward(&self, x: &Var) -> Result<Var, GraphError> {
        let h = self.fc1.forward(x)?.elu()?.dropout(self.dropout)?;
        let h = self.fc2.forward(&h)?.elu()?;
        self.batch_norm(&h)
    }

    fn batch_norm(&self, x: &Var) -> Result<Var, GraphError> {
        let shape = x.shape()?;
        let n_out = self.fc2.out_features();
        let rows = shape.iter().product::<usize>() / n_out;
        let normalized = self.bn.forward(&x.reshape(&[rows, n_out])?)?;
        normalized.reshape(&shape)
    }

    pub const fn in_features(&self) -> usize {
        self.fc1.in_features()
    }

    pub const fn out_features(&self) -> usize {
        self.fc2.out_features()
    }
}

impl Module for Mlp {
    fn parameters(&self) -> Vec<Var> {
        [
            self.fc1.parameters(),
            self.fc2.parameters(),
            self.bn.parameters(),
        ]
        .concat()
    }
}
