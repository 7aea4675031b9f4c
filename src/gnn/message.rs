/*
 * @Author       : 老董
 * @Date         : 2026-03-10
 * @Description  : 节点↔边的特征变换（消息传递的两半）
 *
 *   node_to_edge: edge[e] = concat(S @ x, R @ x)[e]
 *   edge_to_node: node = (Rᵀ @ (edge ⊙ w)) / (Rᵀ @ w)
 */

use super::topology::SkeletonGraph;
use crate::nn::{Graph, GraphError, Var, VarMatrixOps, VarShapeOps};

/// 骨架图在计算图中的常量形式。关联矩阵以常量节点保存，不随中间结果释放
#[derive(Debug, Clone)]
pub struct Incidence {
    receiver: Var,
    sender: Var,
    receiver_t: Var,
    num_joints: usize,
    num_edges: usize,
}

impl Incidence {
    pub fn new(graph: &Graph, skeleton: &SkeletonGraph, name: &str) -> Result<Self, GraphError> {
        let receiver_t = skeleton.receiver_encode().transpose()?;
        Ok(Self {
            receiver: graph.constant_named(skeleton.receiver_encode(), &format!("{name}_R"))?,
            sender: graph.constant_named(skeleton.sender_encode(), &format!("{name}_S"))?,
            receiver_t: graph.constant_named(&receiver_t, &format!("{name}_R_t"))?,
            num_joints: skeleton.num_joints(),
            num_edges: skeleton.num_edges(),
        })
    }

    pub const fn num_joints(&self) -> usize {
        self.num_joints
    }

    pub const fn num_edges(&self) -> usize {
        self.num_edges
    }
}

/// [B, J, D] -> [B, E, 2D]，每条边的特征为（起点特征, 终点特征）
pub fn node_to_edge(x: &Var, incidence: &Incidence) -> Result<Var, GraphError> {
    check_rank3(x, 1, incidence.num_joints, "node_to_edge的节点特征")?;
    let sends = incidence_matmul(&incidence.sender, x)?;
    let recs = incidence_matmul(&incidence.receiver, x)?;
    Var::concat(&[&sends, &recs], 2)
}

/// [B, E, D] -> [B, J, D]，按入边权重对入边特征加权平均
///
/// 每个关节的入边权重之和必须严格为正，否则返回`ComputationError`
pub fn edge_to_node(edge: &Var, incidence: &Incidence, weight: &Var) -> Result<Var, GraphError> {
    let edge_shape = check_rank3(edge, 1, incidence.num_edges, "edge_to_node的边特征")?;
    let weight_shape = weight.shape()?;
    let expected = [edge_shape[0], incidence.num_edges, 1];
    if weight_shape != expected {
        return Err(GraphError::ShapeMismatch {
            expected: expected.to_vec(),
            got: weight_shape,
            message: "边权重须为[B, E, 1]".to_string(),
        });
    }

    let weighted = edge.try_mul(weight)?;
    let incoming = incidence_matmul(&incidence.receiver_t, &weighted)?;
    let weight_norm = incidence_matmul(&incidence.receiver_t, weight)?;

    let norm_value = weight_norm.value()?;
    let degenerate = norm_value
        .view()
        .indexed_iter()
        .find(|(_, v)| !(**v > 0.0))
        .map(|(index, v)| (index[0], index[1], *v));
    if let Some((batch, joint, total)) = degenerate {
        return Err(GraphError::ComputationError(format!(
            "关节{joint}（batch {batch}）的入边权重之和为{total}，必须为正"
        )));
    }

    incoming.try_div(&weight_norm)
}

/// [M, N] 与 [B, N, D] 相乘得到 [B, M, D]
fn incidence_matmul(matrix: &Var, x: &Var) -> Result<Var, GraphError> {
    let shape = x.shape()?;
    let (batch, n, dim) = (shape[0], shape[1], shape[2]);
    let m = matrix.shape()?[0];
    let columns = x.permute(&[1, 0, 2])?.reshape(&[n, batch * dim])?;
    matrix
        .matmul(&columns)?
        .reshape(&[m, batch, dim])?
        .permute(&[1, 0, 2])
}

fn check_rank3(
    x: &Var,
    axis: usize,
    expected_len: usize,
    what: &str,
) -> Result<Vec<usize>, GraphError> {
    let shape = x.shape()?;
    if shape.len() != 3 || shape[axis] != expected_len {
        let mut expected = shape.clone();
        expected.resize(3, 0);
        expected[axis] = expected_len;
        return Err(GraphError::ShapeMismatch {
            expected,
            got: shape,
            message: format!("{what}须为三阶张量，且第{axis}维为{expected_len}"),
        });
    }
    Ok(shape)
}
