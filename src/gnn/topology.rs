/*
 * @Author       : 老董
 * @Date         : 2026-03-10
 * @Description  : 骨架图：用两个(E, J)的独热关联矩阵描述关节间的有向边
 */

use crate::errors::ModelError;
use crate::tensor::Tensor;

/// 骨架图
///
/// - `receiver_encode[e]`在边`e`的终点关节处为1
/// - `sender_encode[e]`在边`e`的起点关节处为1
///
/// 构造后不可变，关节数与边数在模型整个生命周期内固定。
#[derive(Debug, Clone, PartialEq)]
pub struct SkeletonGraph {
    receiver_encode: Tensor,
    sender_encode: Tensor,
    receivers: Vec<usize>,
    senders: Vec<usize>,
}

impl SkeletonGraph {
    /// 全连接图：所有不同关节的有序对，共`J*(J-1)`条边。
    /// 边按起点优先排列：`for s in 0..J { for r in 0..J, r != s }`
    pub fn fully_connected(num_joints: usize) -> Result<Self, ModelError> {
        if num_joints < 2 {
            return Err(ModelError::InvalidArgument(format!(
                "全连接骨架图至少需要2个关节，实际为{num_joints}"
            )));
        }
        let (senders, receivers): (Vec<usize>, Vec<usize>) = (0..num_joints)
            .flat_map(|s| (0..num_joints).filter(move |&r| r != s).map(move |r| (s, r)))
            .unzip();
        Ok(Self {
            receiver_encode: one_hot_rows(&receivers, num_joints)?,
            sender_encode: one_hot_rows(&senders, num_joints)?,
            receivers,
            senders,
        })
    }

    /// 由外部给定的关联矩阵构建，二者须形状相同且每行恰有一个1
    pub fn from_incidence(receiver: Tensor, sender: Tensor) -> Result<Self, ModelError> {
        if receiver.dimension() != 2 || receiver.shape() != sender.shape() {
            return Err(ModelError::InvalidArgument(format!(
                "关联矩阵须为形状相同的(E, J)矩阵，实际为{:?}与{:?}",
                receiver.shape(),
                sender.shape()
            )));
        }
        if receiver.shape()[0] == 0 {
            return Err(ModelError::InvalidArgument("骨架图至少需要1条边".to_string()));
        }
        let receivers = row_hot_indices(&receiver, "receiver_encode")?;
        let senders = row_hot_indices(&sender, "sender_encode")?;
        Ok(Self {
            receiver_encode: receiver,
            sender_encode: sender,
            receivers,
            senders,
        })
    }

    pub fn num_joints(&self) -> usize {
        self.receiver_encode.shape()[1]
    }

    pub fn num_edges(&self) -> usize {
        self.receiver_encode.shape()[0]
    }

    pub const fn receiver_encode(&self) -> &Tensor {
        &self.receiver_encode
    }

    pub const fn sender_encode(&self) -> &Tensor {
        &self.sender_encode
    }

    /// 每条边的终点关节
    pub fn receivers(&self) -> &[usize] {
        &self.receivers
    }

    /// 每条边的起点关节
    pub fn senders(&self) -> &[usize] {
        &self.senders
    }

    /// 每个关节的入边数
    pub fn in_degrees(&self) -> Vec<usize> {
        let mut degrees = vec![0; self.num_joints()];
        for &r in &self.receivers {
            degrees[r] += 1;
        }
        degrees
    }
}

fn one_hot_rows(columns: &[usize], width: usize) -> Result<Tensor, ModelError> {
    let mut data = vec![0.0; columns.len() * width];
    for (row, &col) in columns.iter().enumerate() {
        data[row * width + col] = 1.0;
    }
    Ok(Tensor::new(&data, &[columns.len(), width])?)
}

fn row_hot_indices(matrix: &Tensor, name: &str) -> Result<Vec<usize>, ModelError> {
    let view = matrix.view();
    view.outer_iter()
        .enumerate()
        .map(|(row, values)| {
            let mut hot = None;
            for (col, &v) in values.iter().enumerate() {
                if v == 0.0 {
                    continue;
                }
                if v != 1.0 || hot.is_some() {
                    return Err(ModelError::InvalidArgument(format!(
                        "{name}第{row}行不是独热向量"
                    )));
                }
                hot = Some(col);
            }
            hot.ok_or_else(|| ModelError::InvalidArgument(format!("{name}第{row}行全为0")))
        })
        .collect()
}
