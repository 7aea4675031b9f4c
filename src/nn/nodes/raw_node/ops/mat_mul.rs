use super::parent;
use crate::nn::GraphError;
use crate::nn::nodes::raw_node::TraitNode;
use crate::tensor::Tensor;

/// 二维矩阵乘法节点：[m, k] @ [k, n] -> [m, n]
#[derive(Clone)]
pub(in crate::nn) struct MatMul;

impl MatMul {
    pub(in crate::nn) fn new(shape1: &[usize], shape2: &[usize]) -> Result<Self, GraphError> {
        if shape1.len() != 2 || shape2.len() != 2 {
            return Err(GraphError::DimensionMismatch {
                expected: 2,
                got: if shape1.len() == 2 { shape2.len() } else { shape1.len() },
                message: "MatMul节点的两个父节点都必须是二维矩阵".to_string(),
            });
        }
        if shape1[1] != shape2[0] {
            return Err(GraphError::ShapeMismatch {
                expected: vec![shape1[1], shape2[1]],
                got: shape2.to_vec(),
                message: format!(
                    "MatMul节点的左矩阵列数{}与右矩阵行数{}不相等",
                    shape1[1], shape2[0]
                ),
            });
        }
        Ok(Self)
    }
}

impl TraitNode for MatMul {
    fn type_name(&self) -> &'static str {
        "MatMul"
    }

    fn calc_value_by_parents(&mut self, parents: &[&Tensor]) -> Result<Tensor, GraphError> {
        Ok(parent(parents, 0)?.mat_mul(parent(parents, 1)?)?)
    }

    fn calc_grad_to_parent(
        &self,
        index: usize,
        parents: &[&Tensor],
        _value: &Tensor,
        upstream_grad: &Tensor,
    ) -> Result<Tensor, GraphError> {
        if index == 0 {
            // dL/dA = dL/dC @ Bᵀ
            Ok(upstream_grad.mat_mul(&parent(parents, 1)?.transpose()?)?)
        } else {
            // dL/dB = Aᵀ @ dL/dC
            Ok(parent(parents, 0)?.transpose()?.mat_mul(upstream_grad)?)
        }
    }
}
