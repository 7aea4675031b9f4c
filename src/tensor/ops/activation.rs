/*
 * @Author       : 老董
 * @Date         : 2026-03-03
 * @Description  : 张量的逐元素非线性函数，供计算图节点的前向与反向计算复用
 */

use crate::tensor::Tensor;

/// 超过此值时softplus(x)≈x，避免e^x溢出
const SOFTPLUS_THRESHOLD: f32 = 20.0;

impl Tensor {
    pub fn sigmoid(&self) -> Self {
        self.map(|x| 1.0 / (1.0 + (-x).exp()))
    }

    pub fn tanh(&self) -> Self {
        self.map(f32::tanh)
    }

    /// 数值稳定的 SoftPlus 计算
    ///
    /// 使用恒等变换: softplus(x) = x + ln(1 + e^(-x)) 当 x > 0
    ///              softplus(x) = ln(1 + e^x) 当 x <= 0
    pub fn softplus(&self) -> Self {
        self.map(|x| {
            if x > SOFTPLUS_THRESHOLD {
                x
            } else if x > 0.0 {
                x + (-x).exp().ln_1p()
            } else {
                x.exp().ln_1p()
            }
        })
    }

    /// ELU（alpha=1）：x if x > 0 else e^x - 1
    pub fn elu(&self) -> Self {
        self.map(|x| if x > 0.0 { x } else { x.exp_m1() })
    }

    pub fn ln(&self) -> Self {
        self.map(f32::ln)
    }

    pub fn abs(&self) -> Self {
        self.map(f32::abs)
    }

    /// 符号函数：1 if x > 0, 0 if x == 0, -1 if x < 0
    pub fn sign(&self) -> Self {
        self.map(|x| {
            if x > 0.0 {
                1.0
            } else if x < 0.0 {
                -1.0
            } else {
                0.0
            }
        })
    }
}
