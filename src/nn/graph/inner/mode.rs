/*
 * @Author       : 老董
 * @Date         : 2026-03-05
 * @Description  : GraphInner train/eval 模式、梯度清零与中间结果释放
 */

use super::GraphInner;

impl GraphInner {
    pub const fn set_train_mode(&mut self) {
        self.is_eval_mode = false;
    }

    pub const fn set_eval_mode(&mut self) {
        self.is_eval_mode = true;
    }

    pub const fn is_train_mode(&self) -> bool {
        !self.is_eval_mode
    }

    /// 清空所有节点的梯度
    pub fn zero_grad(&mut self) {
        for node in self.nodes.values_mut() {
            node.clear_grad();
        }
    }

    /// 只清空非参数节点的梯度，参数的梯度继续累加
    pub(in crate::nn::graph) fn reset_intermediate_grad(&mut self) {
        for node in self.nodes.values_mut().filter(|n| !n.is_trainable()) {
            node.clear_grad();
        }
    }

    /// 释放所有非常驻节点（输入、算子），只保留参数与常量
    ///
    /// 每个训练步结束后调用，避免图随迭代无限增长。释放后旧的中间`Var`失效
    pub fn release_intermediate_results(&mut self) {
        let node_names = &mut self.node_names;
        self.nodes.retain(|_, node| {
            if !node.is_persistent() {
                node_names.remove(node.name());
            }
            node.is_persistent()
        });
    }
}
