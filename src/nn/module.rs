/*
 * @Author       : 老董
 * @Date         : 2026-03-05
 * @Description  : Module：凡是持有可训练参数的组件（层、MLP、编码器、解码器、整个模型）都实现它
 */

use super::Var;

/// 持有可训练参数的组件
///
/// `forward`与`new`的签名因组件而异，不放进trait；Var自带图引用，前向时也无需传入`Graph`。
/// 组合组件时把子组件的参数按固定顺序拼接即可：
///
/// ```ignore
/// impl Module for RoundTransform {
///     fn parameters(&self) -> Vec<Var> {
///         [self.edge_mlp.parameters(), self.node_mlp.parameters()].concat()
///     }
/// }
/// ```
pub trait Module {
    /// 全部可训练参数，同一组件多次调用的顺序不变
    fn parameters(&self) -> Vec<Var>;

    /// 参数张量的个数（不是标量个数）
    fn num_params(&self) -> usize {
        self.parameters().len()
    }
}
