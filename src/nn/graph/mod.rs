/*
 * @Author       : 老董
 * @Date         : 2026-03-04
 * @Description  : Graph 模块：计算图的核心实现
 *
 * 公开 API：
 * - `Graph`: 用户级句柄（PyTorch 风格）
 * - `GraphInner`: 底层实现
 * - `GraphError`: 错误类型
 *
 * 本图为“边定义边运行”（define-by-run）：节点创建时即由父节点的值算出自身的值，
 * 解码器的自回归展开、dropout掩码和高斯噪声都依赖这一点。
 */

mod error;
mod handle;
mod inner;

pub use error::GraphError;
pub use handle::Graph;
pub use inner::GraphInner;
