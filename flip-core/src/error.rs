//! 错误类型定义

use thiserror::Error;

use crate::piece::Position;

/// 规则错误
///
/// 引擎本身对外部调用者静默拒绝非法请求；这里的错误只出现在
/// 代理路径上：代理应用自己生成的动作被引擎拒绝，说明生成与
/// 应用逻辑不一致，属于内部不变量被破坏，必须响亮地失败。
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FlipError {
    /// 非法走子
    #[error("Illegal move: from {from} to {to}")]
    IllegalMove { from: Position, to: Position },

    /// 非法吃子
    #[error("Illegal capture: from {from} to {to}")]
    IllegalCapture { from: Position, to: Position },

    /// 非法翻子
    #[error("Illegal reveal at {pos}")]
    IllegalReveal { pos: Position },
}

/// 规则操作结果类型
pub type Result<T> = std::result::Result<T, FlipError>;
