//! 翻棋规则引擎
//!
//! 包含:
//! - 兵种、阵营、位置等核心数据结构
//! - 唯一的克制关系表和子力分值表
//! - 棋盘状态、合法性判断和落子/吃子/翻子操作
//! - 终局判定和可哈希的局面快照

mod board;
mod constants;
mod error;
mod piece;

pub use board::{Board, GameResult, Snapshot};
pub use constants::*;
pub use error::{FlipError, Result};
pub use piece::{Piece, Position, Rank, Side, DIRECTIONS};
