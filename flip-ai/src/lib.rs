//! 翻棋 AI 代理
//!
//! 包含:
//! - 具体动作的生成与应用
//! - 固定深度 Minimax 搜索代理
//! - 表格型 Q-Learning 代理
//! - Q 值表持久化
//!
//! 两个代理都读取未翻开棋子的真实身份（全知简化），
//! 不建模部分可观测性，这是刻意保留的设计取舍。

mod action;
mod qlearning;
mod search;
mod store;

pub use action::{valid_moves, Action};
pub use qlearning::{
    CoarseAction, Experience, QConfig, QLearningAgent, QTable, StepOutcome, ACTION_VOCAB,
};
pub use search::{MinMaxAgent, SearchConfig};
pub use store::{load_q_table, save_q_table, StoreError};
