//! 翻棋训练驱动
//!
//! 包含:
//! - 无界面自我对弈训练循环
//! - 训练报告
//! - 代理对战评估

pub mod arena;
pub mod train;

pub use arena::{play_match, Contestant};
pub use train::{train, TrainConfig, TrainingReport};
