//! 无界面自我对弈训练循环
//!
//! 两个 Q-Learning 代理交替行动，每步立即做一次单步更新。
//! 开始前尝试加载既有 Q 值表（没有就从空表起步），
//! 结束后全量保存两张表并输出 JSON 训练报告。

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::info;

use flip_ai::{load_q_table, save_q_table, QConfig, QLearningAgent};
use flip_core::{Board, GameResult, Side, MAX_STEPS};

/// 训练配置
#[derive(Debug, Clone)]
pub struct TrainConfig {
    /// 训练回合数
    pub episodes: usize,
    /// 每回合最大步数
    pub max_steps: u32,
    /// 1 号代理的 Q 值表路径
    pub table_path_one: PathBuf,
    /// 2 号代理的 Q 值表路径
    pub table_path_two: PathBuf,
    /// 训练报告输出路径（None 则不输出）
    pub report_path: Option<PathBuf>,
    /// 随机种子（None 则从系统熵播种）
    pub seed: Option<u64>,
}

impl TrainConfig {
    /// 把所有输出文件放进同一目录的默认配置
    pub fn with_dir(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        Self {
            episodes: 50_000,
            max_steps: MAX_STEPS,
            table_path_one: dir.join("agent_one_q.bin"),
            table_path_two: dir.join("agent_two_q.bin"),
            report_path: Some(dir.join("training_report.json")),
            seed: None,
        }
    }
}

/// 训练报告
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingReport {
    /// 完成的回合数
    pub episodes: usize,
    /// 1 号代理胜场
    pub wins_one: usize,
    /// 2 号代理胜场
    pub wins_two: usize,
    /// 和棋场数
    pub draws: usize,
    /// 达到步数上限仍未分出胜负的场数
    pub unfinished: usize,
    /// 1 号代理 Q 值表条目数
    pub table_entries_one: usize,
    /// 2 号代理 Q 值表条目数
    pub table_entries_two: usize,
    /// 训练完成时间
    pub finished_at: DateTime<Utc>,
}

impl TrainingReport {
    /// 转换为 JSON 字符串
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// 运行训练
pub fn train(config: &TrainConfig) -> Result<TrainingReport> {
    let q_config = QConfig::default();
    let (mut agent_one, mut agent_two) = match config.seed {
        Some(seed) => (
            QLearningAgent::with_seed(Side::One, q_config, seed),
            QLearningAgent::with_seed(Side::Two, q_config, seed.wrapping_add(1)),
        ),
        None => (
            QLearningAgent::new(Side::One),
            QLearningAgent::new(Side::Two),
        ),
    };

    agent_one.set_table(
        load_q_table(&config.table_path_one).context("加载 1 号代理 Q 值表失败")?,
    );
    agent_two.set_table(
        load_q_table(&config.table_path_two).context("加载 2 号代理 Q 值表失败")?,
    );

    let mut board_rng = config
        .seed
        .map(|seed| ChaCha8Rng::seed_from_u64(seed.wrapping_add(2)));

    let mut wins_one = 0;
    let mut wins_two = 0;
    let mut draws = 0;
    let mut unfinished = 0;

    for episode in 0..config.episodes {
        let mut board = match board_rng.as_mut() {
            Some(rng) => Board::initial_with_rng(rng),
            None => Board::initial(),
        };
        let mut state_one = agent_one.state(&board);
        let mut state_two = agent_two.state(&board);
        let mut step_count = 0u32;
        let mut result = GameResult::Unresolved;

        while step_count < config.max_steps {
            // 1 号代理行动
            let action_one = agent_one.choose_action(&state_one, &board);
            let out_one = agent_one
                .step(action_one, &mut board, step_count)
                .context("1 号代理的动作被引擎拒绝")?;
            agent_one.update(&state_one, action_one, out_one.reward, &out_one.next_state);
            if out_one.done {
                // 无步可走但终局未判定时，行动方判负
                result = board.check_winner(step_count);
                if !result.is_resolved() {
                    result = GameResult::Winner(Side::Two);
                }
                break;
            }

            // 2 号代理行动
            let action_two = agent_two.choose_action(&state_two, &board);
            let out_two = agent_two
                .step(action_two, &mut board, step_count)
                .context("2 号代理的动作被引擎拒绝")?;
            agent_two.update(&state_two, action_two, out_two.reward, &out_two.next_state);
            if out_two.done {
                result = board.check_winner(step_count);
                if !result.is_resolved() {
                    result = GameResult::Winner(Side::One);
                }
                break;
            }

            state_one = out_one.next_state;
            state_two = out_two.next_state;
            step_count += 1;
        }

        match result {
            GameResult::Winner(Side::One) => wins_one += 1,
            GameResult::Winner(Side::Two) => wins_two += 1,
            GameResult::Draw => draws += 1,
            GameResult::Unresolved => unfinished += 1,
        }

        if (episode + 1) % 1000 == 0 {
            info!("训练进度: {}/{}", episode + 1, config.episodes);
        }
    }

    save_q_table(agent_one.table(), &config.table_path_one)
        .context("保存 1 号代理 Q 值表失败")?;
    save_q_table(agent_two.table(), &config.table_path_two)
        .context("保存 2 号代理 Q 值表失败")?;

    let report = TrainingReport {
        episodes: config.episodes,
        wins_one,
        wins_two,
        draws,
        unfinished,
        table_entries_one: agent_one.table_len(),
        table_entries_two: agent_two.table_len(),
        finished_at: Utc::now(),
    };

    if let Some(report_path) = &config.report_path {
        let json = report.to_json().context("序列化训练报告失败")?;
        fs::write(report_path, json)
            .with_context(|| format!("写入训练报告失败: {:?}", report_path))?;
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_short_training_run() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = TrainConfig::with_dir(temp_dir.path());
        config.episodes = 5;
        config.seed = Some(12345);

        let report = train(&config).unwrap();

        assert_eq!(report.episodes, 5);
        assert_eq!(
            report.wins_one + report.wins_two + report.draws + report.unfinished,
            5
        );
        // 每个回合至少见过一个状态
        assert!(report.table_entries_one > 0);
        assert!(report.table_entries_two > 0);

        // 两张表和报告都已落盘
        assert!(config.table_path_one.exists());
        assert!(config.table_path_two.exists());
        assert!(config.report_path.as_ref().unwrap().exists());
    }

    #[test]
    fn test_training_resumes_from_saved_tables() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = TrainConfig::with_dir(temp_dir.path());
        config.episodes = 3;
        config.seed = Some(777);

        let first = train(&config).unwrap();
        let second = train(&config).unwrap();

        // 第二轮在第一轮的表上继续积累
        assert!(second.table_entries_one >= first.table_entries_one);
    }

    #[test]
    fn test_report_json_roundtrip() {
        let report = TrainingReport {
            episodes: 10,
            wins_one: 4,
            wins_two: 3,
            draws: 1,
            unfinished: 2,
            table_entries_one: 100,
            table_entries_two: 90,
            finished_at: Utc::now(),
        };

        let json = report.to_json().unwrap();
        let parsed: TrainingReport = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.episodes, 10);
        assert_eq!(parsed.wins_one, 4);
        assert_eq!(parsed.unfinished, 2);
    }
}
