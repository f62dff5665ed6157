use std::fs;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use flip_trainer::{train, TrainConfig};

fn main() -> Result<()> {
    // 初始化日志
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("flip_trainer=info".parse()?)
                .add_directive("flip_ai=info".parse()?),
        )
        .init();

    // 可选的第一个参数覆盖训练回合数
    let episodes = std::env::args()
        .nth(1)
        .map(|arg| arg.parse::<usize>())
        .transpose()
        .context("训练回合数参数无效")?;

    let data_dir = dirs::data_dir()
        .context("无法获取应用数据目录")?
        .join("flip-chess");
    fs::create_dir_all(&data_dir)
        .with_context(|| format!("无法创建数据目录: {:?}", data_dir))?;

    let mut config = TrainConfig::with_dir(&data_dir);
    if let Some(episodes) = episodes {
        config.episodes = episodes;
    }

    info!("翻棋训练启动: {} 回合, 数据目录 {:?}", config.episodes, data_dir);

    let report = train(&config)?;

    info!(
        "训练完成: 1 号胜 {} / 2 号胜 {} / 和 {} / 未收场 {}",
        report.wins_one, report.wins_two, report.draws, report.unfinished
    );
    info!(
        "Q 值表条目: 1 号 {} 条, 2 号 {} 条",
        report.table_entries_one, report.table_entries_two
    );

    Ok(())
}
