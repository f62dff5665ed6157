//! Q 值表持久化
//!
//! 值表以 bincode 二进制整体落盘：保存是全量覆盖写，
//! 加载时文件不存在属于正常情况，返回空表从头训练。

use std::fs;
use std::io;
use std::path::Path;

use thiserror::Error;
use tracing::info;

use crate::qlearning::QTable;

/// 持久化错误类型
#[derive(Error, Debug)]
pub enum StoreError {
    /// IO 错误
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// 序列化错误（bincode）
    #[error("Bincode serialization error: {0}")]
    Bincode(#[from] bincode::Error),
}

/// 持久化操作结果类型
pub type Result<T> = std::result::Result<T, StoreError>;

/// 保存 Q 值表（全量覆盖目标文件）
pub fn save_q_table(table: &QTable, path: &Path) -> Result<()> {
    let bytes = bincode::serialize(table)?;
    fs::write(path, bytes)?;
    info!("Q 值表已保存: {:?} ({} 条)", path, table.len());
    Ok(())
}

/// 加载 Q 值表
///
/// 文件不存在时返回空表（可恢复情况，不是错误）；
/// 文件存在但损坏时返回错误。
pub fn load_q_table(path: &Path) -> Result<QTable> {
    match fs::read(path) {
        Ok(bytes) => {
            let table: QTable = bincode::deserialize(&bytes)?;
            info!("Q 值表已加载: {:?} ({} 条)", path, table.len());
            Ok(table)
        }
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            info!("未找到 Q 值表 {:?}，从空表开始", path);
            Ok(QTable::new())
        }
        Err(err) => Err(err.into()),
    }
}
