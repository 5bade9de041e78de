//! 警告写入服务 - 业务能力层
//!
//! 只负责把无法解析的作业追加到 warn 文件，不关心流程

use anyhow::Result;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

/// 警告写入服务
pub struct WarnWriter {
    warn_file_path: PathBuf,
}

impl WarnWriter {
    /// 使用自定义文件路径创建
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            warn_file_path: path.into(),
        }
    }

    /// 追加一条警告
    ///
    /// # 参数
    /// - `file`: 作业文件
    /// - `reason`: 失败原因
    pub fn write(&self, file: &Path, reason: &str) -> Result<()> {
        debug!("写入警告: {} | {}", file.display(), reason);

        let mut out = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.warn_file_path)?;

        writeln!(out, "{} | {}", file.display(), reason)?;

        Ok(())
    }
}
