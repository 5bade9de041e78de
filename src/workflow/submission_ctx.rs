//! 作业处理上下文
//!
//! 封装"我正在处理第几份作业、它在哪里"这一信息

use std::fmt::Display;
use std::path::PathBuf;

/// 作业处理上下文
#[derive(Debug, Clone)]
pub struct SubmissionCtx {
    /// notebook 路径
    pub path: PathBuf,

    /// 作业索引（从1开始，仅用于日志显示）
    pub work_index: usize,
}

impl SubmissionCtx {
    pub fn new(path: impl Into<PathBuf>, work_index: usize) -> Self {
        Self {
            path: path.into(),
            work_index,
        }
    }

    /// 报告中显示的文件名
    pub fn file_label(&self) -> String {
        self.path.display().to_string()
    }
}

impl Display for SubmissionCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| self.path.to_string_lossy());
        write!(f, "[作业 #{} {}]", self.work_index, name)
    }
}
