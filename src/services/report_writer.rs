//! 评审报告写入服务
//!
//! 每个被评审的任务一行；解析失败的作业一行，状态为 `parse_error`

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

/// 单行结果状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewStatus {
    Reviewed,
    ReviewError,
    ParseError,
}

/// 报告中的一行
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewRecord {
    pub file: String,
    pub task: Option<usize>,
    pub max_score: Option<u32>,
    pub status: ReviewStatus,
    pub verdict: String,
}

/// CSV 报告写入服务
pub struct ReportWriter {
    report_path: PathBuf,
}

impl ReportWriter {
    pub fn new(report_path: impl Into<PathBuf>) -> Self {
        Self {
            report_path: report_path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.report_path
    }

    /// 写入全部记录（覆盖已有文件）
    pub fn write(&self, records: &[ReviewRecord]) -> Result<()> {
        let mut writer = csv::Writer::from_path(&self.report_path)
            .with_context(|| format!("无法创建报告文件: {}", self.report_path.display()))?;

        for record in records {
            writer.serialize(record)?;
        }
        writer.flush()?;

        info!(
            "📝 报告已写入 {} ({} 行)",
            self.report_path.display(),
            records.len()
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_writes_header_and_rows() {
        let dir = tempfile::tempdir().unwrap();
        let writer = ReportWriter::new(dir.path().join("report.csv"));

        writer
            .write(&[
                ReviewRecord {
                    file: "works/ivanov.ipynb".to_string(),
                    task: Some(1),
                    max_score: Some(10),
                    status: ReviewStatus::Reviewed,
                    verdict: "Оценка: 9\nКомментарий: хорошо".to_string(),
                },
                ReviewRecord {
                    file: "works/petrov.ipynb".to_string(),
                    task: None,
                    max_score: None,
                    status: ReviewStatus::ParseError,
                    verdict: "任务编号 5 超出范围 [1, 3]".to_string(),
                },
            ])
            .unwrap();

        let content = std::fs::read_to_string(writer.path()).unwrap();
        let mut lines = content.lines();
        assert_eq!(lines.next(), Some("file,task,max_score,status,verdict"));
        assert!(content.contains("works/ivanov.ipynb,1,10,reviewed,\"Оценка: 9\nКомментарий: хорошо\""));
        assert!(content.contains("works/petrov.ipynb,,,parse_error,"));
    }
}
