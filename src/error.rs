use std::path::{Path, PathBuf};

use thiserror::Error;

/// 解析流水线错误
///
/// 任何一个阶段失败都会直接中止整个流水线调用，不返回部分结果
#[derive(Debug, Error)]
pub enum PipelineError {
    /// 读取 notebook 文件失败
    #[error("无法读取 notebook 文件 ({}): {source}", .path.display())]
    DocumentRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// 文件不是合法的 nbformat v4 文档
    #[error("notebook 格式错误 ({}): {reason}", .path.display())]
    DocumentFormat { path: PathBuf, reason: String },

    /// 标题中的任务编号超出 [1, expected]
    ///
    /// 切分阶段不知道文件路径，`path` 为空，由流水线通过 [`PipelineError::at_path`] 补上
    #[error("任务编号 {number} 超出范围 [1, {expected}] ({})", .path.display())]
    TaskNumberOutOfRange {
        path: PathBuf,
        number: u64,
        expected: usize,
    },

    /// 分组数量与期望的任务数不一致
    #[error("任务分组数量 {actual} 与期望的 {expected} 不一致")]
    TaskCountMismatch { actual: usize, expected: usize },
}

impl PipelineError {
    /// 创建格式错误
    pub fn document_format(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        PipelineError::DocumentFormat {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// 为不带路径的错误补上出错的文件
    pub fn at_path(self, file: &Path) -> Self {
        match self {
            PipelineError::TaskNumberOutOfRange {
                number, expected, ..
            } => PipelineError::TaskNumberOutOfRange {
                path: file.to_path_buf(),
                number,
                expected,
            },
            other => other,
        }
    }
}

/// 评审（LLM 调用）错误
#[derive(Debug, Error)]
pub enum ReviewError {
    /// API 调用失败
    #[error("LLM API 调用失败 (后端: {backend}): {source}")]
    ApiCallFailed {
        backend: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// API 返回非成功状态码
    #[error("LLM API 返回错误响应 (后端: {backend}): status={status}, body={body}")]
    BadResponse {
        backend: String,
        status: u16,
        body: String,
    },

    /// 返回内容为空
    #[error("LLM 返回内容为空 (后端: {backend})")]
    EmptyContent { backend: String },

    /// 没有可评审的单元格
    #[error("没有提供可评审的单元格")]
    NoCells,

    /// 缺少必要的凭据
    #[error("缺少配置项: {0}")]
    MissingCredentials(String),
}

impl ReviewError {
    /// 创建 API 调用失败错误
    pub fn api_call_failed(
        backend: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        ReviewError::ApiCallFailed {
            backend: backend.into(),
            source: Box::new(source),
        }
    }

    /// 创建空内容错误
    pub fn empty_content(backend: impl Into<String>) -> Self {
        ReviewError::EmptyContent {
            backend: backend.into(),
        }
    }
}

/// 流水线结果类型
pub type PipelineResult<T> = Result<T, PipelineError>;

/// 评审结果类型
pub type ReviewResult<T> = Result<T, ReviewError>;
