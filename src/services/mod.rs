//! 业务能力层（Services）
//!
//! - `TaskReviewer` 三种评审策略：整体评审 / 逐题评审 / 协作评审
//! - `prompts` 提示词模板
//! - `ReportWriter` 写 CSV 报告
//! - `WarnWriter` 记录无法解析的作业

pub mod collaborative_reviewer;
pub mod full_reviewer;
pub mod prompts;
pub mod report_writer;
pub mod step_reviewer;
pub mod warn_writer;

pub use collaborative_reviewer::CollaborativeTaskReviewer;
pub use full_reviewer::FullTaskReviewer;
pub use report_writer::{ReportWriter, ReviewRecord, ReviewStatus};
pub use step_reviewer::StepByStepTaskReviewer;
pub use warn_writer::WarnWriter;

use crate::clients::{build_client, LlmClient};
use crate::config::Config;
use crate::error::ReviewResult;
use crate::models::Cell;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// 评审策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewerKind {
    /// 整个任务一次评审
    #[default]
    Full,
    /// 按（问题，回答）逐对评审
    StepByStep,
    /// 两个模型轮流评审后汇总
    Collaborative,
}

impl std::str::FromStr for ReviewerKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "full" => Ok(ReviewerKind::Full),
            "step_by_step" | "step" => Ok(ReviewerKind::StepByStep),
            "collaborative" => Ok(ReviewerKind::Collaborative),
            _ => Err(format!(
                "未知的评审策略 '{s}'，可选: full, step_by_step, collaborative"
            )),
        }
    }
}

/// 评审默认值
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewOptions {
    /// 任务未声明分数时的满分
    pub default_max_score: u32,
    /// 未指定提示词时使用（模板名称或原文），为空时使用 `advanced_prompt`
    pub default_prompt: Option<String>,
}

impl Default for ReviewOptions {
    fn default() -> Self {
        Self {
            default_max_score: 10,
            default_prompt: None,
        }
    }
}

impl From<&Config> for ReviewOptions {
    fn from(config: &Config) -> Self {
        Self {
            default_max_score: config.default_max_score,
            default_prompt: config.review_prompt.clone(),
        }
    }
}

impl ReviewOptions {
    pub fn max_score(&self, max_score: Option<u32>) -> u32 {
        max_score.unwrap_or(self.default_max_score)
    }

    pub fn prompt(&self, prompt: Option<&str>, max_score: u32) -> String {
        match prompt.or(self.default_prompt.as_deref()) {
            Some(value) => prompts::resolve_prompt(value, max_score),
            None => prompts::advanced_prompt(max_score),
        }
    }
}

/// 任务评审能力
#[async_trait]
pub trait TaskReviewer: Send + Sync {
    /// 评审一个任务的合并单元格，返回自由文本结论
    ///
    /// # 参数
    /// - `cells`: 合并后的单元格
    /// - `max_score`: 任务声明的满分（为空时使用默认值）
    /// - `prompt`: 自定义提示词（为空时使用默认提示词）
    async fn review(
        &self,
        cells: &[Cell],
        max_score: Option<u32>,
        prompt: Option<&str>,
    ) -> ReviewResult<String>;
}

/// 按配置创建评审器
pub fn build_reviewer(config: &Config) -> ReviewResult<Arc<dyn TaskReviewer>> {
    let options = ReviewOptions::from(config);
    let primary: Arc<dyn LlmClient> = build_client(config.llm_backend, config)?;

    let reviewer: Arc<dyn TaskReviewer> = match config.reviewer_kind {
        ReviewerKind::Full => Arc::new(FullTaskReviewer::new(primary, options)),
        ReviewerKind::StepByStep => Arc::new(StepByStepTaskReviewer::new(primary, options)),
        ReviewerKind::Collaborative => {
            let secondary = match config.secondary_backend {
                Some(backend) => build_client(backend, config)?,
                None => primary.clone(),
            };
            Arc::new(
                CollaborativeTaskReviewer::new(primary, secondary, options)
                    .with_iterations(config.collaborative_iterations),
            )
        }
    };

    Ok(reviewer)
}
