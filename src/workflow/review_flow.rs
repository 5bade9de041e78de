//! 作业评审流程 - 流程层
//!
//! 核心职责：定义"一份作业"的评审流程
//!
//! 流程顺序：
//! 1. 取前 N 个任务
//! 2. 逐个任务调用评审器（任务之间顺序执行）
//! 3. 单个任务失败只记录，不影响其他任务

use std::sync::Arc;
use tracing::{error, info};

use crate::parser::ParsedSubmission;
use crate::services::TaskReviewer;
use crate::utils::logging::truncate_text;
use crate::workflow::submission_ctx::SubmissionCtx;

/// 单个任务的评审结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskVerdict {
    /// 任务编号（从1开始）
    pub task_number: usize,
    /// 任务声明的满分
    pub max_score: Option<u32>,
    /// 评审结论或错误信息
    pub verdict: Result<String, String>,
}

/// 作业评审流程
///
/// - 不持有任何文件资源
/// - 只依赖业务能力（`TaskReviewer`）
pub struct ReviewFlow {
    reviewer: Arc<dyn TaskReviewer>,
    tasks_to_review: usize,
    verbose_logging: bool,
}

impl ReviewFlow {
    pub fn new(reviewer: Arc<dyn TaskReviewer>, tasks_to_review: usize) -> Self {
        Self {
            reviewer,
            tasks_to_review,
            verbose_logging: false,
        }
    }

    pub fn with_verbose_logging(mut self, verbose: bool) -> Self {
        self.verbose_logging = verbose;
        self
    }

    /// 评审一份已解析的作业
    ///
    /// # 参数
    /// - `parsed`: 解析结果
    /// - `ctx`: 作业上下文
    ///
    /// # 返回
    /// 前 `tasks_to_review` 个任务的评审结果
    pub async fn run(&self, parsed: &ParsedSubmission, ctx: &SubmissionCtx) -> Vec<TaskVerdict> {
        let mut verdicts = Vec::new();

        for (i, cells) in parsed.tasks.iter().take(self.tasks_to_review).enumerate() {
            let task_number = i + 1;
            let max_score = parsed.scores.get(i).copied().flatten();

            info!("{} 🔍 评审任务 {} (满分 {:?})", ctx, task_number, max_score);

            let verdict = match self.reviewer.review(cells, max_score, None).await {
                Ok(text) => {
                    if self.verbose_logging {
                        info!("{} 任务 {} 结论: {}", ctx, task_number, truncate_text(&text, 200));
                    }
                    Ok(text)
                }
                Err(e) => {
                    error!("{} ❌ 任务 {} 评审失败: {}", ctx, task_number, e);
                    Err(e.to_string())
                }
            };

            verdicts.push(TaskVerdict {
                task_number,
                max_score,
                verdict,
            });
        }

        verdicts
    }
}
