//! 批量作业处理器 - 编排层
//!
//! ## 核心功能
//!
//! 1. **应用初始化**：写日志文件头、创建评审器、加载空白模板
//! 2. **批量解析**：扫描目录并解析所有作业，失败的写入 warn 文件
//! 3. **并发控制**：使用 Semaphore 限制同时评审的作业数量
//! 4. **分批处理**：每批完成后再开始下一批
//! 5. **全局统计**：汇总结果并写出 CSV 报告

use crate::config::Config;
use crate::models::{find_notebooks, load_cells, Cell};
use crate::parser::{parse_submission, ParsedSubmission};
use crate::services::{build_reviewer, ReportWriter, ReviewRecord, ReviewStatus, TaskReviewer, WarnWriter};
use crate::utils::logging::{
    append_log_line, init_log_file, log_batch_complete, log_batch_start, log_startup,
    log_works_loaded, print_final_stats, FinalStats,
};
use crate::workflow::{ReviewFlow, SubmissionCtx, TaskVerdict};
use anyhow::{Context, Result};
use futures::future::join_all;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{error, info, warn};

/// 应用主结构
pub struct App {
    config: Config,
    flow: Arc<ReviewFlow>,
    baseline: Arc<[Cell]>,
    warn_writer: WarnWriter,
    report_writer: ReportWriter,
}

/// 一份作业的全部报告行
struct WorkOutcome {
    work_index: usize,
    records: Vec<ReviewRecord>,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        init_log_file(&config.output_log_file)?;

        log_startup(
            config.max_concurrent_works,
            &format!("{:?}", config.reviewer_kind),
        );

        let reviewer = build_reviewer(&config)?;
        Self::with_reviewer(config, reviewer)
    }

    /// 使用给定的评审器创建应用
    pub fn with_reviewer(config: Config, reviewer: Arc<dyn TaskReviewer>) -> Result<Self> {
        let baseline: Arc<[Cell]> = load_cells(&config.baseline_notebook)
            .with_context(|| {
                format!("无法加载空白模板: {}", config.baseline_notebook.display())
            })?
            .into();

        info!(
            "📘 空白模板已加载: {} ({} 个单元格)",
            config.baseline_notebook.display(),
            baseline.len()
        );

        let flow = ReviewFlow::new(reviewer, config.tasks_to_review)
            .with_verbose_logging(config.verbose_logging);

        Ok(Self {
            warn_writer: WarnWriter::with_path(&config.warn_file),
            report_writer: ReportWriter::new(&config.report_file),
            flow: Arc::new(flow),
            baseline,
            config,
        })
    }

    /// 运行应用主逻辑
    pub async fn run(&self) -> Result<FinalStats> {
        info!("\n📁 正在扫描待评审的作业...");
        let paths = self.scan_works().await?;

        let mut stats = FinalStats {
            total_works: paths.len(),
            ..Default::default()
        };

        if paths.is_empty() {
            warn!("⚠️ 没有找到待评审的 notebook，程序结束");
            self.report_writer.write(&[])?;
            return Ok(stats);
        }

        let (parsed, mut outcomes) = self.parse_all(paths);
        stats.parse_failed = outcomes.len();

        log_works_loaded(parsed.len(), stats.parse_failed, self.batch_size());

        outcomes.extend(self.review_all(parsed).await?);
        outcomes.sort_by_key(|o| o.work_index);

        let records: Vec<ReviewRecord> = outcomes.into_iter().flat_map(|o| o.records).collect();
        for record in &records {
            match record.status {
                ReviewStatus::Reviewed => stats.reviewed_tasks += 1,
                ReviewStatus::ReviewError => stats.failed_tasks += 1,
                ReviewStatus::ParseError => {}
            }
        }

        self.report_writer.write(&records)?;

        print_final_stats(
            &stats,
            self.report_writer.path(),
            &self.config.output_log_file,
        );
        append_log_line(&self.config.output_log_file, &stats.summary_line())?;

        Ok(stats)
    }

    fn batch_size(&self) -> usize {
        self.config.max_concurrent_works.max(1)
    }

    /// 扫描作业目录（空白模板本身不参与评审）
    async fn scan_works(&self) -> Result<Vec<PathBuf>> {
        let baseline = canonical(&self.config.baseline_notebook);
        let paths = find_notebooks(&self.config.works_folder).await?;

        Ok(paths
            .into_iter()
            .filter(|path| canonical(path) != baseline)
            .collect())
    }

    /// 解析所有作业
    ///
    /// # 返回
    /// 解析成功的作业，以及解析失败作业的报告行
    fn parse_all(
        &self,
        paths: Vec<PathBuf>,
    ) -> (Vec<(SubmissionCtx, ParsedSubmission)>, Vec<WorkOutcome>) {
        let mut parsed = Vec::new();
        let mut failed = Vec::new();

        for (idx, path) in paths.into_iter().enumerate() {
            let ctx = SubmissionCtx::new(path, idx + 1);

            match parse_submission(
                &ctx.path,
                &self.baseline,
                self.config.merge_kind,
                self.config.expected_task_count,
            ) {
                Ok(submission) => parsed.push((ctx, submission)),
                Err(e) => {
                    warn!("{} ⚠️ 解析失败，写入 warn 文件: {}", ctx, e);
                    let reason = e.to_string();
                    if let Err(write_err) = self.warn_writer.write(&ctx.path, &reason) {
                        error!("{} 写入 warn 文件失败: {}", ctx, write_err);
                    }
                    failed.push(WorkOutcome {
                        work_index: ctx.work_index,
                        records: vec![ReviewRecord {
                            file: ctx.file_label(),
                            task: None,
                            max_score: None,
                            status: ReviewStatus::ParseError,
                            verdict: reason,
                        }],
                    });
                }
            }
        }

        (parsed, failed)
    }

    /// 分批评审所有作业
    async fn review_all(
        &self,
        works: Vec<(SubmissionCtx, ParsedSubmission)>,
    ) -> Result<Vec<WorkOutcome>> {
        let batch_size = self.batch_size();
        let semaphore = Arc::new(Semaphore::new(batch_size));
        let total_works = works.len();
        let total_batches = total_works.div_ceil(batch_size);
        let mut outcomes = Vec::with_capacity(total_works);

        for (batch_idx, batch) in works.chunks(batch_size).enumerate() {
            let batch_num = batch_idx + 1;
            let batch_start = batch_idx * batch_size;

            log_batch_start(
                batch_num,
                total_batches,
                batch_start + 1,
                batch_start + batch.len(),
                total_works,
            );

            let batch_outcomes = self.review_batch(batch, semaphore.clone()).await?;

            let success = batch_outcomes
                .iter()
                .filter(|o| o.records.iter().all(|r| r.status == ReviewStatus::Reviewed))
                .count();
            log_batch_complete(batch_num, success, batch_outcomes.len());

            outcomes.extend(batch_outcomes);
        }

        Ok(outcomes)
    }

    /// 评审单个批次
    async fn review_batch(
        &self,
        batch: &[(SubmissionCtx, ParsedSubmission)],
        semaphore: Arc<Semaphore>,
    ) -> Result<Vec<WorkOutcome>> {
        let mut handles = Vec::with_capacity(batch.len());

        for (ctx, parsed) in batch {
            let permit = semaphore.clone().acquire_owned().await?;
            let flow = self.flow.clone();
            let ctx = ctx.clone();
            let parsed = parsed.clone();

            handles.push(tokio::spawn(async move {
                let _permit = permit;
                let verdicts = flow.run(&parsed, &ctx).await;
                (ctx, verdicts)
            }));
        }

        let mut outcomes = Vec::with_capacity(handles.len());
        for (joined, (ctx, _)) in join_all(handles).await.into_iter().zip(batch) {
            match joined {
                Ok((ctx, verdicts)) => outcomes.push(WorkOutcome {
                    work_index: ctx.work_index,
                    records: verdicts.into_iter().map(|v| to_record(&ctx, v)).collect(),
                }),
                Err(e) => {
                    error!("{} 任务执行失败: {}", ctx, e);
                    outcomes.push(WorkOutcome {
                        work_index: ctx.work_index,
                        records: vec![ReviewRecord {
                            file: ctx.file_label(),
                            task: None,
                            max_score: None,
                            status: ReviewStatus::ReviewError,
                            verdict: e.to_string(),
                        }],
                    });
                }
            }
        }

        Ok(outcomes)
    }
}

fn to_record(ctx: &SubmissionCtx, verdict: TaskVerdict) -> ReviewRecord {
    let (status, text) = match verdict.verdict {
        Ok(text) => (ReviewStatus::Reviewed, text),
        Err(reason) => (ReviewStatus::ReviewError, reason),
    };

    ReviewRecord {
        file: ctx.file_label(),
        task: Some(verdict.task_number),
        max_score: verdict.max_score,
        status,
        verdict: text,
    }
}

fn canonical(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ReviewError, ReviewResult};
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::fs;

    struct CountingReviewer;

    #[async_trait]
    impl TaskReviewer for CountingReviewer {
        async fn review(
            &self,
            cells: &[Cell],
            _max_score: Option<u32>,
            _prompt: Option<&str>,
        ) -> ReviewResult<String> {
            if cells.is_empty() {
                return Err(ReviewError::NoCells);
            }
            let changed = cells.iter().filter(|c| c.is_changed).count();
            Ok(format!("changed={changed}"))
        }
    }

    fn notebook(cells: &[(&str, &str)]) -> Value {
        let cells: Vec<Value> = cells
            .iter()
            .map(|(kind, text)| json!({"cell_type": kind, "metadata": {}, "source": text}))
            .collect();
        json!({"nbformat": 4, "nbformat_minor": 5, "metadata": {}, "cells": cells})
    }

    fn write(path: &Path, value: &Value) {
        fs::write(path, serde_json::to_string_pretty(value).unwrap()).unwrap();
    }

    #[tokio::test]
    async fn test_run_writes_report_and_warns() {
        let dir = tempfile::tempdir().unwrap();
        let works = dir.path().join("works");
        fs::create_dir(&works).unwrap();

        let baseline = notebook(&[
            ("markdown", "## Задача 1 (10 баллов)"),
            ("code", "# ваш код"),
            ("markdown", "## Задача 2"),
            ("code", "# ваш код"),
        ]);
        write(&works.join("original.ipynb"), &baseline);

        write(
            &works.join("a_ivanov.ipynb"),
            &notebook(&[
                ("markdown", "## Задача 1 (10 баллов)"),
                ("code", "x = 1"),
                ("markdown", "## Задача 2"),
                ("code", "# ваш код"),
            ]),
        );
        write(
            &works.join("b_petrov.ipynb"),
            &notebook(&[("markdown", "## Задача 7"), ("code", "y = 2")]),
        );

        let config = Config {
            works_folder: works.clone(),
            baseline_notebook: works.join("original.ipynb"),
            expected_task_count: 2,
            tasks_to_review: 2,
            report_file: dir.path().join("report.csv"),
            warn_file: dir.path().join("warn.txt"),
            output_log_file: dir.path().join("output.txt"),
            ..Config::default()
        };

        let app = App::with_reviewer(config.clone(), Arc::new(CountingReviewer)).unwrap();
        let stats = app.run().await.unwrap();

        assert_eq!(
            stats,
            FinalStats {
                total_works: 2,
                parse_failed: 1,
                reviewed_tasks: 2,
                failed_tasks: 0,
            }
        );

        let report = fs::read_to_string(&config.report_file).unwrap();
        let lines: Vec<&str> = report.lines().collect();
        assert_eq!(lines[0], "file,task,max_score,status,verdict");
        assert!(lines[1].ends_with("a_ivanov.ipynb,1,10,reviewed,changed=1"));
        assert!(lines[2].ends_with("a_ivanov.ipynb,2,,reviewed,changed=0"));
        assert!(lines[3].contains("b_petrov.ipynb,,,parse_error,"));

        let warns = fs::read_to_string(&config.warn_file).unwrap();
        assert_eq!(warns.lines().count(), 1);
        assert!(warns.contains("b_petrov.ipynb | "));
    }

    #[tokio::test]
    async fn test_missing_baseline_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            baseline_notebook: dir.path().join("missing.ipynb"),
            ..Config::default()
        };

        assert!(App::with_reviewer(config, Arc::new(CountingReviewer)).is_err());
    }
}
