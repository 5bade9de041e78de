//! 日志工具模块
//!
//! 提供日志初始化、格式化和输出的辅助函数

use anyhow::Result;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// 安装全局日志订阅者
///
/// `RUST_LOG` 优先；否则为 `info`，详细模式下为 `debug`
///
/// # 参数
/// - `verbose`: 是否显示详细日志
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // 重复初始化（例如测试中）直接忽略
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 初始化日志文件
///
/// # 参数
/// - `log_file_path`: 日志文件路径
///
/// # 返回
/// 返回是否成功初始化
pub fn init_log_file(log_file_path: &Path) -> Result<()> {
    let log_header = format!(
        "{}\n作业评审日志 - {}\n{}\n\n",
        "=".repeat(60),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        "=".repeat(60)
    );
    fs::write(log_file_path, log_header)?;
    Ok(())
}

/// 向日志文件追加一行
pub fn append_log_line(log_file_path: &Path, line: &str) -> Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file_path)?;
    writeln!(file, "{}", line)?;
    Ok(())
}

/// 记录程序启动信息
///
/// # 参数
/// - `max_concurrent`: 最大并发数
/// - `reviewer`: 评审策略名称
pub fn log_startup(max_concurrent: usize, reviewer: &str) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 批量作业评审模式");
    info!("🧑‍🏫 评审策略: {}", reviewer);
    info!("📊 最大并发数: {}", max_concurrent);
    info!("{}", "=".repeat(60));
}

/// 记录作业加载信息
///
/// # 参数
/// - `parsed`: 解析成功数量
/// - `failed`: 解析失败数量
/// - `max_concurrent`: 最大并发数
pub fn log_works_loaded(parsed: usize, failed: usize, max_concurrent: usize) {
    info!("✓ 解析成功 {} 份作业，失败 {} 份", parsed, failed);
    info!("📋 将以每批 {} 份的方式评审", max_concurrent);
    info!("💡 每批完成后再开始下一批\n");
}

/// 记录批次开始信息
///
/// # 参数
/// - `batch_num`: 批次编号
/// - `total_batches`: 批次总数
/// - `start`: 起始作业编号
/// - `end`: 结束作业编号
/// - `total`: 作业总数
pub fn log_batch_start(
    batch_num: usize,
    total_batches: usize,
    start: usize,
    end: usize,
    total: usize,
) {
    info!("\n{}", "=".repeat(60));
    info!("📦 开始评审第 {}/{} 批", batch_num, total_batches);
    info!("📄 本批作业: {}-{} / 共 {} 份", start, end, total);
    info!("{}", "=".repeat(60));
}

/// 记录批次完成信息
pub fn log_batch_complete(batch_num: usize, success: usize, total: usize) {
    info!("\n{}", "─".repeat(60));
    info!("✓ 第 {} 批完成: 成功 {}/{}", batch_num, success, total);
    info!("{}", "─".repeat(60));
}

/// 最终统计
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FinalStats {
    /// 找到的作业总数
    pub total_works: usize,
    /// 解析失败的作业
    pub parse_failed: usize,
    /// 评审成功的任务
    pub reviewed_tasks: usize,
    /// 评审失败的任务
    pub failed_tasks: usize,
}

impl FinalStats {
    pub fn summary_line(&self) -> String {
        format!(
            "作业 {} 份 | 解析失败 {} | 任务评审成功 {} | 任务评审失败 {}",
            self.total_works, self.parse_failed, self.reviewed_tasks, self.failed_tasks
        )
    }
}

/// 打印最终统计信息
///
/// # 参数
/// - `stats`: 统计数据
/// - `report_path`: CSV 报告路径
/// - `log_file_path`: 日志文件路径
pub fn print_final_stats(stats: &FinalStats, report_path: &Path, log_file_path: &Path) {
    info!("\n{}", "=".repeat(60));
    info!("📊 全部评审完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("📚 作业总数: {}", stats.total_works);
    info!("⚠️ 解析失败: {}", stats.parse_failed);
    info!("✅ 任务评审成功: {}", stats.reviewed_tasks);
    info!("❌ 任务评审失败: {}", stats.failed_tasks);
    info!("{}", "=".repeat(60));
    info!("\n报告已保存至: {}", report_path.display());
    info!("日志已保存至: {}", log_file_path.display());
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
