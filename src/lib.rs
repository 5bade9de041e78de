//! # Notebook Review
//!
//! 对学生提交的 Jupyter notebook 作业做差异标记、按任务切分，并交给 LLM 评审
//!
//! ## 架构设计
//!
//! ### ① 解析层（Parser）
//! - `models/` - 单元格模型与 `.ipynb` 读取
//! - `parser/` - 归一化 → 标记修改 → 按任务切分 → 合并
//!
//! ### ② 客户端层（Clients）
//! - `clients/` - `LlmClient` 抽象，OpenAI 兼容接口和 YandexGPT 两种实现
//!
//! ### ③ 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，只处理单个任务
//! - `TaskReviewer` - 整体 / 逐题 / 协作三种评审策略
//! - `ReportWriter` / `WarnWriter` - 写报告和 warn 文件
//!
//! ### ④ 流程层（Workflow）
//! - `workflow/` - 定义"一份作业"的评审流程
//! - `SubmissionCtx` - 上下文封装（路径 + 作业编号）
//! - `ReviewFlow` - 流程编排（逐个任务评审，失败不中断）
//!
//! ### ⑤ 编排层（Orchestration）
//! - `orchestrator/batch_processor` - 批量作业处理器，管理并发和统计
//!
//! ## 模块结构

pub mod clients;
pub mod config;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod parser;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{PipelineError, PipelineResult, ReviewError, ReviewResult};
pub use models::{Cell, CellType, MergeKind, CHANGED_MARKER};
pub use orchestrator::App;
pub use parser::{parse_submission, process_cells, run, ParsedSubmission, Scores, Tasks};
pub use workflow::{ReviewFlow, SubmissionCtx, TaskVerdict};
