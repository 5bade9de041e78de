//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责批量处理和流程调度，是整个系统的"指挥中心"。
//!
//! ### `batch_processor` - 批量作业处理器
//! - 管理应用生命周期（初始化、运行）
//! - 只加载一次空白模板，解析全部作业
//! - 控制并发数量（Semaphore）
//! - 写出 CSV 报告和 warn 文件
//! - 输出全局统计信息
//!
//! ## 层次关系
//!
//! ```text
//! batch_processor (处理 Vec<notebook>)
//!     ↓
//! parser (单元格 → 任务)
//!     ↓
//! workflow::ReviewFlow (处理单份作业)
//!     ↓
//! services (能力层：reviewer / report / warn)
//!     ↓
//! clients (LLM 后端)
//! ```

pub mod batch_processor;

pub use batch_processor::App;
