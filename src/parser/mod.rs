//! 解析层（Parser）
//!
//! 对比学生作业与空白模板，输出按任务切分、按修改状态合并后的单元格。
//!
//! ```text
//! load_cells (models::loaders)
//!     ↓
//! detect::mark_changed      规范化后按集合成员关系标记修改
//!     ↓
//! segment::segment_tasks    按 "## Задача N" 标题切分任务并提取分数
//!     ↓
//! combine::combine_tasks    合并相邻的同状态单元格
//! ```
//!
//! 本层同步执行、不做网络 I/O，多份作业之间互不依赖。

pub mod combine;
pub mod detect;
pub mod normalize;
pub mod pipeline;
pub mod segment;

pub use combine::{combine_task, combine_tasks, merge_task_text, CELL_SEPARATOR, TASK_SEPARATOR};
pub use detect::mark_changed;
pub use normalize::normalize;
pub use pipeline::{parse_submission, process_cells, run, ParsedSubmission};
pub use segment::{declared_score, segment_tasks, task_header, Scores, Tasks};
