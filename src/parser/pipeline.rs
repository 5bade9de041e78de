use crate::error::{PipelineError, PipelineResult};
use crate::models::{load_cells, Cell, MergeKind};
use crate::parser::combine::combine_tasks;
use crate::parser::detect::mark_changed;
use crate::parser::segment::{segment_tasks, Scores, Tasks};
use serde::Serialize;
use std::path::Path;
use tracing::{debug, info};

/// 一份作业的解析结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedSubmission {
    /// 每个任务合并后的单元格
    pub tasks: Tasks,
    /// 每个任务声明的满分
    pub scores: Scores,
}

impl From<ParsedSubmission> for (Tasks, Scores) {
    fn from(parsed: ParsedSubmission) -> Self {
        (parsed.tasks, parsed.scores)
    }
}

fn ensure_task_count(tasks: &Tasks, expected: usize) -> PipelineResult<()> {
    if tasks.len() != expected {
        return Err(PipelineError::TaskCountMismatch {
            actual: tasks.len(),
            expected,
        });
    }
    Ok(())
}

/// 完整解析流水线
///
/// 加载两份 notebook → 标记修改 → 按任务切分 → 按模式合并
///
/// # 参数
/// - `candidate_path`: 学生提交的 notebook
/// - `baseline_path`: 空白模板 notebook
/// - `mode`: 合并方式
/// - `expected_task_count`: 任务数量
pub fn run(
    candidate_path: &Path,
    baseline_path: &Path,
    mode: MergeKind,
    expected_task_count: usize,
) -> PipelineResult<ParsedSubmission> {
    let baseline = load_cells(baseline_path)?;
    parse_submission(candidate_path, &baseline, mode, expected_task_count)
}

/// 使用已加载的基线解析一份作业
///
/// 批量评审时基线只读取一次
pub fn parse_submission(
    candidate_path: &Path,
    baseline: &[Cell],
    mode: MergeKind,
    expected_task_count: usize,
) -> PipelineResult<ParsedSubmission> {
    let candidate = load_cells(candidate_path)?;
    let parsed = process_cells(baseline, &candidate, mode, expected_task_count)
        .map_err(|e| e.at_path(candidate_path))?;

    info!(
        "✓ 解析完成: {} ({} 个任务, 满分 {:?})",
        candidate_path.display(),
        parsed.tasks.len(),
        parsed.scores
    );

    Ok(parsed)
}

/// 对内存中的单元格执行 标记 → 切分 → 合并
pub fn process_cells(
    baseline: &[Cell],
    candidate: &[Cell],
    mode: MergeKind,
    expected_task_count: usize,
) -> PipelineResult<ParsedSubmission> {
    let marked = mark_changed(baseline, candidate);

    let (tasks, scores) = segment_tasks(marked, expected_task_count)?;
    ensure_task_count(&tasks, expected_task_count)?;

    let combined = combine_tasks(&tasks, mode);
    ensure_task_count(&combined, expected_task_count)?;

    debug!("合并方式 {}: {} 个任务", mode, combined.len());

    Ok(ParsedSubmission {
        tasks: combined,
        scores,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CellType, CHANGED_MARKER};

    #[test]
    fn test_process_cells_scenario() {
        let baseline = vec![Cell::markdown("## Задача 1 (10 баллов)"), Cell::code("")];
        let candidate = vec![
            Cell::markdown("## Задача 1 (10 баллов)"),
            Cell::code("x=1"),
            Cell::markdown("comment"),
            Cell::code("y=2"),
        ];

        let parsed = process_cells(&baseline, &candidate, MergeKind::ByChange, 1).unwrap();

        assert_eq!(
            parsed.tasks,
            vec![vec![
                Cell::new(false, CellType::Other, "## Задача 1 (10 баллов)"),
                Cell::new(
                    true,
                    CellType::Other,
                    format!("{CHANGED_MARKER}\nx=1\n\ncomment\n\ny=2")
                ),
            ]]
        );
        assert_eq!(parsed.scores, vec![Some(10)]);
    }

    #[test]
    fn test_into_tuple() {
        let parsed = process_cells(&[], &[], MergeKind::ByChange, 2).unwrap();
        let (tasks, scores): (Tasks, Scores) = parsed.into();
        assert_eq!(tasks.len(), 2);
        assert_eq!(scores, vec![None, None]);
    }
}
