use crate::models::{Cell, CellType, MergeKind, CHANGED_MARKER};

/// 合并单元格文本时的分隔符
pub const CELL_SEPARATOR: &str = "\n\n";

/// 评审时把整个任务拼成一个字符串的默认分隔符
pub const TASK_SEPARATOR: &str = "\n\n\n";

/// 分组键：是否修改 + （按模式）单元格类型
fn group_key(cell: &Cell, mode: MergeKind) -> (bool, Option<CellType>) {
    match mode {
        MergeKind::ByChange => (cell.is_changed, None),
        MergeKind::ByChangeAndType => (cell.is_changed, Some(cell.cell_type)),
    }
}

/// 合并一个连续片段
fn merge_run(run: &[Cell], mode: MergeKind) -> Cell {
    let is_changed = run[0].is_changed;
    let cell_type = match mode {
        MergeKind::ByChange => CellType::Other,
        MergeKind::ByChangeAndType => run[0].cell_type,
    };

    let joined = run
        .iter()
        .map(|c| c.text.as_str())
        .collect::<Vec<_>>()
        .join(CELL_SEPARATOR);

    let text = if is_changed {
        format!("{CHANGED_MARKER}\n{joined}")
    } else {
        joined
    };

    Cell::new(is_changed, cell_type, text)
}

/// 合并单个任务内相邻且分组键相同的单元格
///
/// 只合并相邻片段（游程分组），不相邻的同键单元格保持独立，输出顺序与片段出现顺序一致
pub fn combine_task(task: &[Cell], mode: MergeKind) -> Vec<Cell> {
    task.chunk_by(|a, b| group_key(a, mode) == group_key(b, mode))
        .map(|run| merge_run(run, mode))
        .collect()
}

/// 对每个任务分别执行合并
pub fn combine_tasks(tasks: &[Vec<Cell>], mode: MergeKind) -> Vec<Vec<Cell>> {
    tasks.iter().map(|task| combine_task(task, mode)).collect()
}

/// 把任务的所有单元格文本拼接为一个字符串
pub fn merge_task_text(task: &[Cell], delim: &str) -> String {
    task.iter()
        .map(|c| c.text.as_str())
        .collect::<Vec<_>>()
        .join(delim)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn changed(cell: Cell) -> Cell {
        cell.with_changed(true)
    }

    #[test]
    fn test_by_change_merges_mixed_types() {
        let task = vec![
            Cell::markdown("## Задача 1 (10 баллов)"),
            changed(Cell::code("x=1")),
            changed(Cell::markdown("comment")),
            changed(Cell::code("y=2")),
        ];

        let combined = combine_task(&task, MergeKind::ByChange);

        assert_eq!(
            combined,
            vec![
                Cell::new(false, CellType::Other, "## Задача 1 (10 баллов)"),
                Cell::new(
                    true,
                    CellType::Other,
                    format!("{CHANGED_MARKER}\nx=1\n\ncomment\n\ny=2")
                ),
            ]
        );
    }

    #[test]
    fn test_by_change_and_type_splits_on_type() {
        let task = vec![
            changed(Cell::code("x=1")),
            changed(Cell::code("x+=1")),
            changed(Cell::markdown("comment")),
            Cell::code("print(x)"),
        ];

        let combined = combine_task(&task, MergeKind::ByChangeAndType);

        assert_eq!(combined.len(), 3);
        assert_eq!(combined[0].cell_type, CellType::Code);
        assert_eq!(combined[0].text, format!("{CHANGED_MARKER}\nx=1\n\nx+=1"));
        assert_eq!(combined[1].cell_type, CellType::Markdown);
        assert!(combined[1].is_changed);
        assert_eq!(combined[2], Cell::code("print(x)"));
    }

    #[test]
    fn test_non_adjacent_runs_stay_separate() {
        let task = vec![
            Cell::markdown("условие"),
            changed(Cell::code("ответ")),
            Cell::markdown("ещё условие"),
        ];

        let combined = combine_task(&task, MergeKind::ByChange);

        assert_eq!(combined.len(), 3);
        assert_eq!(combined[0].text, "условие");
        assert_eq!(combined[2].text, "ещё условие");
    }

    #[test]
    fn test_marker_only_on_changed() {
        let task = vec![
            Cell::markdown("a"),
            changed(Cell::code("b")),
            Cell::markdown("c"),
            changed(Cell::code("d")),
        ];

        for mode in [MergeKind::ByChange, MergeKind::ByChangeAndType] {
            for cell in combine_task(&task, mode) {
                assert_eq!(cell.text.starts_with(CHANGED_MARKER), cell.is_changed);
            }
        }
    }

    #[test]
    fn test_empty_tasks_stay_empty() {
        let combined = combine_tasks(&[Vec::new(), vec![Cell::code("x")]], MergeKind::ByChange);
        assert_eq!(combined.len(), 2);
        assert!(combined[0].is_empty());
        assert_eq!(combined[1], vec![Cell::new(false, CellType::Other, "x")]);
    }

    #[test]
    fn test_merge_task_text() {
        let task = vec![Cell::markdown("a"), Cell::code("b")];
        assert_eq!(merge_task_text(&task, TASK_SEPARATOR), "a\n\n\nb");
    }
}
