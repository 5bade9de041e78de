use crate::error::{PipelineError, PipelineResult};
use crate::models::Cell;
use regex::Regex;
use std::path::PathBuf;
use std::sync::LazyLock;
use tracing::{debug, trace};

static TASK_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"##\s*[Зз]адача\s*([0-9]+)").expect("task header pattern is valid"));
static TASK_SCORE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([0-9]+)\s*[Бб]аллов").expect("score pattern is valid"));

/// 按任务分组后的单元格
pub type Tasks = Vec<Vec<Cell>>;

/// 每个任务声明的满分（未声明为 None）
pub type Scores = Vec<Option<u32>>;

/// 识别任务标题，返回任务编号
///
/// 编号超出 u64 时返回 `u64::MAX`，由调用方按越界处理
pub fn task_header(text: &str) -> Option<u64> {
    TASK_HEADER
        .captures(text)
        .map(|caps| caps[1].parse::<u64>().unwrap_or(u64::MAX))
}

/// 提取标题中声明的分数（"10 баллов"）
pub fn declared_score(text: &str) -> Option<u32> {
    TASK_SCORE
        .captures(text)
        .and_then(|caps| caps[1].parse::<u32>().ok())
}

/// 将单元格序列切分为固定数量的任务
///
/// 单次扫描的状态机：遇到编号在 `[1, expected_task_count]` 内的标题时切换当前任务，
/// 标题单元格本身归入该任务，并从同一文本中提取分数（后出现的覆盖先前的）；
/// 普通单元格归入当前任务；第一个标题之前的内容被丢弃。
///
/// # 参数
/// - `cells`: 已标记修改状态的单元格
/// - `expected_task_count`: 调用方给定的任务数量
///
/// # 返回
/// 恰好 `expected_task_count` 个分组和同样数量的分数槽位；
/// 任一标题编号越界时返回 `TaskNumberOutOfRange`，不返回部分结果
pub fn segment_tasks(cells: Vec<Cell>, expected_task_count: usize) -> PipelineResult<(Tasks, Scores)> {
    let mut tasks: Tasks = vec![Vec::new(); expected_task_count];
    let mut scores: Scores = vec![None; expected_task_count];
    let mut current: Option<usize> = None;

    for cell in cells {
        if let Some(number) = task_header(&cell.text) {
            let index = usize::try_from(number)
                .ok()
                .filter(|n| (1..=expected_task_count).contains(n))
                .map(|n| n - 1)
                .ok_or(PipelineError::TaskNumberOutOfRange {
                    path: PathBuf::new(),
                    number,
                    expected: expected_task_count,
                })?;

            if let Some(score) = declared_score(&cell.text) {
                trace!("任务 {} 声明满分 {}", number, score);
                scores[index] = Some(score);
            }

            current = Some(index);
            tasks[index].push(cell);
            continue;
        }

        match current {
            Some(index) => tasks[index].push(cell),
            None => trace!("丢弃第一个任务标题之前的单元格"),
        }
    }

    debug!(
        "切分完成: {} 个任务, 各任务单元格数 {:?}",
        expected_task_count,
        tasks.iter().map(Vec::len).collect::<Vec<_>>()
    );

    Ok((tasks, scores))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(task: &[Cell]) -> Vec<&str> {
        task.iter().map(|c| c.text.as_str()).collect()
    }

    #[test]
    fn test_header_patterns() {
        assert_eq!(task_header("## Задача 1"), Some(1));
        assert_eq!(task_header("### задача12. Линейная регрессия"), Some(12));
        assert_eq!(task_header("##Задача3"), Some(3));
        assert_eq!(task_header("# Задача 1"), None);
        assert_eq!(task_header("## Задание 1"), None);
        assert_eq!(task_header("## Задача 99999999999999999999999"), Some(u64::MAX));
    }

    #[test]
    fn test_score_patterns() {
        assert_eq!(declared_score("## Задача 1 (10 баллов)"), Some(10));
        assert_eq!(declared_score("## Задача 2. 5Баллов"), Some(5));
        assert_eq!(declared_score("## Задача 3 (5 очков)"), None);
    }

    #[test]
    fn test_segments_and_keeps_headers() {
        let cells = vec![
            Cell::markdown("# Домашнее задание"),
            Cell::markdown("## Задача 1 (10 баллов)"),
            Cell::code("a = 1"),
            Cell::markdown("## Задача 2"),
            Cell::code("b = 2"),
            Cell::markdown("комментарий"),
        ];

        let (tasks, scores) = segment_tasks(cells, 3).unwrap();

        assert_eq!(tasks.len(), 3);
        assert_eq!(texts(&tasks[0]), vec!["## Задача 1 (10 баллов)", "a = 1"]);
        assert_eq!(
            texts(&tasks[1]),
            vec!["## Задача 2", "b = 2", "комментарий"]
        );
        assert!(tasks[2].is_empty());
        assert_eq!(scores, vec![Some(10), None, None]);
    }

    #[test]
    fn test_repeated_header_returns_to_task_and_last_score_wins() {
        let cells = vec![
            Cell::markdown("## Задача 1 (4 баллов)"),
            Cell::code("x"),
            Cell::markdown("## Задача 2"),
            Cell::markdown("## Задача 1, часть 2 (6 баллов)"),
            Cell::code("y"),
        ];

        let (tasks, scores) = segment_tasks(cells, 2).unwrap();

        assert_eq!(
            texts(&tasks[0]),
            vec!["## Задача 1 (4 баллов)", "x", "## Задача 1, часть 2 (6 баллов)", "y"]
        );
        assert_eq!(texts(&tasks[1]), vec!["## Задача 2"]);
        assert_eq!(scores, vec![Some(6), None]);
    }

    #[test]
    fn test_header_without_score_keeps_previous() {
        let cells = vec![
            Cell::markdown("## Задача 1 (3 баллов)"),
            Cell::markdown("## Задача 1 продолжение"),
        ];
        let (_, scores) = segment_tasks(cells, 1).unwrap();
        assert_eq!(scores, vec![Some(3)]);
    }

    #[test]
    fn test_out_of_range_fails() {
        let cells = vec![Cell::markdown("## Задача 1"), Cell::markdown("## Задача 5")];
        let err = segment_tasks(cells, 2).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::TaskNumberOutOfRange {
                number: 5,
                expected: 2,
                ..
            }
        ));
    }

    #[test]
    fn test_task_zero_is_out_of_range() {
        let err = segment_tasks(vec![Cell::markdown("## Задача 0")], 2).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::TaskNumberOutOfRange { number: 0, .. }
        ));
    }

    #[test]
    fn test_zero_tasks_with_no_headers() {
        let (tasks, scores) = segment_tasks(vec![Cell::code("x")], 0).unwrap();
        assert!(tasks.is_empty());
        assert!(scores.is_empty());
    }
}
