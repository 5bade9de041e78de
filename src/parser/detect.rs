use crate::models::Cell;
use crate::parser::normalize::normalize;
use std::collections::HashSet;
use tracing::debug;

/// 标记学生修改过的单元格
///
/// 把基线中所有单元格的规范化文本放入集合（不区分类型），
/// 候选单元格的规范化文本不在集合中即视为已修改。
/// 只比较集合成员关系，与位置无关。
///
/// 已知局限：规范化无法抵消的改动（例如段落中多一个换行或标点）仍会被视为修改。
///
/// # 返回
/// 与 `candidate` 等长、同序的新单元格序列
pub fn mark_changed(baseline: &[Cell], candidate: &[Cell]) -> Vec<Cell> {
    let original: HashSet<String> = baseline.iter().map(|c| normalize(&c.text)).collect();

    let marked: Vec<Cell> = candidate
        .iter()
        .map(|cell| cell.with_changed(!original.contains(&normalize(&cell.text))))
        .collect();

    debug!(
        "基线 {} 个单元格，候选 {} 个单元格，其中 {} 个被修改",
        baseline.len(),
        candidate.len(),
        marked.iter().filter(|c| c.is_changed).count()
    );

    marked
}
