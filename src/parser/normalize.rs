//! 文本规范化，只用于相等比较，不用于展示或存储

use regex::Regex;
use std::sync::LazyLock;

static LINE_BREAKS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\r\n?").expect("line break pattern is valid"));
static EXCESS_NEWLINES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{3,}").expect("newline run pattern is valid"));
static HORIZONTAL_SPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t]+").expect("horizontal space pattern is valid"));

/// 规范化文本
///
/// 依次执行：统一换行符为 `\n`；3 个及以上连续换行压缩为 2 个；
/// 连续空格/制表符压缩为一个空格；去掉首尾空白
pub fn normalize(text: &str) -> String {
    let text = LINE_BREAKS.replace_all(text, "\n");
    let text = EXCESS_NEWLINES.replace_all(&text, "\n\n");
    let text = HORIZONTAL_SPACE.replace_all(&text, " ");
    text.trim().to_string()
}
