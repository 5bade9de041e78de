//! nbformat v4 文档的原始结构
//!
//! 只反序列化流水线需要的字段，其余字段（outputs、execution_count 等）忽略

use serde::Deserialize;

/// 支持的 nbformat 主版本号
pub const SUPPORTED_NBFORMAT: u32 = 4;

#[derive(Debug, Clone, Deserialize)]
pub struct RawNotebook {
    pub nbformat: u32,
    #[serde(default)]
    pub nbformat_minor: u32,
    pub cells: Vec<RawCell>,
}

/// 原始单元格，按 `cell_type` 字段区分
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "cell_type", rename_all = "lowercase")]
pub enum RawCell {
    Code {
        source: MultilineText,
    },
    Markdown {
        source: MultilineText,
        #[serde(default)]
        attachments: Option<serde_json::Value>,
    },
    #[serde(other)]
    Other,
}

/// nbformat 的多行文本：单个字符串或字符串列表
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum MultilineText {
    Single(String),
    Lines(Vec<String>),
}

impl MultilineText {
    /// 拼接为完整文本（列表元素之间不加分隔符，各元素自带换行）
    pub fn into_text(self) -> String {
        match self {
            MultilineText::Single(s) => s,
            MultilineText::Lines(lines) => lines.concat(),
        }
    }
}
