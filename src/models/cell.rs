use serde::{Deserialize, Serialize};

/// 合并后学生修改过的文本块前缀
pub const CHANGED_MARKER: &str = "[ИЗМЕНЕНО СТУДЕНТОМ].";

/// 单元格类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellType {
    /// 代码单元格
    Code,
    /// Markdown 单元格
    Markdown,
    /// 由不同类型单元格合并而来
    Other,
}

impl std::fmt::Display for CellType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            CellType::Code => "code",
            CellType::Markdown => "markdown",
            CellType::Other => "other",
        };
        write!(f, "{s}")
    }
}

/// notebook 中的一个内容块
///
/// 不可变值对象，各阶段都生成新的 Cell 而不是原地修改
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub is_changed: bool,
    pub cell_type: CellType,
    pub text: String,
}

impl Cell {
    pub fn new(is_changed: bool, cell_type: CellType, text: impl Into<String>) -> Self {
        Self {
            is_changed,
            cell_type,
            text: text.into(),
        }
    }

    /// 加载阶段创建的代码单元格（未标记修改）
    pub fn code(text: impl Into<String>) -> Self {
        Self::new(false, CellType::Code, text)
    }

    /// 加载阶段创建的 Markdown 单元格（未标记修改）
    pub fn markdown(text: impl Into<String>) -> Self {
        Self::new(false, CellType::Markdown, text)
    }

    /// 返回修改标记被替换后的新单元格
    pub fn with_changed(&self, is_changed: bool) -> Self {
        Self {
            is_changed,
            cell_type: self.cell_type,
            text: self.text.clone(),
        }
    }
}

/// 合并方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeKind {
    /// 只按是否修改分组，类型信息丢弃
    #[default]
    ByChange,
    /// 按（是否修改，单元格类型）分组
    ByChangeAndType,
}

impl std::fmt::Display for MergeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            MergeKind::ByChange => "by_change",
            MergeKind::ByChangeAndType => "by_change_and_type",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for MergeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "by_change" | "change" => Ok(MergeKind::ByChange),
            "by_change_and_type" | "by_change_and_cell_type" | "change_and_type" => {
                Ok(MergeKind::ByChangeAndType)
            }
            _ => Err(format!(
                "未知的合并方式 '{s}'，可选: by_change, by_change_and_type"
            )),
        }
    }
}
