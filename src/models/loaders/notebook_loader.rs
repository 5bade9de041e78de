use crate::error::{PipelineError, PipelineResult};
use crate::models::cell::Cell;
use crate::models::notebook::{RawCell, RawNotebook, SUPPORTED_NBFORMAT};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// Markdown 中内嵌图片的标志
const EMBEDDED_PAYLOAD_MARKER: &str = "base64";

/// 读取 notebook 文件并提取过滤后的单元格序列
///
/// # 参数
/// - `path`: notebook 文件路径
///
/// # 返回
/// 按文档顺序排列的单元格（代码单元格全部保留，带附件或内嵌图片的 Markdown 被丢弃）
pub fn load_cells(path: &Path) -> PipelineResult<Vec<Cell>> {
    let content = std::fs::read_to_string(path).map_err(|source| PipelineError::DocumentRead {
        path: path.to_path_buf(),
        source,
    })?;

    let cells = parse_cells(&content, path)?;
    debug!("从 {} 提取了 {} 个单元格", path.display(), cells.len());
    Ok(cells)
}

/// 从 notebook JSON 文本中提取单元格
///
/// `path` 只用于错误信息
pub fn parse_cells(content: &str, path: &Path) -> PipelineResult<Vec<Cell>> {
    let notebook: RawNotebook = serde_json::from_str(content)
        .map_err(|e| PipelineError::document_format(path, e.to_string()))?;

    if notebook.nbformat != SUPPORTED_NBFORMAT {
        return Err(PipelineError::document_format(
            path,
            format!(
                "不支持的 nbformat 版本 {}.{}，仅支持 v{}",
                notebook.nbformat, notebook.nbformat_minor, SUPPORTED_NBFORMAT
            ),
        ));
    }

    let cells = notebook
        .cells
        .into_iter()
        .filter_map(|raw| match raw {
            RawCell::Code { source } => Some(Cell::code(source.into_text())),
            RawCell::Markdown {
                source,
                attachments,
            } => {
                let text = source.into_text();
                if attachments.is_none() && !text.contains(EMBEDDED_PAYLOAD_MARKER) {
                    Some(Cell::markdown(text))
                } else {
                    None
                }
            }
            RawCell::Other => None,
        })
        .collect();

    Ok(cells)
}

/// 列出文件夹中所有的 notebook 文件（按路径排序）
pub async fn find_notebooks(folder_path: &Path) -> Result<Vec<PathBuf>> {
    if !folder_path.exists() {
        anyhow::bail!("文件夹不存在: {}", folder_path.display());
    }

    let mut notebooks = Vec::new();
    let mut entries = fs::read_dir(folder_path)
        .await
        .with_context(|| format!("无法读取文件夹: {}", folder_path.display()))?;

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.extension().and_then(|s| s.to_str()) == Some("ipynb") {
            notebooks.push(path);
        }
    }

    notebooks.sort();
    info!(
        "在 {} 中找到 {} 个 notebook",
        folder_path.display(),
        notebooks.len()
    );

    Ok(notebooks)
}
