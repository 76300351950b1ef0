//! Document Exporter Port - 多格式导出
//!
//! 基于正文内容模型生成纯文本 / Markdown / DOCX / 打印页面，
//! 具体实现在 infrastructure/adapters/export

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{ChapterResponse, ImageHandle};

/// 导出错误
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Document build error: {0}")]
    Document(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image decode error: {0}")]
    ImageDecode(String),
}

/// 导出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Txt,
    #[serde(alias = "md")]
    Markdown,
    Docx,
    Print,
}

impl ExportFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "txt" | "text" => Some(Self::Txt),
            "md" | "markdown" => Some(Self::Markdown),
            "docx" => Some(Self::Docx),
            "print" | "pdf" => Some(Self::Print),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Txt => "txt",
            Self::Markdown => "md",
            Self::Docx => "docx",
            Self::Print => "html",
        }
    }

    pub fn media_type(&self) -> &'static str {
        match self {
            Self::Txt => "text/plain; charset=utf-8",
            Self::Markdown => "text/markdown; charset=utf-8",
            Self::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            Self::Print => "text/html; charset=utf-8",
        }
    }

    /// 打印页面直接展示，其余格式作为附件下载
    pub fn is_download(&self) -> bool {
        !matches!(self, Self::Print)
    }
}

/// 导出产物
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    pub filename: String,
    pub media_type: String,
    pub bytes: Vec<u8>,
    /// 是否作为附件下载（否则内联展示）
    pub attachment: bool,
}

impl ExportArtifact {
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// 由标题生成安全的文件名主体
///
/// 只保留字母（含带音标的拉丁字母及其他 Unicode 字母）、数字和空格，
/// 结果为空时使用 `untitled`
pub fn derive_filename(title: &str) -> String {
    let kept: String = title
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == ' ')
        .collect();
    let trimmed = kept.trim();
    if trimmed.is_empty() {
        "untitled".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Document Exporter Port
///
/// 导出是纯计算，不访问存储，也不影响生成状态
pub trait DocumentExporterPort: Send + Sync {
    /// 导出章节
    fn export(
        &self,
        format: ExportFormat,
        title: &str,
        content: &str,
    ) -> Result<ExportArtifact, ExportError>;

    /// 导出章节正文（便捷方法）
    fn export_chapter(
        &self,
        format: ExportFormat,
        chapter: &ChapterResponse,
    ) -> Result<ExportArtifact, ExportError> {
        self.export(format, chapter.title(), chapter.content())
    }

    /// 解码 data URI 插图，文件名为 `{标题}_Art.{扩展名}`
    fn export_image(&self, title: &str, image: &ImageHandle)
        -> Result<ExportArtifact, ExportError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_filename_drops_punctuation() {
        assert_eq!(derive_filename("Chapter 1: The Fall?"), "Chapter 1 The Fall");
        assert_eq!(derive_filename("  A Canção do Mar!  "), "A Canção do Mar");
    }

    #[test]
    fn test_derive_filename_fallback() {
        assert_eq!(derive_filename(""), "untitled");
        assert_eq!(derive_filename("?!:/"), "untitled");
    }

    #[test]
    fn test_export_format_parsing() {
        assert_eq!(ExportFormat::from_str("TXT"), Some(ExportFormat::Txt));
        assert_eq!(ExportFormat::from_str("md"), Some(ExportFormat::Markdown));
        assert_eq!(ExportFormat::from_str("docx"), Some(ExportFormat::Docx));
        assert_eq!(ExportFormat::from_str("print"), Some(ExportFormat::Print));
        assert_eq!(ExportFormat::from_str("rtf"), None);
        assert!(!ExportFormat::Print.is_download());
    }
}
