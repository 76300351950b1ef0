//! Domain Layer - 领域层
//!
//! 包含:
//! - Chapter Context: 生成请求、生成结果、历史记录
//! - Manuscript: 正文内容模型（受限 Markdown 解析）

pub mod chapter;

// 共享的正文内容模型
pub mod manuscript;

pub use chapter::{
    AspectRatio, ChapterError, ChapterRequest, ChapterResponse, GenerationResult, HistoryId,
    HistoryItem, ImageHandle, DEFAULT_ART_STYLE, DEFAULT_LENGTH_CONSTRAINT, DEFAULT_WRITING_STYLE,
};
pub use manuscript::{Block, Manuscript, Span, SpanStyle};
