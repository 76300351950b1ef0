//! Chapter Context - 章节生成限界上下文
//!
//! 职责:
//! - 生成请求 / 文本结果 / 图片引用值对象
//! - 生成结果与历史记录实体

mod entities;
mod errors;
mod value_objects;

pub use entities::{GenerationResult, HistoryId, HistoryItem};
pub use errors::ChapterError;
pub use value_objects::{
    AspectRatio, ChapterRequest, ChapterResponse, ImageHandle, DEFAULT_ART_STYLE,
    DEFAULT_LENGTH_CONSTRAINT, DEFAULT_WRITING_STYLE,
};
