//! Chapter Context - Errors

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChapterError {
    #[error("必填字段不能为空: {0}")]
    MissingField(&'static str),

    #[error("无效的宽高比: {0}")]
    InvalidAspectRatio(String),

    #[error("无效的图片引用")]
    InvalidImageHandle,

    #[error("生成结果无效: 存在图片但缺少正文")]
    ImageWithoutText,

    #[error("历史记录只能保存完整的生成结果")]
    IncompleteResult,
}
