//! Generation Engine Port - 文本 / 图片生成服务抽象
//!
//! 定义外部生成服务的抽象接口，具体实现在 infrastructure/adapters 层

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{AspectRatio, ChapterRequest, ChapterResponse, ImageHandle};

/// 生成服务错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Service error: {0}")]
    Service(String),

    /// 返回内容无法解析，或缺少必需字段
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    #[error("No image was returned")]
    NoImage,
}

/// Generation Engine Port
///
/// 两个阶段各对应一次调用：
/// - 文本阶段负责合成插图描述（画风、宽高比、插图主题都在这里拼入）
/// - 图片阶段只使用文本阶段返回的 image_prompt
#[async_trait]
pub trait GenerationEnginePort: Send + Sync {
    /// 生成章节正文、编辑点评和插图描述
    async fn generate_text(&self, request: &ChapterRequest)
        -> Result<ChapterResponse, GenerationError>;

    /// 根据插图描述生成图片
    async fn generate_image(
        &self,
        prompt: &str,
        aspect_ratio: AspectRatio,
    ) -> Result<ImageHandle, GenerationError>;

    /// 检查生成服务是否可用
    async fn health_check(&self) -> bool {
        true // 默认实现
    }
}
