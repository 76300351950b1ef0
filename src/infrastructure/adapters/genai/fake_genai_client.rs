//! Fake GenAI Client - 用于测试和离线运行的生成客户端
//!
//! 按脚本依次返回预置结果；脚本为空时根据请求生成固定内容。
//! 记录每次调用，便于测试断言。

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

use super::prompt::fallback_visual_description;
use crate::application::ports::{GenerationEnginePort, GenerationError};
use crate::domain::{AspectRatio, ChapterRequest, ChapterResponse, ImageHandle};

/// 1x1 像素 PNG
const PLACEHOLDER_PNG_BASE64: &str =
    "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mP8z8BQDwAEhQGAhKmMIQAAAABJRU5ErkJggg==";

/// Fake GenAI Client 配置
#[derive(Debug, Clone, Default)]
pub struct FakeGenAiClientConfig {
    /// 每次调用前的模拟延迟
    pub latency: Duration,
}

/// Fake GenAI Client
pub struct FakeGenAiClient {
    latency_ms: AtomicU64,
    text_script: Mutex<VecDeque<Result<ChapterResponse, GenerationError>>>,
    image_script: Mutex<VecDeque<Result<ImageHandle, GenerationError>>>,
    text_calls: Mutex<Vec<ChapterRequest>>,
    image_calls: Mutex<Vec<(String, AspectRatio)>>,
}

impl FakeGenAiClient {
    pub fn new(config: FakeGenAiClientConfig) -> Self {
        tracing::info!(latency_ms = config.latency.as_millis() as u64, "FakeGenAiClient initialized");
        Self {
            latency_ms: AtomicU64::new(config.latency.as_millis() as u64),
            text_script: Mutex::new(VecDeque::new()),
            image_script: Mutex::new(VecDeque::new()),
            text_calls: Mutex::new(Vec::new()),
            image_calls: Mutex::new(Vec::new()),
        }
    }

    /// 使用默认配置创建（无延迟）
    pub fn with_defaults() -> Self {
        Self::new(FakeGenAiClientConfig::default())
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn set_latency(&self, latency: Duration) {
        self.latency_ms
            .store(latency.as_millis() as u64, Ordering::Relaxed);
    }

    /// 预置下一次文本生成的结果
    pub async fn push_text(&self, result: Result<ChapterResponse, GenerationError>) {
        self.text_script.lock().await.push_back(result);
    }

    /// 预置下一次图片生成的结果
    pub async fn push_image(&self, result: Result<ImageHandle, GenerationError>) {
        self.image_script.lock().await.push_back(result);
    }

    pub async fn text_calls(&self) -> Vec<ChapterRequest> {
        self.text_calls.lock().await.clone()
    }

    pub async fn image_calls(&self) -> Vec<(String, AspectRatio)> {
        self.image_calls.lock().await.clone()
    }

    async fn simulate_latency(&self) {
        let ms = self.latency_ms.load(Ordering::Relaxed);
        if ms > 0 {
            tokio::time::sleep(Duration::from_millis(ms)).await;
        }
    }

    fn canned_chapter(request: &ChapterRequest) -> ChapterResponse {
        let content = format!(
            "The wind came down from the ridge before anyone saw the riders.\n\n\
             **{}** had been promised a quiet crossing. *Nothing about this road was quiet.*\n\n\
             {}",
            request.chapter_name.trim(),
            request.plot_summary.trim()
        );
        ChapterResponse::new(
            request.chapter_name.trim(),
            content,
            format!(
                "A {} opening with steady pacing. The closing beat could land harder.",
                request.writing_style.trim().to_lowercase()
            ),
            fallback_visual_description(request),
        )
    }
}

impl Default for FakeGenAiClient {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[async_trait]
impl GenerationEnginePort for FakeGenAiClient {
    async fn generate_text(
        &self,
        request: &ChapterRequest,
    ) -> Result<ChapterResponse, GenerationError> {
        self.text_calls.lock().await.push(request.clone());
        self.simulate_latency().await;

        let scripted = self.text_script.lock().await.pop_front();
        tracing::debug!(
            chapter_name = %request.chapter_name,
            scripted = scripted.is_some(),
            "FakeGenAiClient: returning chapter"
        );
        scripted.unwrap_or_else(|| Ok(Self::canned_chapter(request)))
    }

    async fn generate_image(
        &self,
        prompt: &str,
        aspect_ratio: AspectRatio,
    ) -> Result<ImageHandle, GenerationError> {
        self.image_calls
            .lock()
            .await
            .push((prompt.to_string(), aspect_ratio));
        self.simulate_latency().await;

        let scripted = self.image_script.lock().await.pop_front();
        tracing::debug!(aspect_ratio = %aspect_ratio, scripted = scripted.is_some(), "FakeGenAiClient: returning image");
        match scripted {
            Some(result) => result,
            None => ImageHandle::from_base64("image/png", PLACEHOLDER_PNG_BASE64)
                .map_err(|_| GenerationError::NoImage),
        }
    }

    async fn health_check(&self) -> bool {
        true
    }
}
