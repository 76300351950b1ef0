//! Chapter Context - Entities

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{ChapterError, ChapterRequest, ChapterResponse, ImageHandle};

/// 历史记录唯一标识
///
/// UUIDv7：按创建时间有序，同一毫秒内由随机位保证唯一
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HistoryId(Uuid);

impl HistoryId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for HistoryId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for HistoryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 一次生成周期的结果
///
/// 合法状态只有三种：空、仅正文、正文 + 图片。
/// 没有构造"有图片无正文"的途径，反序列化同样会拒绝。
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "GenerationResultRecord", into = "GenerationResultRecord")]
pub struct GenerationResult {
    text: Option<ChapterResponse>,
    image: Option<ImageHandle>,
}

impl GenerationResult {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn text_only(text: ChapterResponse) -> Self {
        Self {
            text: Some(text),
            image: None,
        }
    }

    pub fn complete(text: ChapterResponse, image: ImageHandle) -> Self {
        Self {
            text: Some(text),
            image: Some(image),
        }
    }

    pub fn text(&self) -> Option<&ChapterResponse> {
        self.text.as_ref()
    }

    pub fn image(&self) -> Option<&ImageHandle> {
        self.image.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_none()
    }

    pub fn is_complete(&self) -> bool {
        self.text.is_some() && self.image.is_some()
    }

    /// 替换正文标题，图片保持不变
    pub fn retitled(&self, title: &str) -> Option<Self> {
        let text = self.text.as_ref()?.with_title(title);
        Some(Self {
            text: Some(text),
            image: self.image.clone(),
        })
    }
}

/// 持久化格式
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerationResultRecord {
    #[serde(default)]
    text_data: Option<ChapterResponse>,
    #[serde(default)]
    image_url: Option<ImageHandle>,
}

impl TryFrom<GenerationResultRecord> for GenerationResult {
    type Error = ChapterError;

    fn try_from(record: GenerationResultRecord) -> Result<Self, Self::Error> {
        match (record.text_data, record.image_url) {
            (None, Some(_)) => Err(ChapterError::ImageWithoutText),
            (text, image) => Ok(Self { text, image }),
        }
    }
}

impl From<GenerationResult> for GenerationResultRecord {
    fn from(result: GenerationResult) -> Self {
        Self {
            text_data: result.text,
            image_url: result.image,
        }
    }
}

/// 历史记录
///
/// 不变量:
/// - 只保存完整的生成结果（正文 + 图片）
/// - 创建后 request / result 不再修改
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "HistoryItemRecord")]
pub struct HistoryItem {
    id: HistoryId,
    timestamp: DateTime<Utc>,
    request: ChapterRequest,
    result: GenerationResult,
}

impl HistoryItem {
    pub fn new(request: ChapterRequest, result: GenerationResult) -> Result<Self, ChapterError> {
        Self::with_timestamp(request, result, Utc::now())
    }

    pub fn with_timestamp(
        request: ChapterRequest,
        result: GenerationResult,
        timestamp: DateTime<Utc>,
    ) -> Result<Self, ChapterError> {
        if !result.is_complete() {
            return Err(ChapterError::IncompleteResult);
        }
        Ok(Self {
            id: HistoryId::new(),
            timestamp,
            request,
            result,
        })
    }

    pub fn id(&self) -> HistoryId {
        self.id
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn request(&self) -> &ChapterRequest {
        &self.request
    }

    pub fn result(&self) -> &GenerationResult {
        &self.result
    }

    /// 章节标题（完整结果必有正文）
    pub fn title(&self) -> &str {
        self.result
            .text()
            .map(|t| t.title())
            .unwrap_or(self.request.chapter_name.as_str())
    }
}

/// 持久化格式，从存储介质加载的数据也要满足不变量
#[derive(Deserialize)]
struct HistoryItemRecord {
    id: HistoryId,
    timestamp: DateTime<Utc>,
    request: ChapterRequest,
    result: GenerationResult,
}

impl TryFrom<HistoryItemRecord> for HistoryItem {
    type Error = ChapterError;

    fn try_from(record: HistoryItemRecord) -> Result<Self, Self::Error> {
        if !record.result.is_complete() {
            return Err(ChapterError::IncompleteResult);
        }
        Ok(Self {
            id: record.id,
            timestamp: record.timestamp,
            request: record.request,
            result: record.result,
        })
    }
}
