//! Data Transfer Objects

use serde::{Deserialize, Serialize};

use crate::application::{ChapterStats, GenerationSnapshot, NavigationDirection};
use crate::domain::{ChapterRequest, HistoryId, HistoryItem};

// ============================================================================
// 统一响应结构
// ============================================================================

/// 统一 API 响应格式
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub errno: i32,
    pub error: String,
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    /// 成功响应
    pub fn success(data: T) -> Self {
        Self {
            errno: 0,
            error: String::new(),
            data: Some(data),
        }
    }
}

/// 空数据响应
#[derive(Debug, Serialize)]
pub struct Empty {}

impl ApiResponse<Empty> {
    /// 成功但无数据
    pub fn ok() -> Self {
        Self::success(Empty {})
    }
}

// ============================================================================
// Generation DTOs
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct RetitleRequest {
    pub title: String,
}

/// 提交后立即返回，进度通过 /ws/status 推送
#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub cycle: u64,
    pub status: String,
}

/// 当前快照 + 阅读统计
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    #[serde(flatten)]
    pub snapshot: GenerationSnapshot,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<ChapterStats>,
}

impl From<GenerationSnapshot> for StatusResponse {
    fn from(snapshot: GenerationSnapshot) -> Self {
        let stats = snapshot.result.text().map(ChapterStats::of);
        Self { snapshot, stats }
    }
}

// ============================================================================
// History DTOs
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct IdRequest {
    pub id: HistoryId,
}

#[derive(Debug, Deserialize)]
pub struct NavigateRequest {
    pub id: HistoryId,
    pub direction: NavigationDirection,
}

#[derive(Debug, Serialize)]
pub struct HistoryItemResponse {
    #[serde(flatten)]
    pub item: HistoryItem,
    pub stats: Option<ChapterStats>,
}

impl From<HistoryItem> for HistoryItemResponse {
    fn from(item: HistoryItem) -> Self {
        let stats = item.result().text().map(ChapterStats::of);
        Self { item, stats }
    }
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub id: HistoryId,
    pub removed: bool,
}

/// 导航结果，已到列表两端时 item 为空
#[derive(Debug, Serialize)]
pub struct NavigateResponse {
    pub item: Option<HistoryItemResponse>,
}

// ============================================================================
// Defaults / Provider DTOs
// ============================================================================

#[derive(Debug, Serialize)]
pub struct DefaultsResponse {
    pub request: ChapterRequest,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub healthy: bool,
}
