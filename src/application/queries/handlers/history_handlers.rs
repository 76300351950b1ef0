//! History Query Handlers

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::application::error::ApplicationError;
use crate::application::ports::HistoryStorePort;
use crate::application::queries::{GetHistoryItem, ListHistory, NavigateHistory};
use crate::domain::manuscript::Manuscript;
use crate::domain::{ChapterResponse, HistoryId, HistoryItem};

// ============================================================================
// Response DTOs
// ============================================================================

/// 阅读统计
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterStats {
    pub word_count: usize,
    pub reading_minutes: usize,
}

impl ChapterStats {
    pub fn of(chapter: &ChapterResponse) -> Self {
        let manuscript = Manuscript::parse(chapter.content());
        Self {
            word_count: manuscript.word_count(),
            reading_minutes: manuscript.reading_minutes(),
        }
    }
}

/// 历史列表条目
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistorySummary {
    pub id: HistoryId,
    pub timestamp: DateTime<Utc>,
    pub title: String,
    pub book_title: String,
    pub genre: String,
    #[serde(flatten)]
    pub stats: ChapterStats,
}

impl From<&HistoryItem> for HistorySummary {
    fn from(item: &HistoryItem) -> Self {
        let stats = item
            .result()
            .text()
            .map(ChapterStats::of)
            .unwrap_or(ChapterStats {
                word_count: 0,
                reading_minutes: 0,
            });
        Self {
            id: item.id(),
            timestamp: item.timestamp(),
            title: item.title().to_string(),
            book_title: item.request().book_title.clone(),
            genre: item.request().genre.clone(),
            stats,
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// ListHistory Handler
pub struct ListHistoryHandler {
    history: Arc<dyn HistoryStorePort>,
}

impl ListHistoryHandler {
    pub fn new(history: Arc<dyn HistoryStorePort>) -> Self {
        Self { history }
    }

    pub async fn handle(&self, _query: ListHistory) -> Vec<HistorySummary> {
        self.history
            .list()
            .await
            .iter()
            .map(HistorySummary::from)
            .collect()
    }
}

/// GetHistoryItem Handler
pub struct GetHistoryItemHandler {
    history: Arc<dyn HistoryStorePort>,
}

impl GetHistoryItemHandler {
    pub fn new(history: Arc<dyn HistoryStorePort>) -> Self {
        Self { history }
    }

    pub async fn handle(&self, query: GetHistoryItem) -> Result<HistoryItem, ApplicationError> {
        self.history
            .get(query.id)
            .await
            .ok_or_else(|| ApplicationError::history_not_found(query.id))
    }
}

/// NavigateHistory Handler
///
/// 起点不存在时报错；已到列表两端时返回 None
pub struct NavigateHistoryHandler {
    history: Arc<dyn HistoryStorePort>,
}

impl NavigateHistoryHandler {
    pub fn new(history: Arc<dyn HistoryStorePort>) -> Self {
        Self { history }
    }

    pub async fn handle(
        &self,
        query: NavigateHistory,
    ) -> Result<Option<HistoryItem>, ApplicationError> {
        if self.history.get(query.id).await.is_none() {
            return Err(ApplicationError::history_not_found(query.id));
        }
        Ok(self.history.neighbor(query.id, query.direction).await)
    }
}
