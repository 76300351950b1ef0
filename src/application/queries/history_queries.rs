//! History Queries

use crate::application::ports::NavigationDirection;
use crate::domain::HistoryId;

/// 列出全部历史记录（最新在前）
#[derive(Debug, Clone)]
pub struct ListHistory;

/// 获取单条历史记录
#[derive(Debug, Clone)]
pub struct GetHistoryItem {
    pub id: HistoryId,
}

/// 获取相邻的历史记录
#[derive(Debug, Clone)]
pub struct NavigateHistory {
    pub id: HistoryId,
    pub direction: NavigationDirection,
}
