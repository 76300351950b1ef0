//! History Commands

use crate::domain::HistoryId;

/// 删除历史记录命令
#[derive(Debug, Clone)]
pub struct DeleteHistoryItem {
    pub id: HistoryId,
}
