//! History Command Handlers

use std::sync::Arc;

use crate::application::commands::DeleteHistoryItem;
use crate::application::error::ApplicationError;
use crate::application::ports::HistoryStorePort;

/// DeleteHistoryItem Handler
///
/// 记录不存在时为空操作，返回 false
pub struct DeleteHistoryItemHandler {
    history: Arc<dyn HistoryStorePort>,
}

impl DeleteHistoryItemHandler {
    pub fn new(history: Arc<dyn HistoryStorePort>) -> Self {
        Self { history }
    }

    pub async fn handle(&self, command: DeleteHistoryItem) -> Result<bool, ApplicationError> {
        let removed = self.history.remove(command.id).await?;
        tracing::info!(id = %command.id, removed = removed, "Delete history item");
        Ok(removed)
    }
}
