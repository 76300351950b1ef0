//! Generation Command Handlers

use std::sync::Arc;

use crate::application::commands::{RestoreHistoryItem, RetitleChapter, SubmitChapter};
use crate::application::error::ApplicationError;
use crate::application::orchestrator::{GenerationCycle, GenerationOrchestrator};
use crate::application::ports::HistoryStorePort;
use crate::domain::{GenerationResult, HistoryItem};

/// SubmitChapter Handler - 校验并占用生成槽位
///
/// 返回的周期由调用方决定在哪里运行（通常是后台任务）
pub struct SubmitChapterHandler {
    orchestrator: Arc<GenerationOrchestrator>,
}

impl SubmitChapterHandler {
    pub fn new(orchestrator: Arc<GenerationOrchestrator>) -> Self {
        Self { orchestrator }
    }

    pub fn handle(&self, command: SubmitChapter) -> Result<GenerationCycle, ApplicationError> {
        self.orchestrator.begin(command.request)
    }
}

/// RestoreHistoryItem Handler
pub struct RestoreHistoryItemHandler {
    history: Arc<dyn HistoryStorePort>,
    orchestrator: Arc<GenerationOrchestrator>,
}

impl RestoreHistoryItemHandler {
    pub fn new(history: Arc<dyn HistoryStorePort>, orchestrator: Arc<GenerationOrchestrator>) -> Self {
        Self {
            history,
            orchestrator,
        }
    }

    pub async fn handle(&self, command: RestoreHistoryItem) -> Result<HistoryItem, ApplicationError> {
        let item = self
            .history
            .get(command.id)
            .await
            .ok_or_else(|| ApplicationError::history_not_found(command.id))?;

        self.orchestrator.restore(&item)?;
        Ok(item)
    }
}

/// RetitleChapter Handler
pub struct RetitleChapterHandler {
    orchestrator: Arc<GenerationOrchestrator>,
}

impl RetitleChapterHandler {
    pub fn new(orchestrator: Arc<GenerationOrchestrator>) -> Self {
        Self { orchestrator }
    }

    pub fn handle(&self, command: RetitleChapter) -> Result<GenerationResult, ApplicationError> {
        let result = self.orchestrator.retitle(&command.title)?;
        tracing::info!(title = %command.title.trim(), "Chapter retitled");
        Ok(result)
    }
}
