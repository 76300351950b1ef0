//! Export Query Handlers

use std::sync::Arc;

use crate::application::error::ApplicationError;
use crate::application::orchestrator::GenerationOrchestrator;
use crate::application::ports::{DocumentExporterPort, ExportArtifact, HistoryStorePort};
use crate::application::queries::{ExportChapter, ExportImage, ExportSource};
use crate::domain::GenerationResult;

/// 按来源取出生成结果
async fn resolve_result(
    source: ExportSource,
    history: &dyn HistoryStorePort,
    orchestrator: &GenerationOrchestrator,
) -> Result<GenerationResult, ApplicationError> {
    match source {
        ExportSource::Live => Ok(orchestrator.snapshot().result),
        ExportSource::History(id) => history
            .get(id)
            .await
            .map(|item| item.result().clone())
            .ok_or_else(|| ApplicationError::history_not_found(id)),
    }
}

/// ExportChapter Handler
///
/// 只读操作，不影响生成状态和历史记录
pub struct ExportChapterHandler {
    history: Arc<dyn HistoryStorePort>,
    orchestrator: Arc<GenerationOrchestrator>,
    exporter: Arc<dyn DocumentExporterPort>,
}

impl ExportChapterHandler {
    pub fn new(
        history: Arc<dyn HistoryStorePort>,
        orchestrator: Arc<GenerationOrchestrator>,
        exporter: Arc<dyn DocumentExporterPort>,
    ) -> Self {
        Self {
            history,
            orchestrator,
            exporter,
        }
    }

    pub async fn handle(&self, query: ExportChapter) -> Result<ExportArtifact, ApplicationError> {
        let result = resolve_result(query.source, self.history.as_ref(), &self.orchestrator).await?;
        let chapter = result
            .text()
            .ok_or_else(|| ApplicationError::invalid_state("no chapter to export"))?;

        let artifact = self.exporter.export_chapter(query.format, chapter)?;
        tracing::info!(
            format = ?query.format,
            filename = %artifact.filename,
            size = artifact.len(),
            "Chapter export ready"
        );
        Ok(artifact)
    }
}

/// ExportImage Handler
pub struct ExportImageHandler {
    history: Arc<dyn HistoryStorePort>,
    orchestrator: Arc<GenerationOrchestrator>,
    exporter: Arc<dyn DocumentExporterPort>,
}

impl ExportImageHandler {
    pub fn new(
        history: Arc<dyn HistoryStorePort>,
        orchestrator: Arc<GenerationOrchestrator>,
        exporter: Arc<dyn DocumentExporterPort>,
    ) -> Self {
        Self {
            history,
            orchestrator,
            exporter,
        }
    }

    pub async fn handle(&self, query: ExportImage) -> Result<ExportArtifact, ApplicationError> {
        let result = resolve_result(query.source, self.history.as_ref(), &self.orchestrator).await?;
        let (Some(chapter), Some(image)) = (result.text(), result.image()) else {
            return Err(ApplicationError::invalid_state("no illustration to download"));
        };

        Ok(self.exporter.export_image(chapter.title(), image)?)
    }
}
