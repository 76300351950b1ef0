//! Application State
//!
//! 包含所有 Command/Query Handlers 的应用状态

use std::sync::Arc;

use crate::application::{
    // Command handlers
    DeleteHistoryItemHandler, RestoreHistoryItemHandler, RetitleChapterHandler,
    SaveDefaultsHandler, SubmitChapterHandler,
    // Query handlers
    ExportChapterHandler, ExportImageHandler, GetHistoryItemHandler, ListHistoryHandler,
    LoadDefaultsHandler, NavigateHistoryHandler,
    // Ports
    DefaultsStorePort, DocumentExporterPort, GenerationEnginePort, GenerationOrchestrator,
    HistoryStorePort,
};
use crate::infrastructure::events::EventPublisher;

/// 应用状态
///
/// 单用户：所有请求共享同一个编排器和同一份历史记录
pub struct AppState {
    // ========== Ports ==========
    pub engine: Arc<dyn GenerationEnginePort>,
    pub history: Arc<dyn HistoryStorePort>,
    pub defaults: Arc<dyn DefaultsStorePort>,
    pub exporter: Arc<dyn DocumentExporterPort>,
    pub orchestrator: Arc<GenerationOrchestrator>,
    pub event_publisher: Arc<EventPublisher>,

    // ========== Command Handlers ==========
    pub submit_chapter_handler: SubmitChapterHandler,
    pub restore_history_item_handler: RestoreHistoryItemHandler,
    pub retitle_chapter_handler: RetitleChapterHandler,
    pub delete_history_item_handler: DeleteHistoryItemHandler,
    pub save_defaults_handler: SaveDefaultsHandler,

    // ========== Query Handlers ==========
    pub list_history_handler: ListHistoryHandler,
    pub get_history_item_handler: GetHistoryItemHandler,
    pub navigate_history_handler: NavigateHistoryHandler,
    pub export_chapter_handler: ExportChapterHandler,
    pub export_image_handler: ExportImageHandler,
    pub load_defaults_handler: LoadDefaultsHandler,
}

impl AppState {
    /// 创建应用状态，编排器由引擎和历史记录组装
    pub fn new(
        engine: Arc<dyn GenerationEnginePort>,
        history: Arc<dyn HistoryStorePort>,
        defaults: Arc<dyn DefaultsStorePort>,
        exporter: Arc<dyn DocumentExporterPort>,
        event_publisher: Arc<EventPublisher>,
    ) -> Self {
        let orchestrator = GenerationOrchestrator::new(engine.clone(), history.clone()).arc();

        Self {
            // Command handlers
            submit_chapter_handler: SubmitChapterHandler::new(orchestrator.clone()),
            restore_history_item_handler: RestoreHistoryItemHandler::new(
                history.clone(),
                orchestrator.clone(),
            ),
            retitle_chapter_handler: RetitleChapterHandler::new(orchestrator.clone()),
            delete_history_item_handler: DeleteHistoryItemHandler::new(history.clone()),
            save_defaults_handler: SaveDefaultsHandler::new(defaults.clone()),

            // Query handlers
            list_history_handler: ListHistoryHandler::new(history.clone()),
            get_history_item_handler: GetHistoryItemHandler::new(history.clone()),
            navigate_history_handler: NavigateHistoryHandler::new(history.clone()),
            export_chapter_handler: ExportChapterHandler::new(
                history.clone(),
                orchestrator.clone(),
                exporter.clone(),
            ),
            export_image_handler: ExportImageHandler::new(
                history.clone(),
                orchestrator.clone(),
                exporter.clone(),
            ),
            load_defaults_handler: LoadDefaultsHandler::new(defaults.clone()),

            // Ports
            engine,
            history,
            defaults,
            exporter,
            orchestrator,
            event_publisher,
        }
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }
}
