//! 应用层 - 用例编排
//!
//! 包含：
//! - ports: 六边形架构端口定义（GenerationEngine、HistoryStore、DefaultsStore、DocumentExporter）
//! - orchestrator: 两阶段生成流程状态机
//! - commands: CQRS 命令及处理器
//! - queries: CQRS 查询及处理器
//! - error: 应用层错误定义

pub mod commands;
pub mod error;
pub mod orchestrator;
pub mod ports;
pub mod queries;

// Re-exports
pub use commands::{
    handlers::{
        DeleteHistoryItemHandler, RestoreHistoryItemHandler, RetitleChapterHandler,
        SaveDefaultsHandler, SubmitChapterHandler,
    },
    DeleteHistoryItem, RestoreHistoryItem, RetitleChapter, SaveDefaults, SubmitChapter,
};

pub use error::ApplicationError;

pub use orchestrator::{
    AppStatus, CycleOutcome, GenerationCycle, GenerationOrchestrator, GenerationSnapshot,
};

pub use ports::{
    derive_filename, DefaultsStorePort, DocumentExporterPort, ExportArtifact, ExportError,
    ExportFormat, GenerationEnginePort, GenerationError, HistoryStorePort, NavigationDirection,
    PersistenceError,
};

pub use queries::{
    handlers::{
        ChapterStats, ExportChapterHandler, ExportImageHandler, GetHistoryItemHandler,
        HistorySummary, ListHistoryHandler, LoadDefaultsHandler, NavigateHistoryHandler,
    },
    ExportChapter, ExportImage, ExportSource, GetHistoryItem, ListHistory, LoadDefaults,
    NavigateHistory,
};
