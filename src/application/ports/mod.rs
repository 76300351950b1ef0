//! Application Ports - 出站端口定义
//!
//! 定义应用层与基础设施层的抽象接口

mod document_exporter;
mod generation_engine;
mod history_store;

pub use document_exporter::{
    derive_filename, DocumentExporterPort, ExportArtifact, ExportError, ExportFormat,
};
pub use generation_engine::{GenerationEnginePort, GenerationError};
pub use history_store::{
    DefaultsStorePort, HistoryStorePort, NavigationDirection, PersistenceError,
};
