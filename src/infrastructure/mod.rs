//! Infrastructure Layer - 基础设施层
//!
//! 提供所有端口的具体实现

pub mod adapters;
pub mod events;
pub mod http;
pub mod persistence;

pub use adapters::{ChapterExporter, FakeGenAiClient, HttpGenAiClient, HttpGenAiClientConfig};
pub use events::{EventPublisher, WsEvent};
pub use persistence::{open_database, SledDefaultsStore, SledHistoryStore};
