//! Quill - AI 辅助章节写作工作台
//!
//! 架构设计: DDD + CQRS + Hexagonal Architecture
//!
//! 领域层 (domain/):
//! - Chapter Context: 生成请求、生成结果、历史记录
//! - Manuscript: 正文的段落 / 强调模型
//!
//! 应用层 (application/):
//! - Ports: GenerationEngine, HistoryStore, DefaultsStore, DocumentExporter
//! - Orchestrator: 文本 → 插图两阶段生成状态机
//! - Commands / Queries: CQRS 处理器
//!
//! 基础设施层 (infrastructure/):
//! - HTTP: RESTful API + WebSocket
//! - Persistence: Sled 存储
//! - Adapters: Gemini / Fake 生成客户端, 导出引擎（txt / md / docx / print）
//! - Events: WebSocket 事件发布

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::{load_config, AppConfig};
