//! 应用层错误定义
//!
//! 统一的命令/查询错误类型

use thiserror::Error;

use crate::application::ports::{ExportError, GenerationError, PersistenceError};
use crate::domain::{ChapterError, HistoryId};

/// 应用层错误
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// 资源未找到
    #[error("{resource_type} not found: {id}")]
    NotFound {
        resource_type: &'static str,
        id: String,
    },

    /// 验证错误
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// 已有生成任务在进行中
    #[error("A generation cycle is already running")]
    Busy,

    /// 状态无效
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// 生成服务错误
    #[error("Generation error: {0}")]
    GenerationError(#[from] GenerationError),

    /// 导出错误
    #[error("Export error: {0}")]
    ExportError(#[from] ExportError),

    /// 持久化错误
    #[error("Persistence error: {0}")]
    PersistenceError(#[from] PersistenceError),

    /// 内部错误
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl ApplicationError {
    /// 创建 NotFound 错误
    pub fn not_found(resource_type: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            resource_type,
            id: id.to_string(),
        }
    }

    /// 历史记录未找到
    pub fn history_not_found(id: HistoryId) -> Self {
        Self::not_found("History item", id)
    }

    /// 创建验证错误
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError(message.into())
    }

    /// 创建状态无效错误
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState(message.into())
    }

    /// 创建内部错误
    pub fn internal(message: impl Into<String>) -> Self {
        Self::InternalError(message.into())
    }
}

impl From<ChapterError> for ApplicationError {
    fn from(err: ChapterError) -> Self {
        Self::ValidationError(err.to_string())
    }
}
