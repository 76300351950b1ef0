//! History Store Port - 历史记录存储
//!
//! 定义历史记录与默认参数的持久化接口，具体实现使用 Sled

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{ChapterRequest, HistoryId, HistoryItem};

/// 持久化错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PersistenceError {
    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<serde_json::Error> for PersistenceError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError(err.to_string())
    }
}

/// 历史导航方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NavigationDirection {
    /// 更新的一条（列表中靠前）
    Prev,
    /// 更早的一条（列表中靠后）
    Next,
}

/// History Store Port
///
/// 列表顺序为插入顺序，最新在前。
/// 每次修改都会同步写入并刷盘；写入失败时修改整体作废，
/// 存储保持上一次成功操作后的内容，错误返回给调用方自行决定如何提示。
#[async_trait]
pub trait HistoryStorePort: Send + Sync {
    /// 插入到列表头部
    async fn add(&self, item: HistoryItem) -> Result<(), PersistenceError>;

    /// 删除记录，不存在时为空操作；返回是否删除了记录
    async fn remove(&self, id: HistoryId) -> Result<bool, PersistenceError>;

    /// 最新在前的快照
    async fn list(&self) -> Vec<HistoryItem>;

    async fn get(&self, id: HistoryId) -> Option<HistoryItem>;

    /// 相邻记录
    async fn neighbor(&self, id: HistoryId, direction: NavigationDirection) -> Option<HistoryItem> {
        let items = self.list().await;
        let pos = items.iter().position(|item| item.id() == id)?;
        let target = match direction {
            NavigationDirection::Prev => pos.checked_sub(1)?,
            NavigationDirection::Next => pos + 1,
        };
        items.into_iter().nth(target)
    }

    async fn len(&self) -> usize {
        self.list().await.len()
    }
}

/// Defaults Store Port
///
/// 表单默认参数。加载时缺失的字段取内置默认值，数据损坏时回退到内置默认值
#[async_trait]
pub trait DefaultsStorePort: Send + Sync {
    async fn load_defaults(&self) -> ChapterRequest;

    async fn save_defaults(&self, request: &ChapterRequest) -> Result<(), PersistenceError>;
}
