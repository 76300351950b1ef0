//! Sled-based History Store Implementation

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use sled::Db;
use tokio::sync::RwLock;

use super::{write_json, HISTORY_KEY};
use crate::application::ports::{HistoryStorePort, PersistenceError};
use crate::domain::{HistoryId, HistoryItem};

/// Sled 历史记录存储
///
/// 每次修改先在列表副本上进行，写回并刷盘成功后才替换内存中的列表，
/// 内存与介质始终一致。写锁在写盘期间保持持有，保证单写者。
pub struct SledHistoryStore {
    db: Db,
    items: RwLock<VecDeque<HistoryItem>>,
    #[cfg(test)]
    fail_writes: std::sync::atomic::AtomicBool,
}

impl SledHistoryStore {
    /// 从数据库加载历史记录
    ///
    /// 数据不可读或损坏时以空列表启动，不会失败
    pub fn new(db: Db) -> Self {
        let items = Self::load(&db);
        tracing::info!(count = items.len(), "SledHistoryStore initialized");
        Self {
            db,
            items: RwLock::new(items),
            #[cfg(test)]
            fail_writes: std::sync::atomic::AtomicBool::new(false),
        }
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    fn load(db: &Db) -> VecDeque<HistoryItem> {
        let bytes = match db.get(HISTORY_KEY) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return VecDeque::new(),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read history, starting empty");
                return VecDeque::new();
            }
        };

        let raw: Vec<serde_json::Value> = match serde_json::from_slice(&bytes) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(error = %e, "Corrupt history payload, starting empty");
                return VecDeque::new();
            }
        };

        let total = raw.len();
        let items: VecDeque<HistoryItem> = raw
            .into_iter()
            .filter_map(|value| serde_json::from_value::<HistoryItem>(value).ok())
            .collect();

        if items.len() < total {
            tracing::warn!(
                total = total,
                kept = items.len(),
                "Dropped unreadable history items"
            );
        }
        items
    }

    fn persist(&self, items: &VecDeque<HistoryItem>) -> Result<(), PersistenceError> {
        #[cfg(test)]
        if self.fail_writes.load(std::sync::atomic::Ordering::SeqCst) {
            return Err(PersistenceError::DatabaseError("disk full".to_string()));
        }
        write_json(&self.db, HISTORY_KEY, items)
    }

    #[cfg(test)]
    fn set_fail_writes(&self, fail: bool) {
        self.fail_writes
            .store(fail, std::sync::atomic::Ordering::SeqCst);
    }
}

#[async_trait]
impl HistoryStorePort for SledHistoryStore {
    async fn add(&self, item: HistoryItem) -> Result<(), PersistenceError> {
        let mut items = self.items.write().await;
        tracing::debug!(id = %item.id(), title = %item.title(), "Adding history item");
        let mut next = items.clone();
        next.push_front(item);
        self.persist(&next)?;
        *items = next;
        Ok(())
    }

    async fn remove(&self, id: HistoryId) -> Result<bool, PersistenceError> {
        let mut items = self.items.write().await;
        let Some(pos) = items.iter().position(|item| item.id() == id) else {
            return Ok(false);
        };
        let mut next = items.clone();
        next.remove(pos);
        self.persist(&next)?;
        *items = next;
        tracing::debug!(id = %id, "Removed history item");
        Ok(true)
    }

    async fn list(&self) -> Vec<HistoryItem> {
        self.items.read().await.iter().cloned().collect()
    }

    async fn get(&self, id: HistoryId) -> Option<HistoryItem> {
        self.items
            .read()
            .await
            .iter()
            .find(|item| item.id() == id)
            .cloned()
    }

    async fn len(&self) -> usize {
        self.items.read().await.len()
    }
}
