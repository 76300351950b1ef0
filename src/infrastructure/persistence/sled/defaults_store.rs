//! Sled-based Defaults Store Implementation

use std::sync::Arc;

use async_trait::async_trait;
use sled::Db;

use super::{write_json, DEFAULTS_KEY};
use crate::application::ports::{DefaultsStorePort, PersistenceError};
use crate::domain::ChapterRequest;

/// Sled 默认参数存储
pub struct SledDefaultsStore {
    db: Db,
}

impl SledDefaultsStore {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }
}

#[async_trait]
impl DefaultsStorePort for SledDefaultsStore {
    async fn load_defaults(&self) -> ChapterRequest {
        let bytes = match self.db.get(DEFAULTS_KEY) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return ChapterRequest::default(),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read saved defaults");
                return ChapterRequest::default();
            }
        };

        // 缺失字段由 ChapterRequest 的 serde(default) 补齐
        serde_json::from_slice(&bytes).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Corrupt saved defaults, using built-in values");
            ChapterRequest::default()
        })
    }

    async fn save_defaults(&self, request: &ChapterRequest) -> Result<(), PersistenceError> {
        write_json(&self.db, DEFAULTS_KEY, request)?;
        tracing::info!(book_title = %request.book_title, "Saved form defaults");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::temporary_database;
    use super::*;
    use crate::domain::{AspectRatio, DEFAULT_ART_STYLE, DEFAULT_LENGTH_CONSTRAINT};

    #[tokio::test]
    async fn test_missing_defaults_are_builtin() {
        let store = SledDefaultsStore::new(temporary_database().unwrap());
        assert_eq!(store.load_defaults().await, ChapterRequest::default());
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let store = SledDefaultsStore::new(temporary_database().unwrap());
        let request = ChapterRequest {
            book_title: "The Salt Road".to_string(),
            genre: "Fantasy".to_string(),
            image_aspect_ratio: AspectRatio::Square,
            ..ChapterRequest::default()
        };
        store.save_defaults(&request).await.unwrap();
        assert_eq!(store.load_defaults().await, request);
    }

    #[tokio::test]
    async fn test_partial_payload_merges_with_builtin_defaults() {
        let db = temporary_database().unwrap();
        db.insert(DEFAULTS_KEY, br#"{"genre":"Noir","imageAspectRatio":"3:4"}"#.to_vec())
            .unwrap();
        let store = SledDefaultsStore::new(db);

        let loaded = store.load_defaults().await;
        assert_eq!(loaded.genre, "Noir");
        assert_eq!(loaded.image_aspect_ratio, AspectRatio::PortraitTall);
        assert_eq!(loaded.length_constraint, DEFAULT_LENGTH_CONSTRAINT);
        assert_eq!(loaded.image_art_style, DEFAULT_ART_STYLE);
    }

    #[tokio::test]
    async fn test_corrupt_payload_falls_back() {
        let db = temporary_database().unwrap();
        db.insert(DEFAULTS_KEY, b"[1, 2".to_vec()).unwrap();
        let store = SledDefaultsStore::new(db);
        assert_eq!(store.load_defaults().await, ChapterRequest::default());
    }
}
