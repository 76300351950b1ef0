//! Defaults Query Handlers

use std::sync::Arc;

use crate::application::ports::DefaultsStorePort;
use crate::application::queries::LoadDefaults;
use crate::domain::ChapterRequest;

/// LoadDefaults Handler
///
/// 永远返回一个完整的请求：未保存或数据损坏时使用内置默认值
pub struct LoadDefaultsHandler {
    defaults: Arc<dyn DefaultsStorePort>,
}

impl LoadDefaultsHandler {
    pub fn new(defaults: Arc<dyn DefaultsStorePort>) -> Self {
        Self { defaults }
    }

    pub async fn handle(&self, _query: LoadDefaults) -> ChapterRequest {
        self.defaults.load_defaults().await
    }
}
