//! Defaults Command Handlers

use std::sync::Arc;

use crate::application::commands::SaveDefaults;
use crate::application::error::ApplicationError;
use crate::application::ports::DefaultsStorePort;

/// SaveDefaults Handler
///
/// 默认参数允许不完整（只用于预填表单），因此不做必填校验
pub struct SaveDefaultsHandler {
    defaults: Arc<dyn DefaultsStorePort>,
}

impl SaveDefaultsHandler {
    pub fn new(defaults: Arc<dyn DefaultsStorePort>) -> Self {
        Self { defaults }
    }

    pub async fn handle(&self, command: SaveDefaults) -> Result<(), ApplicationError> {
        self.defaults.save_defaults(&command.request).await?;
        Ok(())
    }
}
