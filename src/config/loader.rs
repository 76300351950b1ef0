//! Configuration Loader
//!
//! 优先级（从高到低）：
//! 1. 环境变量
//! 2. 配置文件（config.toml / config.local.toml）
//! 3. 默认值

use config::{Config, ConfigError as ConfigCrateError, Environment, File};
use std::path::Path;
use thiserror::Error;

use super::types::{AppConfig, GenAiProvider};

/// 配置加载错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

impl From<ConfigCrateError> for ConfigError {
    fn from(err: ConfigCrateError) -> Self {
        ConfigError::LoadError(err.to_string())
    }
}

/// 配置文件搜索路径
const CONFIG_FILE_NAMES: &[&str] = &["config", "config.local"];

/// 环境变量前缀
const ENV_PREFIX: &str = "QUILL";

/// 加载应用配置
///
/// 环境变量使用 `QUILL_` 前缀、`__` 层级分隔符，例如：
/// - `QUILL_SERVER__PORT=8080`
/// - `QUILL_GENAI__PROVIDER=fake`
/// - `QUILL_GENAI__API_KEY=...`
/// - `QUILL_STORAGE__DB_PATH=/data/quill.sled`
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from_path(None)
}

/// 从指定路径加载配置，为 None 时搜索默认文件名
pub fn load_config_from_path(config_path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let defaults = AppConfig::default();
    let mut builder = Config::builder()
        .set_default("server.host", defaults.server.host.clone())?
        .set_default("server.port", defaults.server.port as i64)?
        .set_default("genai.provider", "gemini")?
        .set_default("genai.base_url", defaults.genai.base_url.clone())?
        .set_default("genai.text_model", defaults.genai.text_model.clone())?
        .set_default("genai.image_model", defaults.genai.image_model.clone())?
        .set_default("genai.timeout_secs", defaults.genai.timeout_secs as i64)?
        .set_default("genai.thinking_budget", defaults.genai.thinking_budget as i64)?
        .set_default(
            "storage.db_path",
            defaults.storage.db_path.to_string_lossy().to_string(),
        )?
        .set_default("log.level", defaults.log.level.clone())?
        .set_default("log.json", defaults.log.json)?;

    if let Some(path) = config_path {
        builder = builder.add_source(File::from(path).required(true));
    } else {
        for name in CONFIG_FILE_NAMES {
            builder = builder.add_source(File::with_name(name).required(false));
        }
    }

    // 环境变量名会被转换为小写
    builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );

    let app_config: AppConfig = builder.build()?.try_deserialize().map_err(|e| {
        ConfigError::ParseError(format!("Failed to deserialize config: {}", e))
    })?;

    validate_config(&app_config)?;

    Ok(app_config)
}

/// 验证配置有效性
pub fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "Server port cannot be 0".to_string(),
        ));
    }

    if config.storage.db_path.as_os_str().is_empty() {
        return Err(ConfigError::ValidationError(
            "Storage db_path cannot be empty".to_string(),
        ));
    }

    if config.genai.provider == GenAiProvider::Gemini {
        if config.genai.api_key.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "genai.api_key is required for the gemini provider (set QUILL_GENAI__API_KEY)"
                    .to_string(),
            ));
        }
        if config.genai.base_url.is_empty() {
            return Err(ConfigError::ValidationError(
                "genai.base_url cannot be empty".to_string(),
            ));
        }
    }

    if config.genai.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "genai.timeout_secs cannot be 0".to_string(),
        ));
    }

    Ok(())
}

/// 打印配置信息（用于启动时日志），不输出 API Key
pub fn print_config(config: &AppConfig) {
    tracing::info!("=== Application Configuration ===");
    tracing::info!("Server: {}", config.server.addr());
    if let Some(dir) = &config.server.static_dir {
        tracing::info!("Static UI: {}", dir.display());
    }
    tracing::info!("GenAI Provider: {:?}", config.genai.provider);
    if config.genai.provider == GenAiProvider::Gemini {
        tracing::info!("GenAI Base URL: {}", config.genai.base_url);
        tracing::info!("Text Model: {}", config.genai.text_model);
        tracing::info!("Image Model: {}", config.genai.image_model);
        tracing::info!("GenAI Timeout: {}s", config.genai.timeout_secs);
    }
    tracing::info!("Database: {}", config.storage.db_path.display());
    tracing::info!("Log Level: {} (json: {})", config.log.level, config.log.json);
    tracing::info!("=================================");
}
