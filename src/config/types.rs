//! Configuration Types
//!
//! 定义所有配置结构体

use serde::Deserialize;
use std::path::PathBuf;

/// 应用主配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// 服务器配置
    #[serde(default)]
    pub server: ServerConfig,

    /// 生成服务配置
    #[serde(default)]
    pub genai: GenAiConfig,

    /// 存储配置
    #[serde(default)]
    pub storage: StorageConfig,

    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
}

/// 服务器配置
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// 监听地址
    #[serde(default = "default_host")]
    pub host: String,

    /// 监听端口
    #[serde(default = "default_port")]
    pub port: u16,

    /// 前端静态文件目录（可选，挂载在 `/`）
    #[serde(default)]
    pub static_dir: Option<PathBuf>,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5070
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            static_dir: None,
        }
    }
}

impl ServerConfig {
    /// 获取服务器地址
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// 生成服务提供方
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenAiProvider {
    /// Gemini REST API（文本 + Imagen 插图）
    #[default]
    Gemini,
    /// 本地假实现，不访问网络
    Fake,
}

/// 生成服务配置
#[derive(Debug, Clone, Deserialize)]
pub struct GenAiConfig {
    #[serde(default)]
    pub provider: GenAiProvider,

    /// API 基础 URL
    #[serde(default = "default_genai_base_url")]
    pub base_url: String,

    /// API Key，provider 为 gemini 时必填
    #[serde(default)]
    pub api_key: String,

    /// 文本模型
    #[serde(default = "default_text_model")]
    pub text_model: String,

    /// 插图模型
    #[serde(default = "default_image_model")]
    pub image_model: String,

    /// 单次请求超时（秒）
    #[serde(default = "default_genai_timeout")]
    pub timeout_secs: u64,

    /// 文本阶段的思考预算（token）
    #[serde(default = "default_thinking_budget")]
    pub thinking_budget: u32,
}

fn default_genai_base_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_text_model() -> String {
    "gemini-3-pro-preview".to_string()
}

fn default_image_model() -> String {
    "imagen-4.0-generate-001".to_string()
}

fn default_genai_timeout() -> u64 {
    180
}

fn default_thinking_budget() -> u32 {
    4096
}

impl Default for GenAiConfig {
    fn default() -> Self {
        Self {
            provider: GenAiProvider::default(),
            base_url: default_genai_base_url(),
            api_key: String::new(),
            text_model: default_text_model(),
            image_model: default_image_model(),
            timeout_secs: default_genai_timeout(),
            thinking_budget: default_thinking_budget(),
        }
    }
}

/// 存储配置
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Sled 数据库目录（历史记录 + 默认参数）
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("data/quill.sled")
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
        }
    }
}

/// 日志配置
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub level: String,

    /// 是否启用 JSON 格式
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.addr(), "127.0.0.1:5070");
        assert_eq!(config.genai.provider, GenAiProvider::Gemini);
        assert_eq!(config.genai.thinking_budget, 4096);
        assert_eq!(config.storage.db_path, PathBuf::from("data/quill.sled"));
        assert!(!config.log.json);
    }

    #[test]
    fn test_partial_sections_fill_defaults() {
        let config: AppConfig = serde_json::from_value(serde_json::json!({
            "genai": { "provider": "fake" },
            "server": { "port": 9000 }
        }))
        .unwrap();

        assert_eq!(config.genai.provider, GenAiProvider::Fake);
        assert_eq!(config.genai.timeout_secs, 180);
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "127.0.0.1");
    }
}
