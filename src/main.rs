//! Quill - AI 辅助章节写作工作台

use std::sync::Arc;

use quill::application::{DocumentExporterPort, GenerationEnginePort};
use quill::config::{load_config, print_config, AppConfig, GenAiProvider};
use quill::infrastructure::adapters::{
    ChapterExporter, FakeGenAiClient, HttpGenAiClient, HttpGenAiClientConfig,
};
use quill::infrastructure::events::EventPublisher;
use quill::infrastructure::http::{AppState, HttpServer, ServerConfig};
use quill::infrastructure::persistence::{open_database, SledDefaultsStore, SledHistoryStore};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 加载配置（优先级：环境变量 > 配置文件 > 默认值）
    let config = load_config().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    init_tracing(&config);

    tracing::info!("Quill - AI 辅助章节写作工作台");
    print_config(&config);

    // 历史记录和默认参数共用一个 Sled 数据库
    let db = open_database(&config.storage.db_path)?;
    let history = SledHistoryStore::new(db.clone()).arc();
    let defaults = SledDefaultsStore::new(db).arc();

    let engine = create_engine(&config)?;
    let exporter: Arc<dyn DocumentExporterPort> = Arc::new(ChapterExporter::new());
    let event_publisher = EventPublisher::new().arc();

    let state = AppState::new(engine, history, defaults, exporter, event_publisher).arc();

    let mut server_config = ServerConfig::new(&config.server.host, config.server.port);
    if let Some(dir) = &config.server.static_dir {
        server_config = server_config.with_static_dir(dir);
    }
    let server = HttpServer::new(server_config, state);

    server
        .run_with_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for ctrl-c");
                return;
            }
            tracing::info!("Received shutdown signal");
        })
        .await?;

    tracing::info!("Server shutdown complete");

    Ok(())
}

/// 初始化日志，RUST_LOG 优先于配置文件
fn init_tracing(config: &AppConfig) {
    let log_filter = format!(
        "{},quill={},tower_http=debug",
        config.log.level, config.log.level
    );
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_filter));

    if config.log.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

/// 按配置选择生成服务
fn create_engine(config: &AppConfig) -> anyhow::Result<Arc<dyn GenerationEnginePort>> {
    let engine: Arc<dyn GenerationEnginePort> = match config.genai.provider {
        GenAiProvider::Gemini => {
            let client_config = HttpGenAiClientConfig {
                base_url: config.genai.base_url.clone(),
                api_key: config.genai.api_key.clone(),
                text_model: config.genai.text_model.clone(),
                image_model: config.genai.image_model.clone(),
                timeout_secs: config.genai.timeout_secs,
                thinking_budget: config.genai.thinking_budget,
            };
            Arc::new(HttpGenAiClient::new(client_config)?)
        }
        GenAiProvider::Fake => {
            tracing::warn!("Using the fake generation provider, no network calls will be made");
            FakeGenAiClient::with_defaults().arc()
        }
    };
    Ok(engine)
}
