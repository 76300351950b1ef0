//! HTTP Routes
//!
//! API Endpoints:
//! - /api/ping                          GET   存活检查
//! - /api/generation/status             GET   当前状态快照
//! - /api/generation/submit             POST  提交生成请求（进度通过 /ws/status 推送）
//! - /api/generation/restore            POST  载入历史记录
//! - /api/generation/retitle            POST  修改当前标题
//! - /api/generation/export/{format}    GET   导出当前结果（txt / md / docx / print）
//! - /api/generation/image              GET   下载当前插图
//! - /api/history/list                  GET   列出历史记录
//! - /api/history/get                   POST  获取历史记录
//! - /api/history/delete                POST  删除历史记录
//! - /api/history/navigate              POST  上一条 / 下一条
//! - /api/history/{id}/export/{format}  GET   导出历史记录
//! - /api/history/{id}/image            GET   下载历史插图
//! - /api/defaults                      GET / POST  表单默认参数
//! - /api/provider/health               GET   生成服务健康检查
//! - /ws/status                         WS    状态快照推送
//! - /ws/events                         WS    历史记录事件推送

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use super::handlers;
use super::state::AppState;

/// 创建所有路由
pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new()
        .nest("/api", api_routes())
        .route("/ws/status", get(handlers::status_websocket_handler))
        .route("/ws/events", get(handlers::events_websocket_handler))
}

/// API 路由
fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/ping", get(handlers::ping))
        .nest("/generation", generation_routes())
        .nest("/history", history_routes())
        .route(
            "/defaults",
            get(handlers::load_defaults).post(handlers::save_defaults),
        )
        .route("/provider/health", get(handlers::provider_health))
}

/// Generation 路由
fn generation_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/status", get(handlers::generation_status))
        .route("/submit", post(handlers::submit_chapter))
        .route("/restore", post(handlers::restore_history_item))
        .route("/retitle", post(handlers::retitle_chapter))
        .route("/export/:format", get(handlers::export_live_chapter))
        .route("/image", get(handlers::download_live_image))
}

/// History 路由
fn history_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/list", get(handlers::list_history))
        .route("/get", post(handlers::get_history_item))
        .route("/delete", post(handlers::delete_history_item))
        .route("/navigate", post(handlers::navigate_history))
        .route("/:id/export/:format", get(handlers::export_history_chapter))
        .route("/:id/image", get(handlers::download_history_image))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Method, Request};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::application::{AppStatus, DocumentExporterPort, HistoryStorePort};
    use crate::infrastructure::adapters::{ChapterExporter, FakeGenAiClient};
    use crate::infrastructure::events::{EventPublisher, WsEvent};
    use crate::infrastructure::persistence::sled::{
        temporary_database, SledDefaultsStore, SledHistoryStore,
    };

    fn app_state() -> Arc<AppState> {
        let db = temporary_database().unwrap();
        let history: Arc<dyn HistoryStorePort> = SledHistoryStore::new(db.clone()).arc();
        let exporter: Arc<dyn DocumentExporterPort> = Arc::new(ChapterExporter::new());
        AppState::new(
            FakeGenAiClient::with_defaults().arc(),
            history,
            SledDefaultsStore::new(db).arc(),
            exporter,
            EventPublisher::new().arc(),
        )
        .arc()
    }

    fn router(state: &Arc<AppState>) -> Router {
        create_routes().with_state(state.clone())
    }

    async fn call(state: &Arc<AppState>, method: Method, uri: &str, body: Option<Value>) -> Value {
        let request = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => request
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => request.body(Body::empty()),
        }
        .unwrap();

        let response = router(state).oneshot(request).await.unwrap();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn chapter_request() -> Value {
        json!({
            "bookTitle": "The Salt Road",
            "genre": "Fantasy",
            "chapterName": "Chapter 1: The Fall",
            "plotSummary": "The caravan is ambushed at the salt flats."
        })
    }

    async fn wait_until_settled(state: &Arc<AppState>) {
        let mut rx = state.orchestrator.subscribe();
        rx.wait_for(|snapshot| !snapshot.status.is_busy())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_ping() {
        let state = app_state();
        let body = call(&state, Method::GET, "/api/ping", None).await;
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_submit_then_export() {
        let state = app_state();
        let mut events = state.event_publisher.subscribe_global();

        let body = call(
            &state,
            Method::POST,
            "/api/generation/submit",
            Some(chapter_request()),
        )
        .await;
        assert_eq!(body["errno"], 0);
        assert_eq!(body["data"]["status"], "writing_text");

        wait_until_settled(&state).await;
        assert_eq!(state.orchestrator.status(), AppStatus::Completed);
        assert!(matches!(
            events.recv().await.unwrap(),
            WsEvent::HistoryAdded { .. }
        ));

        let status = call(&state, Method::GET, "/api/generation/status", None).await;
        assert_eq!(status["data"]["status"], "completed");
        assert!(status["data"]["stats"]["wordCount"].as_u64().unwrap() > 0);

        let list = call(&state, Method::GET, "/api/history/list", None).await;
        assert_eq!(list["data"].as_array().unwrap().len(), 1);

        let response = router(&state)
            .oneshot(
                Request::builder()
                    .uri("/api/generation/export/md")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let disposition = response.headers()[header::CONTENT_DISPOSITION]
            .to_str()
            .unwrap()
            .to_string();
        assert!(disposition.contains("Chapter 1 The Fall.md"));
    }

    #[tokio::test]
    async fn test_submit_validation_error() {
        let state = app_state();
        let body = call(
            &state,
            Method::POST,
            "/api/generation/submit",
            Some(json!({ "bookTitle": "Only a title" })),
        )
        .await;
        assert_eq!(body["errno"], 400);
        assert_eq!(state.orchestrator.status(), AppStatus::Idle);
    }

    #[tokio::test]
    async fn test_unknown_export_format() {
        let state = app_state();
        let body = call(&state, Method::GET, "/api/generation/export/pptx", None).await;
        assert_eq!(body["errno"], 400);
    }

    #[tokio::test]
    async fn test_history_round_trip_over_http() {
        let state = app_state();
        call(
            &state,
            Method::POST,
            "/api/generation/submit",
            Some(chapter_request()),
        )
        .await;
        wait_until_settled(&state).await;

        let id = state.history.list().await[0].id().to_string();

        let item = call(&state, Method::POST, "/api/history/get", Some(json!({ "id": id }))).await;
        assert_eq!(item["data"]["request"]["genre"], "Fantasy");

        let nav = call(
            &state,
            Method::POST,
            "/api/history/navigate",
            Some(json!({ "id": id, "direction": "next" })),
        )
        .await;
        assert!(nav["data"]["item"].is_null());

        let deleted = call(
            &state,
            Method::POST,
            "/api/history/delete",
            Some(json!({ "id": id })),
        )
        .await;
        assert_eq!(deleted["data"]["removed"], true);

        let missing = call(&state, Method::POST, "/api/history/get", Some(json!({ "id": id }))).await;
        assert_eq!(missing["errno"], 404);
    }

    #[tokio::test]
    async fn test_defaults_round_trip() {
        let state = app_state();
        let initial = call(&state, Method::GET, "/api/defaults", None).await;
        assert_eq!(initial["data"]["request"]["bookTitle"], "");

        let saved = call(
            &state,
            Method::POST,
            "/api/defaults",
            Some(json!({ "bookTitle": "Draft", "genre": "Noir" })),
        )
        .await;
        assert_eq!(saved["errno"], 0);

        let loaded = call(&state, Method::GET, "/api/defaults", None).await;
        assert_eq!(loaded["data"]["request"]["genre"], "Noir");
    }

    #[tokio::test]
    async fn test_provider_health() {
        let state = app_state();
        let body = call(&state, Method::GET, "/api/provider/health", None).await;
        assert_eq!(body["data"]["healthy"], true);
    }
}
