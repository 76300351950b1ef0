//! Provider Handler

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::infrastructure::http::dto::{ApiResponse, HealthResponse};
use crate::infrastructure::http::state::AppState;

/// 生成服务健康检查
pub async fn provider_health(
    State(state): State<Arc<AppState>>,
) -> Json<ApiResponse<HealthResponse>> {
    let healthy = state.engine.health_check().await;
    if !healthy {
        tracing::warn!("Generation provider health check failed");
    }
    Json(ApiResponse::success(HealthResponse { healthy }))
}
