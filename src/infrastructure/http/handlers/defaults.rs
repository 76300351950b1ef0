//! Defaults HTTP Handlers

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::application::{LoadDefaults, SaveDefaults};
use crate::domain::ChapterRequest;
use crate::infrastructure::http::dto::{ApiResponse, DefaultsResponse, Empty};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

/// 读取表单默认参数
pub async fn load_defaults(
    State(state): State<Arc<AppState>>,
) -> Json<ApiResponse<DefaultsResponse>> {
    let request = state.load_defaults_handler.handle(LoadDefaults).await;
    Json(ApiResponse::success(DefaultsResponse { request }))
}

/// 保存表单默认参数
pub async fn save_defaults(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ChapterRequest>,
) -> Result<Json<ApiResponse<Empty>>, ApiError> {
    state
        .save_defaults_handler
        .handle(SaveDefaults { request })
        .await?;

    Ok(Json(ApiResponse::ok()))
}
