//! History HTTP Handlers

use axum::{
    extract::{Path, State},
    response::Response,
    Json,
};
use std::sync::Arc;

use crate::application::{
    DeleteHistoryItem, ExportChapter, ExportImage, ExportSource, GetHistoryItem, HistorySummary,
    ListHistory, NavigateHistory,
};
use crate::domain::HistoryId;
use crate::infrastructure::http::dto::{
    ApiResponse, DeleteResponse, HistoryItemResponse, IdRequest, NavigateRequest,
    NavigateResponse,
};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

use super::download::artifact_response;
use super::generation::parse_format;

/// 列出历史记录（最新在前）
pub async fn list_history(
    State(state): State<Arc<AppState>>,
) -> Json<ApiResponse<Vec<HistorySummary>>> {
    let items = state.list_history_handler.handle(ListHistory).await;
    Json(ApiResponse::success(items))
}

pub async fn get_history_item(
    State(state): State<Arc<AppState>>,
    Json(req): Json<IdRequest>,
) -> Result<Json<ApiResponse<HistoryItemResponse>>, ApiError> {
    let item = state
        .get_history_item_handler
        .handle(GetHistoryItem { id: req.id })
        .await?;

    Ok(Json(ApiResponse::success(item.into())))
}

/// 删除历史记录，不存在时 removed 为 false
pub async fn delete_history_item(
    State(state): State<Arc<AppState>>,
    Json(req): Json<IdRequest>,
) -> Result<Json<ApiResponse<DeleteResponse>>, ApiError> {
    let removed = state
        .delete_history_item_handler
        .handle(DeleteHistoryItem { id: req.id })
        .await?;

    if removed {
        state.event_publisher.publish_history_removed(req.id);
    }

    Ok(Json(ApiResponse::success(DeleteResponse {
        id: req.id,
        removed,
    })))
}

pub async fn navigate_history(
    State(state): State<Arc<AppState>>,
    Json(req): Json<NavigateRequest>,
) -> Result<Json<ApiResponse<NavigateResponse>>, ApiError> {
    let item = state
        .navigate_history_handler
        .handle(NavigateHistory {
            id: req.id,
            direction: req.direction,
        })
        .await?;

    Ok(Json(ApiResponse::success(NavigateResponse {
        item: item.map(HistoryItemResponse::from),
    })))
}

/// 导出历史记录
pub async fn export_history_chapter(
    State(state): State<Arc<AppState>>,
    Path((id, format)): Path<(HistoryId, String)>,
) -> Result<Response, ApiError> {
    let format = parse_format(&format)?;
    let artifact = state
        .export_chapter_handler
        .handle(ExportChapter {
            source: ExportSource::History(id),
            format,
        })
        .await?;

    artifact_response(artifact)
}

pub async fn download_history_image(
    State(state): State<Arc<AppState>>,
    Path(id): Path<HistoryId>,
) -> Result<Response, ApiError> {
    let artifact = state
        .export_image_handler
        .handle(ExportImage {
            source: ExportSource::History(id),
        })
        .await?;

    artifact_response(artifact)
}
