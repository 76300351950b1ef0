//! Generation HTTP Handlers

use axum::{
    extract::{Path, State},
    response::Response,
    Json,
};
use std::sync::Arc;

use crate::application::{
    ExportChapter, ExportFormat, ExportImage, ExportSource, RestoreHistoryItem, RetitleChapter,
    SubmitChapter,
};
use crate::domain::ChapterRequest;
use crate::infrastructure::http::dto::{
    ApiResponse, HistoryItemResponse, IdRequest, RetitleRequest, StatusResponse, SubmitResponse,
};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

use super::download::artifact_response;

/// 当前生成状态快照
pub async fn generation_status(
    State(state): State<Arc<AppState>>,
) -> Json<ApiResponse<StatusResponse>> {
    Json(ApiResponse::success(state.orchestrator.snapshot().into()))
}

/// 提交生成请求（立即返回，进度通过 /ws/status 推送）
pub async fn submit_chapter(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ChapterRequest>,
) -> Result<Json<ApiResponse<SubmitResponse>>, ApiError> {
    let cycle = state
        .submit_chapter_handler
        .handle(SubmitChapter { request })?;
    let cycle_id = cycle.id();

    let publisher = state.event_publisher.clone();
    tokio::spawn(async move {
        match cycle.run().await {
            Ok(outcome) if outcome.persisted => {
                publisher.publish_history_added(outcome.item.id(), outcome.item.title());
            }
            // 写入失败时快照里已有 warning，不广播
            Ok(_) => {}
            Err(e) => publisher.publish_generation_failed(cycle_id, &e.to_string()),
        }
    });

    Ok(Json(ApiResponse::success(SubmitResponse {
        cycle: cycle_id,
        status: state.orchestrator.status().as_str().to_string(),
    })))
}

/// 把历史记录载入当前视图
pub async fn restore_history_item(
    State(state): State<Arc<AppState>>,
    Json(req): Json<IdRequest>,
) -> Result<Json<ApiResponse<HistoryItemResponse>>, ApiError> {
    let item = state
        .restore_history_item_handler
        .handle(RestoreHistoryItem { id: req.id })
        .await?;

    tracing::info!(id = %req.id, "History item restored");
    Ok(Json(ApiResponse::success(item.into())))
}

/// 修改当前结果的标题
pub async fn retitle_chapter(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RetitleRequest>,
) -> Result<Json<ApiResponse<StatusResponse>>, ApiError> {
    state
        .retitle_chapter_handler
        .handle(RetitleChapter { title: req.title })?;

    Ok(Json(ApiResponse::success(state.orchestrator.snapshot().into())))
}

/// 导出当前结果
pub async fn export_live_chapter(
    State(state): State<Arc<AppState>>,
    Path(format): Path<String>,
) -> Result<Response, ApiError> {
    let format = parse_format(&format)?;
    let artifact = state
        .export_chapter_handler
        .handle(ExportChapter {
            source: ExportSource::Live,
            format,
        })
        .await?;

    artifact_response(artifact)
}

/// 下载当前插图
pub async fn download_live_image(State(state): State<Arc<AppState>>) -> Result<Response, ApiError> {
    let artifact = state
        .export_image_handler
        .handle(ExportImage {
            source: ExportSource::Live,
        })
        .await?;

    artifact_response(artifact)
}

pub(super) fn parse_format(format: &str) -> Result<ExportFormat, ApiError> {
    ExportFormat::from_str(format)
        .ok_or_else(|| ApiError::BadRequest(format!("Unsupported export format: {}", format)))
}
