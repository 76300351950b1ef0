//! WebSocket Handlers
//!
//! - /ws/status: 推送生成状态快照（连接后先发送一次当前快照）
//! - /ws/events: 推送历史记录事件

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use futures_util::{stream::SplitStream, SinkExt, StreamExt};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;

use crate::infrastructure::http::dto::StatusResponse;
use crate::infrastructure::http::state::AppState;

/// 状态快照 WebSocket
pub async fn status_websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_status_socket(socket, state))
}

/// 全局事件 WebSocket
pub async fn events_websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_events_socket(socket, state))
}

async fn handle_status_socket(socket: WebSocket, state: Arc<AppState>) {
    let (mut sender, receiver) = socket.split();
    let mut status_rx = state.orchestrator.subscribe();

    tracing::info!("Status WebSocket connected");

    let forward_task = tokio::spawn(async move {
        loop {
            let snapshot = status_rx.borrow_and_update().clone();
            if let Some(msg) = to_message(&StatusResponse::from(snapshot)) {
                if let Err(e) = sender.send(msg).await {
                    tracing::debug!(error = %e, "Failed to send status WebSocket message");
                    break;
                }
            }
            if status_rx.changed().await.is_err() {
                break;
            }
        }
    });

    let receive_task = tokio::spawn(drain_client(receiver, "status"));

    tokio::select! {
        _ = forward_task => {}
        _ = receive_task => {}
    }

    tracing::info!("Status WebSocket disconnected");
}

async fn handle_events_socket(socket: WebSocket, state: Arc<AppState>) {
    let (mut sender, receiver) = socket.split();
    let mut event_rx = state.event_publisher.subscribe_global();

    tracing::info!("Events WebSocket connected");

    let forward_task = tokio::spawn(async move {
        loop {
            let event = match event_rx.recv().await {
                Ok(event) => event,
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped = skipped, "Events WebSocket lagged behind");
                    continue;
                }
                Err(RecvError::Closed) => break,
            };
            let Some(msg) = to_message(&event) else {
                continue;
            };
            if let Err(e) = sender.send(msg).await {
                tracing::debug!(error = %e, "Failed to send events WebSocket message");
                break;
            }
        }
    });

    let receive_task = tokio::spawn(drain_client(receiver, "events"));

    tokio::select! {
        _ = forward_task => {}
        _ = receive_task => {}
    }

    tracing::info!("Events WebSocket disconnected");
}

/// 读取客户端消息直到关闭（ping 由 axum 自动回复 pong）
async fn drain_client(mut receiver: SplitStream<WebSocket>, channel: &'static str) {
    while let Some(msg) = receiver.next().await {
        match msg {
            Ok(Message::Close(_)) => {
                tracing::info!(channel = channel, "WebSocket closed by client");
                break;
            }
            Err(e) => {
                tracing::debug!(channel = channel, error = %e, "WebSocket error");
                break;
            }
            _ => {}
        }
    }
}

fn to_message<T: Serialize>(value: &T) -> Option<Message> {
    match serde_json::to_string(value) {
        Ok(json) => Some(Message::Text(json)),
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize WebSocket message");
            None
        }
    }
}
