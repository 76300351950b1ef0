//! Event Publisher Implementation
//!
//! 历史记录变更的 WebSocket 事件推送（全局广播）

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;

use crate::domain::HistoryId;

/// WebSocket 事件类型
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum WsEvent {
    /// 新的历史记录已写入
    HistoryAdded { id: HistoryId, title: String },
    /// 历史记录已删除
    HistoryRemoved { id: HistoryId },
    /// 生成周期失败
    GenerationFailed { cycle: u64, error: String },
}

/// 事件发布器
pub struct EventPublisher {
    global_channel: broadcast::Sender<WsEvent>,
}

impl EventPublisher {
    pub fn new() -> Self {
        let (global_tx, _) = broadcast::channel(100);
        Self {
            global_channel: global_tx,
        }
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// 订阅全局事件
    pub fn subscribe_global(&self) -> broadcast::Receiver<WsEvent> {
        self.global_channel.subscribe()
    }

    pub fn publish_history_added(&self, id: HistoryId, title: &str) {
        self.publish(WsEvent::HistoryAdded {
            id,
            title: title.to_string(),
        });
    }

    pub fn publish_history_removed(&self, id: HistoryId) {
        self.publish(WsEvent::HistoryRemoved { id });
    }

    pub fn publish_generation_failed(&self, cycle: u64, error: &str) {
        self.publish(WsEvent::GenerationFailed {
            cycle,
            error: error.to_string(),
        });
    }

    fn publish(&self, event: WsEvent) {
        if let Err(e) = self.global_channel.send(event) {
            // 没有订阅者时 send 会失败，属于正常情况
            tracing::debug!(event = ?e.0, "Event dropped (no receivers)");
        }
    }
}

impl Default for EventPublisher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_subscribers_receive_events() {
        let publisher = EventPublisher::new();
        let mut rx = publisher.subscribe_global();
        let id = HistoryId::new();

        publisher.publish_history_added(id, "The Fall");
        publisher.publish_history_removed(id);

        assert_eq!(
            rx.recv().await.unwrap(),
            WsEvent::HistoryAdded {
                id,
                title: "The Fall".to_string()
            }
        );
        assert_eq!(rx.recv().await.unwrap(), WsEvent::HistoryRemoved { id });
    }

    #[test]
    fn test_publish_without_subscribers() {
        EventPublisher::new().publish_generation_failed(3, "boom");
    }

    #[test]
    fn test_wire_format() {
        let json = serde_json::to_value(WsEvent::GenerationFailed {
            cycle: 2,
            error: "timeout".to_string(),
        })
        .unwrap();
        assert_eq!(json["event"], "GenerationFailed");
        assert_eq!(json["data"]["cycle"], 2);
        assert_eq!(json["data"]["error"], "timeout");
    }
}
