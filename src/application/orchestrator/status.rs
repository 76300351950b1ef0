//! 生成状态与状态快照

use serde::{Deserialize, Serialize};

use crate::domain::{GenerationResult, HistoryId};

/// 生成状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppStatus {
    /// 尚未提交
    #[default]
    Idle,
    /// 正在生成正文
    WritingText,
    /// 正在生成插图
    GeneratingImage,
    /// 生成完成（或从历史记录恢复）
    Completed,
    /// 生成失败
    Failed,
}

impl AppStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppStatus::Idle => "idle",
            AppStatus::WritingText => "writing_text",
            AppStatus::GeneratingImage => "generating_image",
            AppStatus::Completed => "completed",
            AppStatus::Failed => "failed",
        }
    }

    /// 是否有生成任务在进行中
    pub fn is_busy(&self) -> bool {
        matches!(self, AppStatus::WritingText | AppStatus::GeneratingImage)
    }

    /// 状态转换表
    pub fn can_transition_to(&self, next: AppStatus) -> bool {
        use AppStatus::*;
        matches!(
            (self, next),
            (Idle | Completed | Failed, WritingText)
                | (WritingText, GeneratingImage)
                | (WritingText | GeneratingImage, Failed)
                | (GeneratingImage, Completed)
                | (Idle | Completed | Failed, Completed)
        )
    }
}

impl std::fmt::Display for AppStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 状态快照
///
/// 通过 watch 通道推送给订阅者
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationSnapshot {
    pub status: AppStatus,
    pub result: GenerationResult,
    /// 最近一次失败的提示
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// 非致命提示（例如历史记录写入失败）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    /// 当前展示的结果对应的历史记录
    #[serde(skip_serializing_if = "Option::is_none")]
    pub history_id: Option<HistoryId>,
    /// 生成周期编号，单调递增
    pub cycle: u64,
}
