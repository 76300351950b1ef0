//! Generation Commands

use crate::domain::{ChapterRequest, HistoryId};

/// 提交章节生成命令
#[derive(Debug, Clone)]
pub struct SubmitChapter {
    pub request: ChapterRequest,
}

/// 将历史记录载入当前视图
#[derive(Debug, Clone)]
pub struct RestoreHistoryItem {
    pub id: HistoryId,
}

/// 修改当前章节标题
#[derive(Debug, Clone)]
pub struct RetitleChapter {
    pub title: String,
}
