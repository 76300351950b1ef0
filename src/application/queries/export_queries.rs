//! Export Queries

use crate::application::ports::ExportFormat;
use crate::domain::HistoryId;

/// 导出来源
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportSource {
    /// 当前视图中的结果
    Live,
    /// 已保存的历史记录
    History(HistoryId),
}

/// 导出章节
#[derive(Debug, Clone)]
pub struct ExportChapter {
    pub source: ExportSource,
    pub format: ExportFormat,
}

/// 下载插图
#[derive(Debug, Clone)]
pub struct ExportImage {
    pub source: ExportSource,
}
