//! Defaults Commands

use crate::domain::ChapterRequest;

/// 保存表单默认参数
#[derive(Debug, Clone)]
pub struct SaveDefaults {
    pub request: ChapterRequest,
}
