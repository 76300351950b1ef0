//! Defaults Queries

/// 加载表单默认参数
#[derive(Debug, Clone)]
pub struct LoadDefaults;
