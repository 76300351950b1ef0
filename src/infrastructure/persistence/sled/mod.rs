//! Sled 存储实现
//!
//! 一个数据库，两个条目:
//! - `quill_history`: 历史记录 JSON 数组
//! - `quill_defaults`: 表单默认参数 JSON 对象

mod defaults_store;
mod history_store;

use std::path::Path;

use sled::Db;

use crate::application::ports::PersistenceError;

pub use defaults_store::SledDefaultsStore;
pub use history_store::SledHistoryStore;

/// 历史记录键
pub const HISTORY_KEY: &str = "quill_history";
/// 默认参数键
pub const DEFAULTS_KEY: &str = "quill_defaults";

impl From<sled::Error> for PersistenceError {
    fn from(err: sled::Error) -> Self {
        Self::DatabaseError(err.to_string())
    }
}

/// 打开（或创建）数据库
pub fn open_database<P: AsRef<Path>>(path: P) -> Result<Db, PersistenceError> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| PersistenceError::DatabaseError(e.to_string()))?;
    }
    let db = sled::open(path)?;
    tracing::info!(db_path = %path.display(), "Sled database opened");
    Ok(db)
}

/// 临时数据库（进程退出后删除）
pub fn temporary_database() -> Result<Db, PersistenceError> {
    Ok(sled::Config::new().temporary(true).open()?)
}

/// 写入 JSON 并刷盘
fn write_json<T: serde::Serialize + ?Sized>(
    db: &Db,
    key: &str,
    value: &T,
) -> Result<(), PersistenceError> {
    let bytes = serde_json::to_vec(value)?;
    db.insert(key, bytes)?;
    db.flush()?;
    Ok(())
}
