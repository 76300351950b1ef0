//! 应用层 - 命令（写操作）
//!
//! CQRS 命令侧：处理所有写操作

mod defaults_commands;
mod generation_commands;
mod history_commands;

pub mod handlers;

pub use defaults_commands::*;
pub use generation_commands::*;
pub use history_commands::*;
