//! Command Handlers 实现
//!
//! 所有 CommandHandler 的具体实现

mod defaults_handlers;
mod generation_handlers;
mod history_handlers;

pub use defaults_handlers::*;
pub use generation_handlers::*;
pub use history_handlers::*;
