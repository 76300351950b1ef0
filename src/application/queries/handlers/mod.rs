//! Query Handlers 实现

mod defaults_handlers;
mod export_handlers;
mod history_handlers;

pub use defaults_handlers::*;
pub use export_handlers::*;
pub use history_handlers::*;
