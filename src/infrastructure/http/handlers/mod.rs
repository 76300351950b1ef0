//! HTTP Handlers

mod defaults;
mod download;
mod generation;
mod history;
mod ping;
mod provider;
mod websocket;

pub use defaults::*;
pub use generation::*;
pub use history::*;
pub use ping::*;
pub use provider::*;
pub use websocket::*;
