//! GenAI Adapter - 文本 / 图片生成客户端实现

mod fake_genai_client;
mod http_genai_client;
pub mod prompt;

pub use fake_genai_client::{FakeGenAiClient, FakeGenAiClientConfig};
pub use http_genai_client::{HttpGenAiClient, HttpGenAiClientConfig};
