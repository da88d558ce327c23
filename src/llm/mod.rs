pub mod anthropic;
pub mod generator;
pub mod provider;
pub mod types;

pub use anthropic::AnthropicClient;
pub use generator::AiGenerator;
pub use provider::LlmProvider;
pub use types::{ChatMessage, ChatRequest};
