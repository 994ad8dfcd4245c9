pub mod context;
pub mod gemini;
pub mod llm_config;
pub mod openai;
pub mod provider;

pub use context::ChatSession;
pub use llm_config::{build_provider, LlmConfig, LlmProviderConfig};
pub use provider::{ChatError, ChatProvider, Message, Role};
