//! Chat provider trait: common interface for the cloud chat backends.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn model(content: impl Into<String>) -> Self {
        Self {
            role: Role::Model,
            content: content.into(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("no API key configured for chat provider '{0}'")]
    MissingApiKey(String),
    #[error("chat request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("chat API error {status}: {body}")]
    Api { status: u16, body: String },
    #[error("chat reply was blocked: {0}")]
    Blocked(String),
    #[error("chat API returned no text")]
    EmptyResponse,
    #[error("unexpected chat API response: {0}")]
    Decode(String),
}

/// A stateless chat backend. History is owned by the caller
/// ([`crate::llm::context::ChatSession`]) and sent in full on every turn.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    async fn chat(&self, system: &str, history: &[Message]) -> Result<String, ChatError>;

    /// Provider identifier (e.g. "gemini", "openai").
    fn id(&self) -> &str;
}

/// Turn a non-success response into `ChatError::Api`.
pub(crate) async fn check_status(
    response: reqwest::Response,
) -> Result<reqwest::Response, ChatError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ChatError::Api {
        status: status.as_u16(),
        body,
    })
}
