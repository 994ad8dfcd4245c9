use crate::llm::provider::{ChatError, ChatProvider, Message};
use std::sync::Arc;

/// One conversation with the chat model: the system instruction plus every
/// turn so far. Lives only as long as the process.
pub struct ChatSession {
    provider: Arc<dyn ChatProvider>,
    system_prompt: String,
    history: Vec<Message>,
}

impl ChatSession {
    pub fn new(provider: Arc<dyn ChatProvider>, system_prompt: String) -> Self {
        Self {
            provider,
            system_prompt,
            history: Vec::new(),
        }
    }

    pub fn provider_id(&self) -> &str {
        self.provider.id()
    }

    pub fn history(&self) -> &[Message] {
        &self.history
    }

    /// Send one user utterance and return the raw model reply.
    ///
    /// The history only grows when the call succeeds.
    pub async fn send(&mut self, text: &str) -> Result<String, ChatError> {
        self.history.push(Message::user(text));
        match self.provider.chat(&self.system_prompt, &self.history).await {
            Ok(reply) => {
                tracing::debug!(
                    "[Chat] {} replied with {} chars",
                    self.provider.id(),
                    reply.chars().count()
                );
                self.history.push(Message::model(reply.clone()));
                Ok(reply)
            }
            Err(e) => {
                self.history.pop();
                Err(e)
            }
        }
    }
}
