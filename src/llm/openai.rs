use super::provider::{check_status, ChatError, ChatProvider, Message, Role};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

#[derive(Debug, Clone, Serialize)]
struct WireMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Clone, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

/// OpenAI-compatible chat completions client (OpenAI, DeepSeek, local
/// servers exposing `/v1/chat/completions`).
pub struct OpenAIProvider {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    temperature: Option<f32>,
    provider_id: String,
}

impl OpenAIProvider {
    pub fn new(api_key: String, base_url: Option<String>, model: Option<String>) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(60))
                .build()
                .unwrap_or_else(|_| Client::new()),
            api_key,
            base_url: base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            model: model
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            temperature: Some(0.7),
            provider_id: "openai".to_string(),
        }
    }

    pub fn with_id(mut self, id: String) -> Self {
        self.provider_id = id;
        self
    }

    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    fn wire_messages<'a>(system: &'a str, history: &'a [Message]) -> Vec<WireMessage<'a>> {
        let mut messages = Vec::with_capacity(history.len() + 1);
        if !system.is_empty() {
            messages.push(WireMessage {
                role: "system",
                content: system,
            });
        }
        messages.extend(history.iter().map(|m| WireMessage {
            role: match m.role {
                Role::User => "user",
                Role::Model => "assistant",
            },
            content: &m.content,
        }));
        messages
    }
}

#[async_trait]
impl ChatProvider for OpenAIProvider {
    async fn chat(&self, system: &str, history: &[Message]) -> Result<String, ChatError> {
        if self.api_key.is_empty() {
            return Err(ChatError::MissingApiKey(self.provider_id.clone()));
        }

        let url = format!("{}/chat/completions", self.base_url);
        let request_body = ChatCompletionRequest {
            model: &self.model,
            messages: Self::wire_messages(system, history),
            stream: false,
            temperature: self.temperature,
        };

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request_body)
            .send()
            .await?;
        let response = check_status(response).await?;

        let body: Value = response
            .json()
            .await
            .map_err(|e| ChatError::Decode(e.to_string()))?;

        match body["choices"][0]["message"]["content"].as_str() {
            Some(content) if !content.is_empty() => Ok(content.to_string()),
            Some(_) => Err(ChatError::EmptyResponse),
            None => Err(ChatError::Decode("missing choices[0].message.content".to_string())),
        }
    }

    fn id(&self) -> &str {
        &self.provider_id
    }
}
