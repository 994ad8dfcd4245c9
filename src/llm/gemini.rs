use super::provider::{check_status, ChatError, ChatProvider, Message, Role};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-1.5-pro";

/// Google Gemini `generateContent` client.
pub struct GeminiProvider {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    provider_id: String,
}

impl GeminiProvider {
    pub fn new(api_key: String, base_url: Option<String>, model: Option<String>) -> Self {
        let model = model
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());
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
            model,
            provider_id: "gemini".to_string(),
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

    fn request_body(system: &str, history: &[Message]) -> Value {
        let contents: Vec<Value> = history
            .iter()
            .map(|m| {
                let role = match m.role {
                    Role::User => "user",
                    Role::Model => "model",
                };
                json!({ "role": role, "parts": [{ "text": m.content }] })
            })
            .collect();

        let mut body = json!({ "contents": contents });
        if !system.is_empty() {
            body["system_instruction"] = json!({ "parts": [{ "text": system }] });
        }
        body
    }

    /// Structure: { "candidates": [ { "content": { "parts": [ { "text": ".." } ] } } ] }
    fn extract_text(body: &Value) -> Result<String, ChatError> {
        if let Some(reason) = body["promptFeedback"]["blockReason"].as_str() {
            return Err(ChatError::Blocked(reason.to_string()));
        }

        let candidates = body["candidates"]
            .as_array()
            .ok_or_else(|| ChatError::Decode("missing 'candidates' array".to_string()))?;
        let first = candidates.first().ok_or(ChatError::EmptyResponse)?;

        let text: String = first["content"]["parts"]
            .as_array()
            .map(|parts| parts.iter().filter_map(|p| p["text"].as_str()).collect())
            .unwrap_or_default();

        if text.is_empty() {
            if let Some(reason) = first["finishReason"].as_str() {
                if reason != "STOP" {
                    return Err(ChatError::Blocked(reason.to_string()));
                }
            }
            return Err(ChatError::EmptyResponse);
        }
        Ok(text)
    }
}

#[async_trait]
impl ChatProvider for GeminiProvider {
    async fn chat(&self, system: &str, history: &[Message]) -> Result<String, ChatError> {
        if self.api_key.is_empty() {
            return Err(ChatError::MissingApiKey(self.provider_id.clone()));
        }

        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&Self::request_body(system, history))
            .send()
            .await?;
        let response = check_status(response).await?;

        let body: Value = response
            .json()
            .await
            .map_err(|e| ChatError::Decode(e.to_string()))?;
        Self::extract_text(&body)
    }

    fn id(&self) -> &str {
        &self.provider_id
    }
}
