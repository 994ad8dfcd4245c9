//! Chat backend configuration, persisted to `llm_config.json`.

use crate::config;
use crate::llm::gemini::GeminiProvider;
use crate::llm::openai::OpenAIProvider;
use crate::llm::provider::ChatProvider;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmProviderConfig {
    pub id: String,
    /// "gemini" | "openai"
    pub provider_type: String,
    #[serde(default = "default_true")]
    pub enabled: bool,

    pub api_key: Option<String>,
    pub api_key_env: Option<String>,
    pub base_url: Option<String>,
    pub model: Option<String>,
}

impl LlmProviderConfig {
    pub fn resolve_api_key(&self) -> Option<String> {
        config::resolve_api_key(&self.api_key, &self.api_key_env)
    }
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmConfig {
    /// ID of the active provider (should match one of `providers[].id`).
    #[serde(default = "default_active_provider")]
    pub active_provider: String,

    /// Persona prompt override. `None` uses the built-in character.
    #[serde(default)]
    pub system_prompt: Option<String>,

    #[serde(default = "default_providers")]
    pub providers: Vec<LlmProviderConfig>,
}

fn default_active_provider() -> String {
    "gemini".to_string()
}

fn default_providers() -> Vec<LlmProviderConfig> {
    vec![
        LlmProviderConfig {
            id: "gemini".to_string(),
            provider_type: "gemini".to_string(),
            enabled: true,
            api_key: None,
            api_key_env: Some("GOOGLE_API_KEY".to_string()),
            base_url: None,
            model: Some(crate::llm::gemini::DEFAULT_MODEL.to_string()),
        },
        LlmProviderConfig {
            id: "openai".to_string(),
            provider_type: "openai".to_string(),
            enabled: false,
            api_key: None,
            api_key_env: Some("OPENAI_API_KEY".to_string()),
            base_url: Some(crate::llm::openai::DEFAULT_BASE_URL.to_string()),
            model: Some(crate::llm::openai::DEFAULT_MODEL.to_string()),
        },
    ]
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            active_provider: default_active_provider(),
            system_prompt: None,
            providers: default_providers(),
        }
    }
}

impl LlmConfig {
    /// Pick the provider entry to use: the active one, else the first
    /// enabled one, else the first listed.
    pub fn active(&self) -> Option<&LlmProviderConfig> {
        self.providers
            .iter()
            .find(|p| p.id == self.active_provider)
            .or_else(|| self.providers.iter().find(|p| p.enabled))
            .or_else(|| self.providers.first())
    }
}

pub fn load_config(path: &Path) -> LlmConfig {
    config::load_json_config(path, "LLM")
}

pub fn save_config(path: &Path, config: &LlmConfig) -> Result<(), String> {
    config::save_json_config(path, config, "LLM")
}

/// Factory: build the chat backend selected by `config`.
///
/// A missing API key is not an error here; the provider reports it on the
/// first request.
pub fn build_provider(config: &LlmConfig) -> Arc<dyn ChatProvider> {
    match config.active() {
        Some(cfg) => build_from_provider_config(cfg),
        None => {
            tracing::warn!("[LLM] No provider configured, falling back to Gemini defaults");
            Arc::new(GeminiProvider::new(
                config::resolve_api_key(&None, &Some("GOOGLE_API_KEY".to_string()))
                    .unwrap_or_default(),
                None,
                None,
            ))
        }
    }
}

fn build_from_provider_config(cfg: &LlmProviderConfig) -> Arc<dyn ChatProvider> {
    let api_key = cfg.resolve_api_key().unwrap_or_default();
    if api_key.is_empty() {
        tracing::warn!("[LLM] Provider '{}' has no API key", cfg.id);
    }
    match cfg.provider_type.as_str() {
        "openai" => {
            tracing::info!(
                "[LLM] Initializing OpenAI-compatible provider: base_url={}, model={}",
                cfg.base_url
                    .as_deref()
                    .unwrap_or(crate::llm::openai::DEFAULT_BASE_URL),
                cfg.model
                    .as_deref()
                    .unwrap_or(crate::llm::openai::DEFAULT_MODEL)
            );
            Arc::new(
                OpenAIProvider::new(api_key, cfg.base_url.clone(), cfg.model.clone())
                    .with_id(cfg.id.clone()),
            )
        }
        other => {
            if other != "gemini" {
                tracing::warn!(
                    "[LLM] Unknown provider_type '{}', treating '{}' as Gemini",
                    other,
                    cfg.id
                );
            }
            tracing::info!(
                "[LLM] Initializing Gemini provider: model={}",
                cfg.model
                    .as_deref()
                    .unwrap_or(crate::llm::gemini::DEFAULT_MODEL)
            );
            Arc::new(
                GeminiProvider::new(api_key, cfg.base_url.clone(), cfg.model.clone())
                    .with_id(cfg.id.clone()),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_gemini_from_environment() {
        let config = LlmConfig::default();
        let active = config.active().unwrap();
        assert_eq!(active.provider_type, "gemini");
        assert_eq!(active.api_key_env.as_deref(), Some("GOOGLE_API_KEY"));
        assert!(config.system_prompt.is_none());
    }

    #[test]
    fn unknown_active_id_falls_back_to_first_enabled() {
        let mut config = LlmConfig::default();
        config.active_provider = "missing".to_string();
        config.providers[0].enabled = false;
        config.providers[1].enabled = true;
        assert_eq!(config.active().unwrap().id, "openai");
    }

    #[test]
    fn build_provider_honors_active_id() {
        let mut config = LlmConfig::default();
        config.active_provider = "openai".to_string();
        config.providers[1].api_key = Some("sk-x".to_string());
        assert_eq!(build_provider(&config).id(), "openai");

        config.providers.clear();
        assert_eq!(build_provider(&config).id(), "gemini");
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("llm_config.json");
        std::fs::write(&path, r#"{ "system_prompt": "short persona" }"#).unwrap();

        let config = load_config(&path);
        assert_eq!(config.active_provider, "gemini");
        assert_eq!(config.system_prompt.as_deref(), Some("short persona"));
        assert_eq!(config.providers.len(), 2);
    }

    #[test]
    fn saved_entries_hold_only_known_fields() {
        let json = serde_json::to_value(LlmConfig::default()).unwrap();
        let keys: Vec<&str> = json["providers"][0]
            .as_object()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(
            keys,
            vec![
                "api_key",
                "api_key_env",
                "base_url",
                "enabled",
                "id",
                "model",
                "provider_type",
            ]
        );

        // Older files with extra keys still load.
        let legacy = r#"{
            "providers": [ { "id": "g", "provider_type": "gemini", "extra": { "x": 1 } } ]
        }"#;
        let config: LlmConfig = serde_json::from_str(legacy).unwrap();
        assert_eq!(config.providers[0].id, "g");
        assert!(config.providers[0].enabled);
    }

    #[test]
    fn save_then_load_preserves_edits() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("llm_config.json");
        let mut config = LlmConfig::default();
        config.providers[0].model = Some("gemini-1.5-flash".to_string());

        save_config(&path, &config).unwrap();
        assert_eq!(load_config(&path), config);
    }
}
