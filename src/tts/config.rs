use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:50021";
pub const DEFAULT_SPEAKER: u32 = 48;

fn default_true() -> bool {
    true
}
fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}
fn default_speaker() -> u32 {
    DEFAULT_SPEAKER
}
fn default_timeout_secs() -> u64 {
    30
}

/// Speech synthesis settings, persisted to `speech_config.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeechConfig {
    /// When false, replies are shown but not spoken.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Root URL of the VOICEVOX-compatible engine.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_speaker")]
    pub speaker: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: default_base_url(),
            speaker: DEFAULT_SPEAKER,
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Load speech config from a JSON file. Falls back to defaults if missing or invalid.
pub fn load_config(path: &Path) -> SpeechConfig {
    crate::config::load_json_config(path, "Speech")
}

pub fn save_config(path: &Path, config: &SpeechConfig) -> Result<(), String> {
    crate::config::save_json_config(path, config, "Speech")
}
