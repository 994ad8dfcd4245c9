use async_trait::async_trait;

use super::audio::PcmAudio;

// ── Error Types ────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum SpeechError {
    #[error("speech request to {endpoint} failed: {source}")]
    Request {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("speech service returned {status} from {endpoint}: {body}")]
    Status {
        endpoint: &'static str,
        status: u16,
        body: String,
    },
    #[error("invalid audio: {0}")]
    Decode(String),
    #[error("audio output error: {0}")]
    Output(String),
    #[error("speech worker failed: {0}")]
    Worker(String),
}

// ── Speech Client ──────────────────────────────────────

/// Converts text to audio and plays it; resolves once playback has finished.
#[async_trait]
pub trait SpeechClient: Send + Sync {
    async fn speak(&self, text: &str) -> Result<(), SpeechError>;
}

/// Blocking audio output. `play` returns after the last frame was handed
/// to the device.
pub trait AudioSink: Send + Sync + 'static {
    fn play(&self, audio: PcmAudio) -> Result<(), SpeechError>;
}

/// Client used when speech is disabled in config: accepts everything,
/// plays nothing.
pub struct SilentSpeech;

#[async_trait]
impl SpeechClient for SilentSpeech {
    async fn speak(&self, text: &str) -> Result<(), SpeechError> {
        tracing::debug!("[Speech] disabled, skipping {} chars", text.chars().count());
        Ok(())
    }
}
