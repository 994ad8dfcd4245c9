use super::audio::PcmAudio;
use super::config::SpeechConfig;
use super::interface::{AudioSink, SpeechClient, SpeechError};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

/// HTTP client for a local VOICEVOX-compatible engine.
///
/// Synthesis is a two-step exchange:
///   POST /audio_query?text=..&speaker=..  -> returns a JSON audio query
///   POST /synthesis?text=..&speaker=..    -> body is that query, returns WAV
pub struct VoicevoxClient {
    client: Client,
    base_url: String,
    speaker: u32,
    timeout: Duration,
}

impl VoicevoxClient {
    pub fn new(base_url: String, speaker: u32) -> Self {
        Self {
            // The engine is local; a system proxy would only get in the way.
            client: Client::builder()
                .no_proxy()
                .build()
                .unwrap_or_else(|_| Client::new()),
            base_url: base_url.trim_end_matches('/').to_string(),
            speaker,
            timeout: Duration::from_secs(30),
        }
    }

    pub fn from_config(config: &SpeechConfig) -> Self {
        let mut client = Self::new(config.base_url.clone(), config.speaker);
        client.timeout = Duration::from_secs(config.timeout_secs.max(1));
        client
    }

    pub fn speaker(&self) -> u32 {
        self.speaker
    }

    /// Check `GET /version`. Only used for start-up diagnostics.
    pub async fn is_available(&self) -> bool {
        let url = format!("{}/version", self.base_url);
        match self
            .client
            .get(&url)
            .timeout(Duration::from_secs(3))
            .send()
            .await
        {
            Ok(resp) => resp.status().is_success(),
            Err(_) => false,
        }
    }

    pub async fn audio_query(&self, text: &str) -> Result<Value, SpeechError> {
        let response = self
            .client
            .post(format!("{}/audio_query", self.base_url))
            .query(&self.params(text))
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|source| SpeechError::Request {
                endpoint: "audio_query",
                source,
            })?;
        let response = check_status(response, "audio_query").await?;

        response.json::<Value>().await.map_err(|source| SpeechError::Request {
            endpoint: "audio_query",
            source,
        })
    }

    pub async fn synthesis(&self, text: &str, query: &Value) -> Result<Vec<u8>, SpeechError> {
        let response = self
            .client
            .post(format!("{}/synthesis", self.base_url))
            .query(&self.params(text))
            .json(query)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|source| SpeechError::Request {
                endpoint: "synthesis",
                source,
            })?;
        let response = check_status(response, "synthesis").await?;

        let bytes = response.bytes().await.map_err(|source| SpeechError::Request {
            endpoint: "synthesis",
            source,
        })?;
        Ok(bytes.to_vec())
    }

    /// Run both steps and return the WAV payload.
    pub async fn synthesize(&self, text: &str) -> Result<Vec<u8>, SpeechError> {
        let query = self.audio_query(text).await?;
        let wav = self.synthesis(text, &query).await?;
        tracing::debug!(
            "[Speech] synthesized {} bytes for speaker {}",
            wav.len(),
            self.speaker
        );
        Ok(wav)
    }

    fn params(&self, text: &str) -> [(&'static str, String); 2] {
        [("text", text.to_string()), ("speaker", self.speaker.to_string())]
    }
}

async fn check_status(
    response: reqwest::Response,
    endpoint: &'static str,
) -> Result<reqwest::Response, SpeechError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(SpeechError::Status {
        endpoint,
        status: status.as_u16(),
        body,
    })
}

/// VOICEVOX synthesis followed by blocking playback on a worker thread.
pub struct VoicevoxSpeech<A: AudioSink> {
    client: VoicevoxClient,
    sink: Arc<A>,
}

impl<A: AudioSink> VoicevoxSpeech<A> {
    pub fn new(client: VoicevoxClient, sink: A) -> Self {
        Self {
            client,
            sink: Arc::new(sink),
        }
    }
}

#[async_trait]
impl<A: AudioSink> SpeechClient for VoicevoxSpeech<A> {
    async fn speak(&self, text: &str) -> Result<(), SpeechError> {
        let wav = self.client.synthesize(text).await?;

        // Decode + play block until the device has drained the last chunk,
        // so they run off the async runtime and are awaited here.
        let sink = Arc::clone(&self.sink);
        tokio::task::spawn_blocking(move || {
            let audio = PcmAudio::from_wav_bytes(&wav)?;
            tracing::debug!(
                "[Speech] playing {:.2}s of audio ({} Hz, {} ch)",
                audio.duration().as_secs_f32(),
                audio.sample_rate,
                audio.channels
            );
            sink.play(audio)
        })
        .await
        .map_err(|e| SpeechError::Worker(e.to_string()))?
    }
}
