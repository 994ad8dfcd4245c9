pub mod audio;
pub mod config;
pub mod interface;
#[cfg(feature = "audio")]
pub mod playback;
pub mod voicevox;

pub use audio::PcmAudio;
pub use config::{load_config, SpeechConfig};
pub use interface::{AudioSink, SilentSpeech, SpeechClient, SpeechError};
pub use voicevox::{VoicevoxClient, VoicevoxSpeech};
