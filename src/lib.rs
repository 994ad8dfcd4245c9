pub mod ai;
#[cfg(feature = "desktop")]
pub mod commands;
pub mod companion;
pub mod config;
pub mod llm;
pub mod logging;
pub mod presentation;
pub mod tts;

use crate::companion::Companion;
use crate::llm::{ChatSession, LlmConfig};
use crate::presentation::{PresentationSequencer, PresentationSurface};
use crate::tts::{SilentSpeech, SpeechClient, SpeechConfig};
use std::path::Path;
use std::sync::Arc;

/// Persisted settings read at startup.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    pub llm: LlmConfig,
    pub speech: SpeechConfig,
}

/// Read `environ.env` and the JSON configs from `data_dir`. Missing files
/// fall back to defaults; `environ.env` is also looked up in the working
/// directory.
pub fn load_settings(data_dir: &Path) -> Settings {
    for env_path in [
        Path::new(config::ENV_FILE_NAME).to_path_buf(),
        data_dir.join(config::ENV_FILE_NAME),
    ] {
        if let Err(e) = config::load_env_file(&env_path) {
            tracing::warn!("[Config] {}", e);
        }
    }
    Settings {
        llm: llm::llm_config::load_config(&data_dir.join("llm_config.json")),
        speech: tts::load_config(&data_dir.join("speech_config.json")),
    }
}

/// Speech backend for the current build: VOICEVOX through the default audio
/// device when audio is compiled in and enabled, silence otherwise.
pub fn speech_client(config: &SpeechConfig) -> Arc<dyn SpeechClient> {
    if !config.enabled {
        tracing::info!("[TTS] Speech disabled by config");
        return Arc::new(SilentSpeech);
    }
    #[cfg(feature = "audio")]
    {
        let client = tts::VoicevoxClient::from_config(config);
        tracing::info!(
            "[TTS] VOICEVOX at {} (speaker {})",
            config.base_url,
            client.speaker()
        );
        Arc::new(tts::VoicevoxSpeech::new(client, tts::playback::CpalSink))
    }
    #[cfg(not(feature = "audio"))]
    {
        tracing::warn!("[TTS] Built without audio output; replies will not be spoken");
        Arc::new(SilentSpeech)
    }
}

/// Log whether the speech engine answers. Startup continues either way.
pub async fn check_speech_engine(config: &SpeechConfig) {
    if !config.enabled {
        return;
    }
    let client = tts::VoicevoxClient::from_config(config);
    if client.is_available().await {
        tracing::info!("[TTS] VOICEVOX engine is reachable at {}", config.base_url);
    } else {
        tracing::warn!(
            "[TTS] VOICEVOX engine not reachable at {}; speaking will fail",
            config.base_url
        );
    }
}

pub fn build_companion(
    settings: &Settings,
    surface: Arc<dyn PresentationSurface>,
    speech: Arc<dyn SpeechClient>,
) -> Companion {
    let provider = llm::build_provider(&settings.llm);
    let persona = settings
        .llm
        .system_prompt
        .as_deref()
        .unwrap_or(ai::prompts::DEFAULT_PERSONA_PROMPT);
    let session = ChatSession::new(provider, ai::prompts::system_instruction(persona));
    Companion::new(session, PresentationSequencer::new(surface, speech))
}

#[cfg(feature = "desktop")]
#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    use tauri::Manager;

    logging::init();

    tauri::Builder::default()
        .plugin(tauri_plugin_dialog::init())
        .invoke_handler(tauri::generate_handler![
            commands::system::get_engine_info,
            commands::system::request_quit,
            commands::chat::talk,
        ])
        .setup(|app| {
            let app_data = config::app_data_dir();
            let settings = load_settings(&app_data);

            let speech_config = settings.speech.clone();
            tauri::async_runtime::spawn(async move {
                check_speech_engine(&speech_config).await;
            });

            let surface = Arc::new(presentation::window::TauriSurface::new(app.handle().clone()));
            let speech = speech_client(&settings.speech);
            let companion = build_companion(&settings, surface, speech);
            app.manage(Arc::new(companion));

            if let Err(e) = presentation::window::dock_bottom_right(app.handle()) {
                tracing::warn!("[App] Failed to position windows: {}", e);
            }
            Ok(())
        })
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
