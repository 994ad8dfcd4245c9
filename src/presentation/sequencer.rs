//! Presentation sequencer: turns a parsed reply into portrait, caption and
//! speech, and takes the caption down again after a fixed delay.
//!
//! Cycle: portrait update → caption shown (dismissal timer armed) → speech
//! awaited → caption dismissed by the timer. The timer and the speech call
//! are independent: the caption may disappear while speech is still playing,
//! or linger after it has finished.

use super::sanitize::sanitize_for_speech;
use super::state::PresentationState;
use super::surface::PresentationSurface;
use crate::ai::emotion::{self, UnknownEmotion};
use crate::ai::reply::ParsedResponse;
use crate::tts::{SpeechClient, SpeechError};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

/// How long a caption stays on screen.
pub const CAPTION_DISMISS_AFTER: Duration = Duration::from_secs(10);

#[derive(Debug, thiserror::Error)]
pub enum PresentationError {
    /// A validated emotion failed to resolve. Indicates a catalog bug.
    #[error("emotion catalog invariant violated: {0}")]
    Invariant(#[from] UnknownEmotion),
    #[error("speech failed: {0}")]
    Speech(#[source] SpeechError),
}

impl PresentationError {
    pub fn stage(&self) -> &'static str {
        match self {
            PresentationError::Invariant(_) => "catalog",
            PresentationError::Speech(_) => "speech",
        }
    }
}

pub struct PresentationSequencer {
    surface: Arc<dyn PresentationSurface>,
    speech: Arc<dyn SpeechClient>,
    state: Arc<Mutex<PresentationState>>,
    /// Held for the whole of `present`, so cycles never overlap.
    active: Mutex<()>,
    dismiss_timer: Mutex<Option<JoinHandle<()>>>,
}

impl PresentationSequencer {
    pub fn new(surface: Arc<dyn PresentationSurface>, speech: Arc<dyn SpeechClient>) -> Self {
        Self {
            surface,
            speech,
            state: Arc::new(Mutex::new(PresentationState::new())),
            active: Mutex::new(()),
            dismiss_timer: Mutex::new(None),
        }
    }

    /// Snapshot of the current presentation state.
    pub async fn state(&self) -> PresentationState {
        self.state.lock().await.clone()
    }

    /// Present one parsed reply. Returns once speech playback has finished;
    /// the caption keeps its own timer.
    pub async fn present(&self, parsed: ParsedResponse) -> Result<(), PresentationError> {
        let _active = self.active.lock().await;

        let asset = emotion::resolve(parsed.emotion.token()).map_err(|e| {
            tracing::error!("[Presentation] validated emotion did not resolve: {}", e);
            PresentationError::Invariant(e)
        })?;

        // A new utterance replaces whatever is still on screen.
        if let Some(timer) = self.dismiss_timer.lock().await.take() {
            timer.abort();
        }
        {
            let mut state = self.state.lock().await;
            if let Some(cycle) = state.dismiss_any() {
                tracing::debug!("[Presentation] replacing caption of cycle {}", cycle);
                self.surface.dismiss_caption();
            }
            state.update_portrait(asset);
        }
        self.surface.set_portrait(asset);

        // Caption keeps the original formatting; speech gets the cleaned copy.
        let caption = parsed.caption_text();
        let spoken = sanitize_for_speech(&caption);

        let cycle = self.state.lock().await.show_caption(caption.clone());
        self.surface.show_caption(&caption);
        self.arm_dismiss_timer(cycle).await;
        tracing::info!(
            "[Presentation] cycle {}: emotion={} asset={} lines={}",
            cycle,
            parsed.emotion,
            asset,
            parsed.body.len()
        );

        self.state.lock().await.begin_speech();
        let spoken_result = self.speech.speak(&spoken).await;
        self.state.lock().await.end_speech();

        spoken_result.map_err(|e| {
            tracing::warn!("[Presentation] cycle {} speech failed: {}", cycle, e);
            PresentationError::Speech(e)
        })
    }

    async fn arm_dismiss_timer(&self, cycle: u64) {
        let state = Arc::clone(&self.state);
        let surface = Arc::clone(&self.surface);
        let handle = tokio::spawn(async move {
            tokio::time::sleep(CAPTION_DISMISS_AFTER).await;
            let mut state = state.lock().await;
            if state.dismiss(cycle) {
                surface.dismiss_caption();
                tracing::debug!("[Presentation] cycle {} caption timed out", cycle);
            }
        });
        if let Some(previous) = self.dismiss_timer.lock().await.replace(handle) {
            previous.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::emotion::{AssetId, EmotionLabel};
    use crate::ai::reply::parse_reply;
    use crate::presentation::state::PresentationPhase;
    use async_trait::async_trait;
    use std::sync::Mutex as StdMutex;
    use tokio::time::Instant;

    #[derive(Debug, Clone, PartialEq)]
    enum Event {
        Portrait(AssetId),
        Caption(String),
        Dismiss,
    }

    #[derive(Default)]
    struct RecordingSurface {
        events: StdMutex<Vec<(Instant, Event)>>,
    }

    impl RecordingSurface {
        fn events(&self) -> Vec<Event> {
            self.events.lock().unwrap().iter().map(|(_, e)| e.clone()).collect()
        }

        fn dismissed_at(&self) -> Vec<Instant> {
            self.events
                .lock()
                .unwrap()
                .iter()
                .filter(|(_, e)| *e == Event::Dismiss)
                .map(|(t, _)| *t)
                .collect()
        }

        fn push(&self, event: Event) {
            self.events.lock().unwrap().push((Instant::now(), event));
        }
    }

    impl PresentationSurface for RecordingSurface {
        fn set_portrait(&self, asset: AssetId) {
            self.push(Event::Portrait(asset));
        }
        fn show_caption(&self, text: &str) {
            self.push(Event::Caption(text.to_string()));
        }
        fn dismiss_caption(&self) {
            self.push(Event::Dismiss);
        }
    }

    struct FakeSpeech {
        spoken: StdMutex<Vec<String>>,
        takes: Duration,
        fail: bool,
    }

    impl FakeSpeech {
        fn new(takes: Duration, fail: bool) -> Self {
            Self {
                spoken: StdMutex::new(Vec::new()),
                takes,
                fail,
            }
        }
    }

    #[async_trait]
    impl SpeechClient for FakeSpeech {
        async fn speak(&self, text: &str) -> Result<(), SpeechError> {
            self.spoken.lock().unwrap().push(text.to_string());
            tokio::time::sleep(self.takes).await;
            if self.fail {
                return Err(SpeechError::Status {
                    endpoint: "synthesis",
                    status: 500,
                    body: String::new(),
                });
            }
            Ok(())
        }
    }

    fn setup(
        takes: Duration,
        fail: bool,
    ) -> (PresentationSequencer, Arc<RecordingSurface>, Arc<FakeSpeech>) {
        let surface = Arc::new(RecordingSurface::default());
        let speech = Arc::new(FakeSpeech::new(takes, fail));
        let seq = PresentationSequencer::new(surface.clone(), speech.clone());
        (seq, surface, speech)
    }

    #[tokio::test(start_paused = true)]
    async fn presents_portrait_caption_and_speech_in_order() {
        let (seq, surface, speech) = setup(Duration::from_secs(1), false);
        seq.present(parse_reply("こんにちは\n笑顔").unwrap()).await.unwrap();

        assert_eq!(
            surface.events(),
            vec![
                Event::Portrait(EmotionLabel::Smile.asset()),
                Event::Caption("こんにちは\n".to_string()),
            ]
        );
        assert_eq!(*speech.spoken.lock().unwrap(), vec!["こんにちは".to_string()]);

        let state = seq.state().await;
        assert_eq!(state.portrait().as_str(), "0000");
        assert!(state.caption_visible());
        assert!(!state.speech_in_flight());
    }

    #[tokio::test(start_paused = true)]
    async fn caption_is_dismissed_ten_seconds_after_it_appears() {
        let (seq, surface, _speech) = setup(Duration::from_secs(2), false);
        let shown_at = Instant::now();
        seq.present(parse_reply("またね\n微笑み").unwrap()).await.unwrap();

        tokio::time::sleep(Duration::from_secs(7)).await;
        assert!(seq.state().await.caption_visible());

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(surface.dismissed_at(), vec![shown_at + CAPTION_DISMISS_AFTER]);
        assert_eq!(seq.state().await.phase(), PresentationPhase::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn caption_timer_ignores_long_speech() {
        let (seq, surface, _speech) = setup(Duration::from_secs(25), false);
        let shown_at = Instant::now();
        seq.present(parse_reply("とても長いお話\n目閉じ").unwrap()).await.unwrap();

        // present() only returns after speech, which outlived the caption.
        assert_eq!(Instant::now(), shown_at + Duration::from_secs(25));
        assert_eq!(surface.dismissed_at(), vec![shown_at + CAPTION_DISMISS_AFTER]);
        assert_eq!(seq.state().await.phase(), PresentationPhase::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn speech_failure_is_reported_but_caption_stays() {
        let (seq, surface, _speech) = setup(Duration::from_millis(10), true);
        let err = seq
            .present(parse_reply("えっ\n驚き").unwrap())
            .await
            .unwrap_err();
        assert_eq!(err.stage(), "speech");
        assert!(seq.state().await.caption_visible());

        tokio::time::sleep(CAPTION_DISMISS_AFTER).await;
        assert!(!seq.state().await.caption_visible());
        assert_eq!(surface.dismissed_at().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn empty_body_shows_empty_caption_and_speaks_empty_text() {
        let (seq, surface, speech) = setup(Duration::ZERO, false);
        seq.present(parse_reply("ジト目").unwrap()).await.unwrap();

        assert_eq!(
            surface.events(),
            vec![
                Event::Portrait(EmotionLabel::Glare.asset()),
                Event::Caption(String::new()),
            ]
        );
        assert_eq!(*speech.spoken.lock().unwrap(), vec![String::new()]);
        assert_eq!(seq.state().await.portrait().as_str(), "0002");
    }

    #[tokio::test(start_paused = true)]
    async fn caption_is_unsanitized_but_speech_is_clean() {
        let (seq, surface, speech) = setup(Duration::ZERO, false);
        seq.present(parse_reply("ﾊﾛｰ\u{200b}\n\tＯＫ\n愛情").unwrap())
            .await
            .unwrap();

        assert!(surface
            .events()
            .contains(&Event::Caption("ﾊﾛｰ\u{200b}\n\tＯＫ\n".to_string())));
        assert_eq!(*speech.spoken.lock().unwrap(), vec!["ハローOK".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn new_utterance_replaces_previous_caption() {
        let (seq, surface, _speech) = setup(Duration::ZERO, false);
        let first_at = Instant::now();
        seq.present(parse_reply("一つ目\n笑顔").unwrap()).await.unwrap();

        tokio::time::sleep(Duration::from_secs(5)).await;
        let second_at = Instant::now();
        seq.present(parse_reply("二つ目\n困惑").unwrap()).await.unwrap();

        // Old caption taken down immediately, old timer cancelled.
        assert_eq!(surface.dismissed_at(), vec![second_at]);
        tokio::time::sleep(Duration::from_secs(6)).await;
        assert!(seq.state().await.caption_visible(), "first timer must not fire");
        assert!(Instant::now() > first_at + CAPTION_DISMISS_AFTER);

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(
            surface.dismissed_at(),
            vec![second_at, second_at + CAPTION_DISMISS_AFTER]
        );
        assert_eq!(seq.state().await.portrait().as_str(), "0010");
    }
}
