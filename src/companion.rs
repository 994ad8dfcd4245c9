//! One conversational turn end to end: chat, parse, present.

use crate::ai::emotion::EmotionLabel;
use crate::ai::reply::{parse_reply, MalformedReply};
use crate::llm::{ChatError, ChatSession};
use crate::presentation::{PresentationError, PresentationSequencer, PresentationState};
use serde::Serialize;
use tokio::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Normal = 0,
    Fatal = 1,
}

impl ExitCode {
    pub fn code(self) -> i32 {
        self as i32
    }
}

/// Why a turn could not complete. Everything except `EmptyInput` ends the
/// session.
#[derive(Debug, thiserror::Error)]
pub enum FatalError {
    #[error("nothing to say")]
    EmptyInput,
    #[error("chat failed: {0}")]
    Chat(#[from] ChatError),
    #[error("{0}")]
    MalformedReply(#[from] MalformedReply),
    #[error("presentation failed: {0}")]
    Presentation(#[from] PresentationError),
}

impl FatalError {
    pub fn is_fatal(&self) -> bool {
        !matches!(self, FatalError::EmptyInput)
    }

    pub fn exit_code(&self) -> Option<ExitCode> {
        self.is_fatal().then_some(ExitCode::Fatal)
    }

    /// Text for the warning dialog. A malformed reply shows the model's raw
    /// text so the user can see what came back.
    pub fn dialog_text(&self) -> String {
        match self {
            FatalError::MalformedReply(m) => match m.raw() {
                Some(raw) => raw.to_string(),
                None => m.to_string(),
            },
            other => other.to_string(),
        }
    }
}

/// Result of a completed turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TurnOutcome {
    pub emotion: EmotionLabel,
    pub caption: String,
}

pub struct Companion {
    session: Mutex<ChatSession>,
    sequencer: PresentationSequencer,
}

impl Companion {
    pub fn new(session: ChatSession, sequencer: PresentationSequencer) -> Self {
        Self {
            session: Mutex::new(session),
            sequencer,
        }
    }

    /// Run one turn. Returns once the reply has been spoken.
    pub async fn talk(&self, text: &str) -> Result<TurnOutcome, FatalError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(FatalError::EmptyInput);
        }

        let raw = {
            let mut session = self.session.lock().await;
            session.send(text).await.map_err(|e| {
                tracing::error!("[Companion] chat via {} failed: {}", session.provider_id(), e);
                FatalError::Chat(e)
            })?
        };

        let parsed = parse_reply(&raw).map_err(|e| {
            tracing::error!("[Companion] {} ({} chars)", e, raw.chars().count());
            FatalError::MalformedReply(e)
        })?;

        let outcome = TurnOutcome {
            emotion: parsed.emotion,
            caption: parsed.caption_text(),
        };
        self.sequencer.present(parsed).await.map_err(|e| {
            tracing::error!("[Companion] presentation failed at {}: {}", e.stage(), e);
            FatalError::Presentation(e)
        })?;
        Ok(outcome)
    }

    pub async fn presentation_state(&self) -> PresentationState {
        self.sequencer.state().await
    }

    pub async fn turns(&self) -> usize {
        self.session.lock().await.history().len() / 2
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::emotion::AssetId;
    use crate::llm::{ChatProvider, Message};
    use crate::presentation::PresentationSurface;
    use crate::tts::{SpeechClient, SpeechError};
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex as StdMutex};

    struct OneReply(StdMutex<Option<Result<String, ChatError>>>);

    #[async_trait]
    impl ChatProvider for OneReply {
        async fn chat(&self, _system: &str, _history: &[Message]) -> Result<String, ChatError> {
            self.0.lock().unwrap().take().unwrap_or(Err(ChatError::EmptyResponse))
        }

        fn id(&self) -> &str {
            "one"
        }
    }

    #[derive(Default)]
    struct CountingSurface {
        portraits: StdMutex<Vec<AssetId>>,
    }

    impl PresentationSurface for CountingSurface {
        fn set_portrait(&self, asset: AssetId) {
            self.portraits.lock().unwrap().push(asset);
        }
        fn show_caption(&self, _text: &str) {}
        fn dismiss_caption(&self) {}
    }

    struct Speech(Result<(), ()>);

    #[async_trait]
    impl SpeechClient for Speech {
        async fn speak(&self, _text: &str) -> Result<(), SpeechError> {
            self.0.map_err(|_| SpeechError::Output("no device".to_string()))
        }
    }

    fn companion(
        reply: Result<String, ChatError>,
        speech_ok: bool,
    ) -> (Companion, Arc<CountingSurface>) {
        let provider = Arc::new(OneReply(StdMutex::new(Some(reply))));
        let surface = Arc::new(CountingSurface::default());
        let speech = Arc::new(Speech(if speech_ok { Ok(()) } else { Err(()) }));
        let sequencer = PresentationSequencer::new(surface.clone(), speech);
        let session = ChatSession::new(provider, "sys".to_string());
        (Companion::new(session, sequencer), surface)
    }

    #[tokio::test]
    async fn well_formed_reply_is_presented() {
        let (companion, surface) =
            companion(Ok("おはよう！\n今日もがんばろう\n笑顔".to_string()), true);
        let outcome = companion.talk("おはよう").await.unwrap();
        assert_eq!(outcome.emotion, EmotionLabel::Smile);
        assert_eq!(outcome.caption, "おはよう！\n今日もがんばろう\n");
        assert_eq!(*surface.portraits.lock().unwrap(), vec![AssetId::DEFAULT]);
        assert_eq!(companion.turns().await, 1);
    }

    #[tokio::test]
    async fn malformed_reply_skips_presentation() {
        let (companion, surface) = companion(Ok("こんにちは\nにっこり".to_string()), true);
        let err = companion.talk("やあ").await.unwrap_err();
        assert!(matches!(err, FatalError::MalformedReply(_)));
        assert_eq!(err.exit_code(), Some(ExitCode::Fatal));
        assert_eq!(err.dialog_text(), "こんにちは\nにっこり");
        assert!(surface.portraits.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn blank_reply_dialog_shows_what_was_sent() {
        let (companion, surface) = companion(Ok("   \n\t".to_string()), true);
        let err = companion.talk("やあ").await.unwrap_err();
        assert!(matches!(err, FatalError::MalformedReply(MalformedReply::Empty { .. })));
        assert_eq!(err.dialog_text(), "   \n\t");
        assert!(surface.portraits.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn chat_failure_is_fatal() {
        let (companion, surface) = companion(
            Err(ChatError::Api {
                status: 500,
                body: "boom".to_string(),
            }),
            true,
        );
        let err = companion.talk("やあ").await.unwrap_err();
        assert!(err.is_fatal());
        assert!(err.dialog_text().contains("500"));
        assert!(surface.portraits.lock().unwrap().is_empty());
        assert_eq!(companion.turns().await, 0);
    }

    #[tokio::test]
    async fn speech_failure_is_fatal_after_portrait() {
        let (companion, surface) = companion(Ok("ごめんね\n泣き".to_string()), false);
        let err = companion.talk("どうしたの").await.unwrap_err();
        assert!(matches!(err, FatalError::Presentation(PresentationError::Speech(_))));
        assert_eq!(surface.portraits.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn blank_input_is_rejected_without_a_request() {
        let (companion, _surface) = companion(Ok("x\n笑顔".to_string()), true);
        let err = companion.talk("   \n").await.unwrap_err();
        assert!(matches!(err, FatalError::EmptyInput));
        assert!(!err.is_fatal());
        assert_eq!(err.exit_code(), None);
        // The scripted reply is still unconsumed.
        assert!(companion.talk("hi").await.is_ok());
    }

    #[test]
    fn exit_codes() {
        assert_eq!(ExitCode::Normal.code(), 0);
        assert_eq!(ExitCode::Fatal.code(), 1);
    }
}
