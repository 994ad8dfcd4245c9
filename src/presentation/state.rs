use crate::ai::emotion::AssetId;
use serde::Serialize;

/// Where the current presentation cycle is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PresentationPhase {
    Idle,
    PortraitUpdated,
    CaptionVisible,
    /// Caption timer fired while speech was still playing.
    CaptionDismissed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum CaptionState {
    Hidden,
    Visible { cycle: u64, text: String },
}

/// The single on-screen presentation: one portrait, at most one caption.
#[derive(Debug, Clone, Serialize)]
pub struct PresentationState {
    portrait: AssetId,
    caption: CaptionState,
    phase: PresentationPhase,
    speech_in_flight: bool,
    #[serde(skip)]
    next_cycle: u64,
}

impl Default for PresentationState {
    fn default() -> Self {
        Self::new()
    }
}

impl PresentationState {
    pub fn new() -> Self {
        Self {
            portrait: AssetId::DEFAULT,
            caption: CaptionState::Hidden,
            phase: PresentationPhase::Idle,
            speech_in_flight: false,
            next_cycle: 1,
        }
    }

    pub fn portrait(&self) -> AssetId {
        self.portrait
    }

    pub fn caption(&self) -> &CaptionState {
        &self.caption
    }

    pub fn phase(&self) -> PresentationPhase {
        self.phase
    }

    pub fn speech_in_flight(&self) -> bool {
        self.speech_in_flight
    }

    pub fn caption_visible(&self) -> bool {
        matches!(self.caption, CaptionState::Visible { .. })
    }

    pub fn update_portrait(&mut self, asset: AssetId) {
        self.portrait = asset;
        self.phase = PresentationPhase::PortraitUpdated;
    }

    /// Show a caption and return the id of the cycle that owns it.
    pub fn show_caption(&mut self, text: String) -> u64 {
        let cycle = self.next_cycle;
        self.next_cycle += 1;
        self.caption = CaptionState::Visible { cycle, text };
        self.phase = PresentationPhase::CaptionVisible;
        cycle
    }

    /// Hide the caption if it still belongs to `cycle`.
    pub fn dismiss(&mut self, cycle: u64) -> bool {
        match self.caption {
            CaptionState::Visible { cycle: current, .. } if current == cycle => {
                self.hide();
                true
            }
            _ => false,
        }
    }

    /// Hide whatever caption is showing. Returns its cycle id.
    pub fn dismiss_any(&mut self) -> Option<u64> {
        match self.caption {
            CaptionState::Visible { cycle, .. } => {
                self.hide();
                Some(cycle)
            }
            CaptionState::Hidden => None,
        }
    }

    pub fn begin_speech(&mut self) {
        self.speech_in_flight = true;
    }

    pub fn end_speech(&mut self) {
        self.speech_in_flight = false;
        if self.phase == PresentationPhase::CaptionDismissed {
            self.phase = PresentationPhase::Idle;
        }
    }

    fn hide(&mut self) {
        self.caption = CaptionState::Hidden;
        self.phase = if self.speech_in_flight {
            PresentationPhase::CaptionDismissed
        } else {
            PresentationPhase::Idle
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::emotion::EmotionLabel;

    #[test]
    fn starts_idle_with_default_portrait() {
        let state = PresentationState::new();
        assert_eq!(state.phase(), PresentationPhase::Idle);
        assert_eq!(state.portrait().as_str(), "0000");
        assert!(!state.caption_visible());
    }

    #[test]
    fn full_cycle_with_speech_finishing_first() {
        let mut state = PresentationState::new();
        state.update_portrait(EmotionLabel::Anger.asset());
        assert_eq!(state.phase(), PresentationPhase::PortraitUpdated);

        let cycle = state.show_caption("もう！".to_string());
        state.begin_speech();
        assert_eq!(state.phase(), PresentationPhase::CaptionVisible);

        state.end_speech();
        assert_eq!(state.phase(), PresentationPhase::CaptionVisible);
        assert!(state.dismiss(cycle));
        assert_eq!(state.phase(), PresentationPhase::Idle);
        assert_eq!(state.portrait().as_str(), "0004");
    }

    #[test]
    fn timer_firing_during_speech_passes_through_dismissed() {
        let mut state = PresentationState::new();
        let cycle = state.show_caption("長いセリフ".to_string());
        state.begin_speech();

        assert!(state.dismiss(cycle));
        assert_eq!(state.phase(), PresentationPhase::CaptionDismissed);
        assert!(!state.caption_visible());

        state.end_speech();
        assert_eq!(state.phase(), PresentationPhase::Idle);
    }

    #[test]
    fn stale_cycle_does_not_dismiss_newer_caption() {
        let mut state = PresentationState::new();
        let first = state.show_caption("一".to_string());
        assert_eq!(state.dismiss_any(), Some(first));
        let second = state.show_caption("二".to_string());
        assert_ne!(first, second);

        assert!(!state.dismiss(first));
        assert!(state.caption_visible());
        assert!(state.dismiss(second));
    }

    #[test]
    fn serializes_for_the_front_end() {
        let mut state = PresentationState::new();
        state.show_caption("やあ".to_string());
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["portrait"], "0000");
        assert_eq!(json["caption"]["state"], "visible");
        assert_eq!(json["caption"]["text"], "やあ");
        assert_eq!(json["phase"], "caption_visible");
        assert!(json.get("next_cycle").is_none());
    }
}
