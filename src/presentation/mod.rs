pub mod sanitize;
pub mod sequencer;
pub mod state;
pub mod surface;
#[cfg(feature = "desktop")]
pub mod window;

pub use sanitize::sanitize_for_speech;
pub use sequencer::{PresentationError, PresentationSequencer, CAPTION_DISMISS_AFTER};
pub use state::{CaptionState, PresentationPhase, PresentationState};
pub use surface::{LogSurface, PresentationSurface};
