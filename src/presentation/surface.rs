use crate::ai::emotion::AssetId;

/// The visible side of a presentation: the portrait window and the caption
/// window. Implementations own the actual widgets; calls never fail from the
/// sequencer's point of view, so implementations log their own errors.
pub trait PresentationSurface: Send + Sync {
    fn set_portrait(&self, asset: AssetId);

    /// Show `text` in the caption window, replacing any previous caption.
    fn show_caption(&self, text: &str);

    fn dismiss_caption(&self);
}

/// Surface that only logs. Used when no window system is attached.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSurface;

impl PresentationSurface for LogSurface {
    fn set_portrait(&self, asset: AssetId) {
        tracing::info!("[Presentation] portrait -> {}", asset);
    }

    fn show_caption(&self, text: &str) {
        tracing::info!("[Presentation] caption: {}", text.trim_end());
    }

    fn dismiss_caption(&self) {
        tracing::info!("[Presentation] caption dismissed");
    }
}
