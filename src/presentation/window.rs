//! Tauri-backed presentation surface. The portrait and caption windows are
//! plain webviews that listen for the events emitted here.

use super::surface::PresentationSurface;
use crate::ai::emotion::AssetId;
use serde::Serialize;
use tauri::{AppHandle, Emitter, Manager};

pub const PORTRAIT_WINDOW: &str = "portrait";
pub const CAPTION_WINDOW: &str = "caption";

#[derive(Debug, Clone, Serialize)]
pub struct PortraitChanged {
    pub asset: AssetId,
    pub path: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CaptionShow {
    pub text: String,
}

pub struct TauriSurface {
    app: AppHandle,
}

impl TauriSurface {
    pub fn new(app: AppHandle) -> Self {
        Self { app }
    }

    fn emit<S: Serialize + Clone>(&self, event: &str, payload: S) {
        if let Err(e) = self.app.emit(event, payload) {
            tracing::warn!("[Window] Failed to emit '{}': {}", event, e);
        }
    }

    fn caption_window(&self, visible: bool) {
        let Some(window) = self.app.get_webview_window(CAPTION_WINDOW) else {
            tracing::warn!("[Window] No '{}' window", CAPTION_WINDOW);
            return;
        };
        let result = if visible { window.show() } else { window.hide() };
        if let Err(e) = result {
            tracing::warn!("[Window] Failed to toggle caption window: {}", e);
        }
    }
}

impl PresentationSurface for TauriSurface {
    fn set_portrait(&self, asset: AssetId) {
        self.emit(
            "portrait-changed",
            PortraitChanged {
                asset,
                path: asset.image_path(),
            },
        );
    }

    fn show_caption(&self, text: &str) {
        self.emit(
            "caption-show",
            CaptionShow {
                text: text.to_string(),
            },
        );
        self.caption_window(true);
    }

    fn dismiss_caption(&self) {
        self.caption_window(false);
        self.emit("caption-dismiss", ());
    }
}

/// Move the portrait and caption windows to the bottom-right corner of the
/// primary monitor, caption stacked above the portrait.
pub fn dock_bottom_right(app: &AppHandle) -> tauri::Result<()> {
    let Some(portrait) = app.get_webview_window(PORTRAIT_WINDOW) else {
        return Ok(());
    };
    let Some(monitor) = portrait.primary_monitor()? else {
        tracing::warn!("[Window] No primary monitor; leaving windows in place");
        return Ok(());
    };

    let screen = monitor.size();
    let origin = monitor.position();
    let size = portrait.outer_size()?;
    let x = origin.x + screen.width as i32 - size.width as i32;
    let y = origin.y + screen.height as i32 - size.height as i32;
    portrait.set_position(tauri::PhysicalPosition::new(x, y))?;

    if let Some(caption) = app.get_webview_window(CAPTION_WINDOW) {
        let caption_size = caption.outer_size()?;
        caption.set_position(tauri::PhysicalPosition::new(
            origin.x + screen.width as i32 - caption_size.width as i32,
            (y - caption_size.height as i32).max(origin.y),
        ))?;
    }
    Ok(())
}
