use crate::companion::ExitCode;
use serde::Serialize;
use tauri::AppHandle;
use tauri_plugin_dialog::{DialogExt, MessageDialogButtons, MessageDialogKind};

pub const QUIT_CONFIRMATION: &str = "アプリケーションを終了しますか？";

#[derive(Serialize)]
pub struct EngineInfo {
    pub name: String,
    pub version: String,
    pub platform: String,
}

/// Returns basic app metadata for the frontend to display.
#[tauri::command]
pub fn get_engine_info() -> EngineInfo {
    EngineInfo {
        name: "Desktop Mate".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        platform: std::env::consts::OS.to_string(),
    }
}

/// Ask for confirmation, then exit normally.
#[tauri::command]
pub fn request_quit(app: AppHandle) {
    let exit_handle = app.clone();
    app.dialog()
        .message(QUIT_CONFIRMATION)
        .title("確認")
        .kind(MessageDialogKind::Info)
        .buttons(MessageDialogButtons::OkCancel)
        .show(move |confirmed| {
            if confirmed {
                tracing::info!("[App] Quit confirmed");
                exit_handle.exit(ExitCode::Normal.code());
            }
        });
}
