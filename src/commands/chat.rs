use crate::companion::{Companion, FatalError, TurnOutcome};
use std::sync::Arc;
use tauri::{AppHandle, State};
use tauri_plugin_dialog::{DialogExt, MessageDialogKind};

/// Run one conversational turn for the text typed into the command window.
///
/// Blank input is returned to the frontend as an error. Any other failure
/// shows a warning dialog and terminates the app with exit code 1 once it
/// is closed.
#[tauri::command]
pub async fn talk(
    app: AppHandle,
    message: String,
    companion: State<'_, Arc<Companion>>,
) -> Result<TurnOutcome, String> {
    let companion = companion.inner().clone();
    match companion.talk(&message).await {
        Ok(outcome) => Ok(outcome),
        Err(e) => match e.exit_code() {
            Some(code) => {
                report_fatal(&app, &e, code.code());
                Err(e.to_string())
            }
            None => Err(e.to_string()),
        },
    }
}

fn report_fatal(app: &AppHandle, error: &FatalError, code: i32) {
    tracing::error!("[App] Fatal: {}; exiting with {}", error, code);
    let exit_handle = app.clone();
    app.dialog()
        .message(error.dialog_text())
        .title("error")
        .kind(MessageDialogKind::Warning)
        .show(move |_| exit_handle.exit(code));
}
