//! Headless front end: reads one utterance per line from stdin and presents
//! replies through the log. `/quit` or end of input exits normally.

use anyhow::Context;
use desktop_mate_lib::presentation::LogSurface;
use desktop_mate_lib::{
    build_companion, config, load_settings, logging, check_speech_engine, speech_client,
};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();

    let settings = load_settings(&config::app_data_dir());
    check_speech_engine(&settings.speech).await;
    let companion = build_companion(
        &settings,
        Arc::new(LogSurface),
        speech_client(&settings.speech),
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("reading stdin")? {
        if line.trim() == "/quit" {
            break;
        }
        match companion.talk(&line).await {
            Ok(outcome) => println!("[{}]\n{}", outcome.emotion, outcome.caption),
            Err(e) => match e.exit_code() {
                Some(code) => {
                    eprintln!("error: {}", e.dialog_text());
                    std::process::exit(code.code());
                }
                None => tracing::debug!("[Console] {}", e),
            },
        }
    }

    tracing::info!("[Console] Bye");
    Ok(())
}
