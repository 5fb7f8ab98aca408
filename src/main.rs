//! Gemini Chat
//!
//! Terminal chat with the Gemini API. Each line typed on stdin is sent,
//! together with the whole conversation so far, and the reply is printed
//! as the next transcript line. Logs go to stderr (`RUST_LOG=debug`).

use gemini_chat::display::DisplayQueue;
use gemini_chat::session::{ChatSession, SubmitOutcome};
use gemini_chat::terminal::TerminalView;
use gemini_chat::{load_credential, AppConfig, GeminiClient};
use std::io::BufRead;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing on stderr so stdout carries only the transcript
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    // Load configuration
    let config = AppConfig::from_env();
    config.validate()?;
    info!("Configuration loaded: {:?}", config);

    // A missing or broken credential is not fatal; requests just fail later
    let api_key = match load_credential(&config.credential_path) {
        Ok(Some(key)) => {
            info!(path = %config.credential_path.display(), "API key loaded");
            Some(key)
        }
        Ok(None) => {
            warn!(
                path = %config.credential_path.display(),
                "Credential file not found, requests will fail until it is created"
            );
            None
        }
        Err(e) => {
            warn!("Failed to load credential: {}", e);
            None
        }
    };

    let client = Arc::new(GeminiClient::new(config.gemini.clone(), api_key)?);
    println!(
        "Chatting with {}. Type a message and press Enter (Ctrl+C to quit).",
        client.model()
    );

    let display = DisplayQueue::new();
    let session = ChatSession::new(client, display.clone(), Handle::current());
    let mut view = TerminalView::new(std::io::stdout());

    let mut lines = spawn_stdin_reader();
    let mut frame = tokio::time::interval(Duration::from_millis(config.frame_interval_ms));
    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);
    let mut stdin_open = true;

    loop {
        tokio::select! {
            _ = &mut shutdown => break,

            _ = frame.tick() => {
                display.pump(&mut view);
                // Piped input: leave once stdin is done and the last reply is shown
                if !stdin_open && !session.is_busy() && display.is_empty() {
                    break;
                }
            }

            line = lines.recv(), if stdin_open => match line {
                Some(line) => {
                    if let SubmitOutcome::Rejected(reason) = session.submit(&line) {
                        debug!(?reason, "Input ignored");
                    }
                }
                None => {
                    info!("stdin closed");
                    stdin_open = false;
                }
            },
        }
    }

    // Teardown: abort any in-flight request, show what is left, release the client
    session.shutdown();
    drop(session);
    display.pump(&mut view);

    info!("Chat session closed");
    Ok(())
}

/// Read stdin on a dedicated thread so a pending read never holds up shutdown
fn spawn_stdin_reader() -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            match line {
                Ok(line) => {
                    if tx.send(line).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    warn!("Failed to read stdin: {}", e);
                    break;
                }
            }
        }
    });
    rx
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down...");
        },
        _ = terminate => {
            info!("Received SIGTERM, shutting down...");
        },
    }
}
