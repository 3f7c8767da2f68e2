//! Replay-Warden: per-player replay recording watchdog.
//!
//! Runs as a sidecar next to the host: reads the host console stream from
//! stdin, writes recorder commands and notices to stdout, and keeps a
//! rotating replay capture armed for every active session.

mod app;
mod command;
mod config;
mod console;
mod error;
mod feed;
mod host_event;
#[cfg(test)]
mod tests;

pub(crate) use {
    app::App,
    command::CommandDeps,
    config::ConfigStore,
    console::HostConsole,
    error::{AppError, Result as AppResult},
    host_event::{CommandSource, HostEvent},
};

use std::{io::BufRead, sync::Arc};

use replay_warden_core::{RotationEngine, RotationSchedule};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

#[tokio::main]
async fn main() {
    // Logs go to stderr: stdout is the host command channel and must carry
    // nothing but protocol lines.
    tracing_subscriber::fmt()
        .with_env_filter("replay_warden=debug")
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run().await {
        error!(error = ?e, "Replay-Warden failed");
        std::process::exit(1);
    }
}

async fn run() -> AppResult<()> {
    let schedule = Arc::new(RotationSchedule::new(config::DEFAULT_CUT_MINUTES));

    let store = Arc::new(ConfigStore::from_project_dirs(Arc::clone(&schedule))?);
    let loaded = store.load();
    info!(
        cut_time_minutes = loaded.cut_time_minutes,
        "Automatic cut interval configured"
    );

    let console = Arc::new(HostConsole::stdout());
    let control: Arc<dyn replay_warden_core::ReplayControl> = console.clone();
    let engine = RotationEngine::with_default_settle(control, schedule);

    let (event_tx, event_rx) = mpsc::channel(64);

    // Feed forwarding via a single persistent blocking task. Stdin has a
    // blocking line iterator; when event_rx is dropped (main loop exits),
    // blocking_send fails and the reader stops at the next line.
    let feed_tx = event_tx.clone();
    tokio::task::spawn_blocking(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            let Some(event) = feed::parse_line(&line) else {
                continue;
            };
            debug!(?event, "Host event");
            if feed_tx.blocking_send(event).is_err() {
                break;
            }
        }
    });

    // Ctrl-C translates into a regular shutdown event for the app loop.
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            if event_tx.send(HostEvent::Shutdown).await.is_err() {
                warn!("App loop already gone at shutdown");
            }
        }
    });

    let app = App {
        deps: CommandDeps {
            engine,
            store,
            console,
        },
        event_rx,
    };
    app.run().await;

    Ok(())
}
