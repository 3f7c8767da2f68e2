use crate::{CommandDeps, HostEvent, command};

use replay_warden_core::is_synthetic;
use tokio::sync::mpsc;
use tracing::{debug, info, instrument};

/// Session lifecycle controller.
///
/// Consumes host events from the feed and drives the rotation engine:
/// joins start a capture and arm the countdown, leaves cancel it, commands
/// go through the command surface. Runs on the async runtime until the feed
/// closes or a shutdown event arrives.
pub struct App {
    pub(crate) deps: CommandDeps,
    pub(crate) event_rx: mpsc::Receiver<HostEvent>,
}

impl App {
    /// Run the main event loop.
    #[instrument(skip(self))]
    pub(crate) async fn run(mut self) {
        info!("Replay-Warden starting");

        while let Some(event) = self.event_rx.recv().await {
            match event {
                HostEvent::PlayerJoined { key } => self.on_joined(&key),
                HostEvent::PlayerLeft { key } => self.on_left(&key),
                HostEvent::Command { source, args } => {
                    command::dispatch(&self.deps, &source, &args);
                }
                HostEvent::Shutdown => {
                    info!("Shutdown requested");
                    break;
                }
            }
        }

        // Best-effort sweep so no countdown task outlives the loop.
        self.deps.engine.shutdown();
        info!("Replay-Warden shut down");
    }

    /// Join: filter synthetic keys with a broadcast notice, otherwise start
    /// a capture and arm the rotation countdown.
    #[instrument(skip(self))]
    fn on_joined(&self, key: &str) {
        if is_synthetic(key) {
            info!(key, "Synthetic session joined, recording skipped");
            self.deps.console.broadcast(&format!(
                "{key} looks like a fake player, replay recording aborted"
            ));
            return;
        }

        self.deps.engine.begin_recording(key);
        self.deps.engine.arm_rotation(key);
    }

    /// Leave: cancel the countdown. The recorder is intentionally left
    /// running; the next join's start command supersedes the capture.
    #[instrument(skip(self))]
    fn on_left(&self, key: &str) {
        if is_synthetic(key) {
            debug!(key, "Synthetic session left, nothing to cancel");
            return;
        }

        self.deps.engine.cancel_rotation(key);
    }
}
