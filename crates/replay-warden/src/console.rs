//! Host console output channel.
//!
//! A single line-oriented sink carries everything the warden says to the
//! host: recorder control commands, `say` broadcasts and `tellraw` replies.
//! Stdout is the production sink; tests inject a buffer.

use crate::CommandSource;

use std::{
    io::Write,
    panic::Location,
    sync::{Mutex, MutexGuard},
};

use error_location::ErrorLocation;
use replay_warden_core::{CoreResult, ReplayControl, ReplayError};
use tracing::{info, warn};

/// Writes command lines to the host console.
pub struct HostConsole {
    sink: Mutex<Box<dyn Write + Send>>,
}

impl HostConsole {
    /// Console backed by the process stdout.
    pub fn stdout() -> Self {
        Self::with_sink(Box::new(std::io::stdout()))
    }

    /// Console backed by an arbitrary sink. Used by tests.
    pub fn with_sink(sink: Box<dyn Write + Send>) -> Self {
        Self {
            sink: Mutex::new(sink),
        }
    }

    /// Broadcasts a notice to everyone on the host.
    pub fn broadcast(&self, message: &str) {
        if let Err(e) = self.write_line(&format!("say {message}")) {
            warn!(error = ?e, "Failed to broadcast notice");
        }
    }

    /// Replies to a command source.
    ///
    /// Player sources get a `tellraw` on the host console; console sources
    /// are answered through the warden log, which is where they are looking.
    pub fn reply(&self, source: &CommandSource, message: &str) {
        match source {
            CommandSource::Player { name, .. } => {
                if let Err(e) = self.write_line(&format!("tellraw {name} {message}")) {
                    warn!(player = %name, error = ?e, "Failed to reply");
                }
            }
            CommandSource::Console => {
                info!("{message}");
            }
        }
    }

    fn write_line(&self, line: &str) -> CoreResult<()> {
        let mut sink = self.lock_sink();
        writeln!(sink, "{line}")?;
        sink.flush()?;
        Ok(())
    }

    /// Locks the sink, recovering from poison; a panicked writer does not
    /// invalidate the underlying stream.
    fn lock_sink(&self) -> MutexGuard<'_, Box<dyn Write + Send>> {
        self.sink.lock().unwrap_or_else(|e| {
            warn!("Console sink lock poisoned, recovering");
            e.into_inner()
        })
    }
}

impl ReplayControl for HostConsole {
    #[track_caller]
    fn execute(&self, command: &str) -> CoreResult<()> {
        self.write_line(command).map_err(|e| ReplayError::ControlFailed {
            reason: format!("console write failed: {e}"),
            location: ErrorLocation::from(Location::caller()),
        })
    }
}
