//! Replay-Warden Core Library
//!
//! Per-key replay rotation engine: independent, cancelable, restartable
//! countdown timers that trigger a stop/settle/start rotation cycle against
//! an external replay recorder.
//!
//! # Example
//!
//! ```no_run
//! use replay_warden_core::{CoreResult, ReplayControl, RotationEngine, RotationSchedule};
//!
//! use std::{sync::Arc, time::Duration};
//!
//! struct Console;
//!
//! impl ReplayControl for Console {
//!     fn execute(&self, command: &str) -> CoreResult<()> {
//!         println!("{command}");
//!         Ok(())
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let schedule = Arc::new(RotationSchedule::new(120));
//!     let engine = RotationEngine::new(Arc::new(Console), schedule, Duration::from_secs(2));
//!
//!     engine.begin_recording("Alice");
//!     engine.arm_rotation("Alice");
//! }
//! ```

mod error;
mod rotation;
mod schedule;
mod session;

pub use {
    error::{ReplayError, Result as CoreResult},
    rotation::{ReplayControl, RotationEngine, TimerRegistry, start_command, stop_command},
    schedule::RotationSchedule,
    session::is_synthetic,
};

#[cfg(test)]
mod tests;
