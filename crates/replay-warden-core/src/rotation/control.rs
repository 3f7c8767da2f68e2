use crate::CoreResult;

/// Control channel to the external replay recorder.
///
/// Implementations deliver a single command line to the recorder (for the
/// production binary, a line written to the host console). `execute` must be
/// quick: the engine calls it from timer expiry tasks and logs failures
/// rather than propagating them.
pub trait ReplayControl: Send + Sync {
    /// Delivers one recorder command.
    ///
    /// # Errors
    ///
    /// Returns an error if the command could not be delivered. The engine
    /// treats delivery failures as log-and-continue.
    fn execute(&self, command: &str) -> CoreResult<()>;
}

/// Command line starting a new recording segment for `key`.
pub fn start_command(key: &str) -> String {
    format!("replay start players {key}")
}

/// Command line stopping the recording for `key`.
///
/// The trailing `true` is the recorder's finalize flag: the current segment
/// is flushed and closed rather than discarded.
pub fn stop_command(key: &str) -> String {
    format!("replay stop players {key} true")
}
