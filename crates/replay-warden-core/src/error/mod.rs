use std::panic::Location;

use error_location::ErrorLocation;
use thiserror::Error;

/// Replay control errors with source location tracking.
#[derive(Error, Debug)]
pub enum ReplayError {
    /// A recorder control command could not be delivered.
    #[error("Recorder command failed: {reason} {location}")]
    ControlFailed {
        /// Description of the delivery failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// IO error on the recorder control channel.
    #[error("IO error: {source} {location}")]
    Io {
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
        /// Source location where error occurred.
        location: ErrorLocation,
    },
}

impl From<std::io::Error> for ReplayError {
    #[track_caller]
    fn from(source: std::io::Error) -> Self {
        ReplayError::Io {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

/// Result type alias using [`ReplayError`].
pub type Result<T> = std::result::Result<T, ReplayError>;
