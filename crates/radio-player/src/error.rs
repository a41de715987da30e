use std::path::PathBuf;

use crate::backend::BackendKind;

/// Errors raised by the player control subsystem.
#[derive(thiserror::Error, Debug)]
pub enum PlayerError {
    /// The backend executable could not be started
    #[error("failed to spawn {program:?}: {source}")]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Writing a command to the backend's stdin failed (usually a broken pipe)
    #[error("failed to send command {command:?}: {source}")]
    CommandWriteFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// A command was issued while nothing is playing
    #[error("no active playback session")]
    NoSession,

    /// The status reader stopped on an I/O error
    #[error("status reader failed: {0}")]
    ReaderFailed(#[source] std::io::Error),

    /// None of the configured backends could be started
    #[error("no supported player found (tried: {tried:?})")]
    NoBackend { tried: Vec<BackendKind> },

    #[error("invalid title pattern: {0}")]
    Pattern(#[from] regex::Error),
}
