/*!
 * Error types for Tether
 */

use std::io;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, TetherError>;

/// Exit code constants for structured process exit
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_PARTIAL: i32 = 1;
pub const EXIT_FATAL: i32 = 2;

#[derive(Error, Debug)]
pub enum TetherError {
    /// Remote endpoint reachable but returned a non-success status
    #[error("remote call failed with status {status}: {body}")]
    RemoteCall { status: u16, body: String },

    /// Queue file exists but does not parse as a well-formed action sequence
    #[error("corrupt queue file {path}: {reason}")]
    CorruptQueue { path: PathBuf, reason: String },

    /// Action constructed with a payload missing a required field
    #[error("invalid action: {0}")]
    Validation(String),

    /// Transport-level failure talking to the remote endpoint
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),
}

impl TetherError {
    /// Get the process exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            // Fatal: bad input or bad durable state, retrying cannot help
            TetherError::CorruptQueue { .. }
            | TetherError::Validation(_)
            | TetherError::Config(_) => EXIT_FATAL,
            // Partial: the pass was aborted, re-invoking later may succeed
            TetherError::RemoteCall { .. }
            | TetherError::Transport(_)
            | TetherError::Io(_) => EXIT_PARTIAL,
        }
    }

    /// Check if this error is fatal (re-invoking with the same state cannot succeed)
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            TetherError::CorruptQueue { .. }
                | TetherError::Validation(_)
                | TetherError::Config(_)
        )
    }

    /// Check if this error came from the remote endpoint or the network path to it
    pub fn is_network_error(&self) -> bool {
        matches!(
            self,
            TetherError::RemoteCall { .. } | TetherError::Transport(_)
        )
    }
}

impl From<serde_json::Error> for TetherError {
    fn from(err: serde_json::Error) -> Self {
        TetherError::Config(format!("JSON error: {}", err))
    }
}
