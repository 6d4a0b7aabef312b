//! Error types for the taskreaper-core library.
//!
//! None of these errors is fatal to the host: snapshot failures shrink the
//! discovered tree, termination failures are aggregated into a
//! [`KillReport`](crate::domain::KillReport), and negotiation failures tell the
//! caller to escalate to a forceful kill.

use std::io;
use std::time::Duration;

use thiserror::Error;

/// Result type alias for configuration and I/O level operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised outside the kill/shutdown paths (configuration, I/O).
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP client construction error.
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// The system-wide process snapshot could not be taken or enumerated.
#[derive(Error, Debug)]
pub enum SnapshotError {
    /// The OS refused or failed the snapshot query.
    #[error("process snapshot failed: {0}")]
    Os(#[from] io::Error),

    /// The snapshot source produced output that could not be interpreted.
    #[error("unreadable process snapshot entry: {0}")]
    Malformed(String),
}

/// A specific pid could not be opened or terminated for a reason other than
/// "it is already gone".
#[derive(Error, Debug)]
#[error("failed to terminate process {pid}: {source}")]
pub struct TerminationError {
    /// The pid the terminate request targeted.
    pub pid: u32,
    #[source]
    pub source: io::Error,
}

impl TerminationError {
    pub fn new(pid: u32, source: io::Error) -> Self {
        Self { pid, source }
    }

    /// Underlying OS error code, when the failure came from the OS.
    pub fn os_code(&self) -> Option<i32> {
        self.source.raw_os_error()
    }
}

/// Some processes of a tree survived a kill attempt.
#[derive(Error, Debug)]
#[error("{} process(es) could not be terminated", failures.len())]
pub struct PartialKillError {
    pub failures: Vec<(u32, TerminationError)>,
}

/// The graceful shutdown negotiation did not complete.
///
/// The caller is expected to escalate to a forceful tree kill.
#[derive(Error, Debug)]
pub enum NegotiationFailure {
    /// The console control event could not be delivered to the process group.
    #[error("failed to send console control event to process group {process_group}: {source}")]
    ConsoleEvent {
        process_group: u32,
        #[source]
        source: io::Error,
    },

    /// The cooperative shutdown endpoint answered with a non-200 status.
    #[error("shutdown endpoint returned HTTP {status}")]
    Endpoint { status: u16 },

    /// The cooperative shutdown endpoint did not answer in time.
    #[error("shutdown endpoint did not respond within {timeout:?}")]
    Timeout { timeout: Duration },

    /// The cooperative shutdown endpoint could not be reached at all.
    #[error("shutdown endpoint unreachable: {reason}")]
    Unreachable { reason: String },
}
