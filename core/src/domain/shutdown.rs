//! Shutdown requests and the negotiation state machine.

use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use crate::error::NegotiationFailure;

/// Time a task gets to exit on its own before the tree is killed.
pub const DEFAULT_KILL_TIMEOUT: Duration = Duration::from_secs(5);

/// Which shutdown path a request asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SignalKind {
    /// Console event followed by the cooperative shutdown request.
    Interrupt,
    /// Console event only; the caller kills the tree next.
    #[default]
    Terminate,
}

impl std::fmt::Display for SignalKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SignalKind::Interrupt => write!(f, "interrupt"),
            SignalKind::Terminate => write!(f, "terminate"),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown shutdown signal: {0}")]
pub struct ParseSignalKindError(pub String);

impl FromStr for SignalKind {
    type Err = ParseSignalKindError;

    /// Accepts the signal names orchestrators hand out: `SIGINT`, `interrupt`,
    /// `os.Interrupt`, `SIGTERM`, `SIGKILL`, `kill`, ...
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sigint" | "int" | "interrupt" | "os.interrupt" | "ctrl-c" | "ctrl-break" => {
                Ok(SignalKind::Interrupt)
            }
            "sigterm" | "term" | "terminate" | "sigkill" | "kill" | "os.kill" => {
                Ok(SignalKind::Terminate)
            }
            _ => Err(ParseSignalKindError(s.to_string())),
        }
    }
}

/// A request to stop the root process and its tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShutdownRequest {
    pub signal: SignalKind,
    /// How long the root may take to exit after a completed negotiation.
    pub timeout: Duration,
}

impl ShutdownRequest {
    pub fn new(signal: SignalKind, timeout: Duration) -> Self {
        Self { signal, timeout }
    }

    pub fn interrupt(timeout: Duration) -> Self {
        Self::new(SignalKind::Interrupt, timeout)
    }

    pub fn terminate(timeout: Duration) -> Self {
        Self::new(SignalKind::Terminate, timeout)
    }

    /// Build a request from an optional signal name. No signal means terminate.
    pub fn from_signal_name(
        signal: Option<&str>,
        timeout: Option<Duration>,
    ) -> Result<Self, ParseSignalKindError> {
        let signal = match signal {
            Some(name) => name.parse()?,
            None => SignalKind::Terminate,
        };
        Ok(Self::new(signal, timeout.unwrap_or(DEFAULT_KILL_TIMEOUT)))
    }
}

impl Default for ShutdownRequest {
    fn default() -> Self {
        Self::terminate(DEFAULT_KILL_TIMEOUT)
    }
}

/// States of one graceful shutdown negotiation.
///
/// `Completed` and `Failed` are terminal.
#[derive(Debug)]
pub enum NegotiationState {
    Start,
    AwaitingCooperativeShutdown,
    Completed,
    Failed(NegotiationFailure),
}

impl NegotiationState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, NegotiationState::Completed | NegotiationState::Failed(_))
    }
}
