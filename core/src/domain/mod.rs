//! Domain layer - Pure data models for process trees and shutdown requests.
//!
//! These types have no I/O dependencies and can be tested in isolation.

mod process;
mod report;
mod shutdown;

// Re-export all domain types
pub use process::{ConsoleEvent, ProcessRecord, RootProcess};
pub use report::{KillReport, KillRole, PidOutcome};
pub use shutdown::{
    NegotiationState, ParseSignalKindError, ShutdownRequest, SignalKind, DEFAULT_KILL_TIMEOUT,
};
