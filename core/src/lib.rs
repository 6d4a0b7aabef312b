//! taskreaper Core Library
//!
//! Lifecycle control for process trees spawned by a task executor.
//! Provides functionality to:
//! - Spawn a child as the root of its own process group
//! - Enumerate the descendants of a root from one process snapshot
//! - Negotiate a graceful shutdown (console control event, then an HTTP
//!   cooperative shutdown request)
//! - Forcefully kill a whole tree, best effort, with a per-pid report
//!
//! # Architecture
//! This library follows hexagonal architecture (ports & adapters):
//! - `domain`: Pure data models and the negotiation state machine
//! - `ports`: Trait definitions (interfaces)
//! - `adapters`: OS and HTTP implementations
//! - `application`: Use case services
//! - `controller`: One façade over all of the above
//!
//! # Platform Support
//! - Windows: Toolhelp snapshots, `TerminateProcess`, `GenerateConsoleCtrlEvent`
//! - Linux: `/proc` snapshots, signals via `kill`/`killpg`
//! - macOS: `ps` snapshots, signals via `kill`/`killpg`

// Hexagonal architecture layers
pub mod adapters;
pub mod application;
pub mod domain;
pub mod ports;

pub mod config;
pub mod controller;
pub mod error;

#[cfg(test)]
mod testing;

// Re-export the primary API
pub use application::{configure_process_group, descendants_of, kill_tree};
pub use config::{ConfigStore, ControllerConfig};
pub use controller::{StopOutcome, SystemController, TreeController};
pub use domain::{
    ConsoleEvent, KillReport, KillRole, NegotiationState, PidOutcome, ProcessRecord, RootProcess,
    ShutdownRequest, SignalKind,
};
pub use error::{
    Error, NegotiationFailure, PartialKillError, Result, SnapshotError, TerminationError,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
