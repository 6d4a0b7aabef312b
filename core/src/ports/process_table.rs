//! Process table port (interface).

use crate::domain::ProcessRecord;
use crate::error::{SnapshotError, TerminationError};

/// Port for observing and mutating the system process table.
///
/// The table is an external, externally-synchronized resource: snapshots and
/// terminate requests are never assumed to be consistent with each other.
pub trait ProcessTable: Send + Sync {
    /// Lazy snapshot sequence.
    ///
    /// Dropping it, even before the end, releases the OS resource behind it. A
    /// failure mid-way yields one `Err` and ends the sequence.
    type Snapshot: Iterator<Item = Result<ProcessRecord, SnapshotError>>;

    /// Take a point-in-time snapshot of all running processes.
    fn snapshot(&self) -> Result<Self::Snapshot, SnapshotError>;

    /// Forcefully terminate a process.
    ///
    /// A pid that no longer exists is already in the desired state and yields
    /// `Ok(())`.
    fn terminate(&self, pid: u32) -> Result<(), TerminationError>;

    /// Check if a process is still running.
    fn is_running(&self, pid: u32) -> bool;
}
