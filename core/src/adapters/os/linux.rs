//! Linux process snapshot read from procfs.
//!
//! Each process under `/proc` contributes its pid and the parent pid from
//! `/proc/<pid>/stat`.

use std::io;

use procfs::process::{all_processes, Process, ProcessesIter};
use procfs::{ProcError, ProcResult};
use tracing::debug;

use crate::domain::ProcessRecord;
use crate::error::SnapshotError;

/// Lazy walk over `/proc`. The directory handle closes on drop.
pub struct ProcessSnapshot {
    processes: ProcessesIter,
    finished: bool,
}

pub fn snapshot() -> Result<ProcessSnapshot, SnapshotError> {
    Ok(ProcessSnapshot {
        processes: all_processes().map_err(to_snapshot_error)?,
        finished: false,
    })
}

impl Iterator for ProcessSnapshot {
    type Item = Result<ProcessRecord, SnapshotError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        loop {
            let stat = visible(self.processes.next()?).and_then(|process| match process {
                Some(process) => visible(process.stat()),
                None => Ok(None),
            });

            match stat {
                Ok(Some(stat)) => {
                    return Some(Ok(ProcessRecord::new(stat.pid as u32, stat.ppid as u32)));
                }
                Ok(None) => continue,
                Err(e) => {
                    self.finished = true;
                    return Some(Err(e));
                }
            }
        }
    }
}

/// Unwrap one per-process read.
///
/// `None` when the process exited since `/proc` was listed, or when its entry
/// is hidden from us (`hidepid`). A hidden process belongs to another user and
/// could not be signalled either.
fn visible<T>(result: ProcResult<T>) -> Result<Option<T>, SnapshotError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(ProcError::NotFound(_)) => Ok(None),
        Err(ProcError::PermissionDenied(path)) => {
            debug!(path = ?path, "Skipping unreadable process entry");
            Ok(None)
        }
        Err(e) => Err(to_snapshot_error(e)),
    }
}

fn to_snapshot_error(e: ProcError) -> SnapshotError {
    match e {
        ProcError::Io(source, _) => SnapshotError::Os(source),
        ProcError::Incomplete(path) => SnapshotError::Malformed(format!("{:?}", path)),
        other => SnapshotError::Os(io::Error::other(other.to_string())),
    }
}

/// A zombie has exited and only waits to be reaped by its parent.
pub fn is_zombie(pid: u32) -> bool {
    let Ok(pid) = i32::try_from(pid) else {
        return false;
    };
    Process::new(pid)
        .and_then(|process| process.stat())
        .map(|stat| stat.state == 'Z' || stat.state == 'X')
        .unwrap_or(false)
}
