//! In-memory fakes of the ports, shared by the unit tests.

use std::collections::HashSet;
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::domain::{ConsoleEvent, ProcessRecord};
use crate::error::{NegotiationFailure, SnapshotError, TerminationError};
use crate::ports::{ConsoleSignaler, ProcessTable, ShutdownNotifier};

#[derive(Default)]
struct TableState {
    live: Vec<ProcessRecord>,
    terminate_calls: Vec<u32>,
    killed: Vec<u32>,
    unkillable: HashSet<u32>,
    snapshot_fails: bool,
    snapshot_fails_after: Option<usize>,
    snapshots_taken: usize,
}

/// Process table holding a synthetic tree. Clones share state.
#[derive(Clone, Default)]
pub(crate) struct FakeProcessTable {
    state: Arc<Mutex<TableState>>,
}

impl FakeProcessTable {
    pub fn with_tree(pairs: &[(u32, u32)]) -> Self {
        let table = Self::default();
        table.state.lock().live = pairs
            .iter()
            .map(|&(pid, parent)| ProcessRecord::new(pid, parent))
            .collect();
        table
    }

    /// Make every terminate of `pid` fail with access denied.
    pub fn make_unkillable(&self, pid: u32) {
        self.state.lock().unkillable.insert(pid);
    }

    pub fn fail_snapshot(&self) {
        self.state.lock().snapshot_fails = true;
    }

    /// Yield `count` records, then an error.
    pub fn fail_snapshot_after(&self, count: usize) {
        self.state.lock().snapshot_fails_after = Some(count);
    }

    /// The process exits on its own.
    pub fn exit(&self, pid: u32) {
        self.state.lock().live.retain(|r| r.pid != pid);
    }

    pub fn is_alive(&self, pid: u32) -> bool {
        self.state.lock().live.iter().any(|r| r.pid == pid)
    }

    /// Pids a terminate was requested for, in order.
    pub fn terminate_calls(&self) -> Vec<u32> {
        self.state.lock().terminate_calls.clone()
    }

    /// Pids that were alive when terminated.
    pub fn killed(&self) -> Vec<u32> {
        self.state.lock().killed.clone()
    }

    pub fn snapshots_taken(&self) -> usize {
        self.state.lock().snapshots_taken
    }
}

impl ProcessTable for FakeProcessTable {
    type Snapshot = std::vec::IntoIter<Result<ProcessRecord, SnapshotError>>;

    fn snapshot(&self) -> Result<Self::Snapshot, SnapshotError> {
        let mut state = self.state.lock();
        state.snapshots_taken += 1;
        if state.snapshot_fails {
            return Err(SnapshotError::Os(io::Error::from(io::ErrorKind::PermissionDenied)));
        }

        let mut entries: Vec<_> = state.live.iter().copied().map(Ok).collect();
        if let Some(count) = state.snapshot_fails_after {
            entries.truncate(count);
            entries.push(Err(SnapshotError::Malformed("truncated".to_string())));
        }
        Ok(entries.into_iter())
    }

    fn terminate(&self, pid: u32) -> Result<(), TerminationError> {
        let mut state = self.state.lock();
        state.terminate_calls.push(pid);
        if state.unkillable.contains(&pid) {
            return Err(TerminationError::new(
                pid,
                io::Error::from(io::ErrorKind::PermissionDenied),
            ));
        }
        if let Some(index) = state.live.iter().position(|r| r.pid == pid) {
            state.live.remove(index);
            state.killed.push(pid);
        }
        Ok(())
    }

    fn is_running(&self, pid: u32) -> bool {
        self.is_alive(pid)
    }
}

/// Console that records events. When honored, the signalled group's leader
/// exits as a well-behaved child would.
#[derive(Default)]
pub(crate) struct FakeConsole {
    sent: Mutex<Vec<(ConsoleEvent, u32)>>,
    fails: bool,
    honored_by: Option<FakeProcessTable>,
}

impl FakeConsole {
    pub fn failing() -> Self {
        Self {
            fails: true,
            ..Default::default()
        }
    }

    pub fn honored_by(table: FakeProcessTable) -> Self {
        Self {
            honored_by: Some(table),
            ..Default::default()
        }
    }

    pub fn sent(&self) -> Vec<(ConsoleEvent, u32)> {
        self.sent.lock().clone()
    }
}

impl ConsoleSignaler for FakeConsole {
    fn send_event(&self, event: ConsoleEvent, process_group: u32) -> io::Result<()> {
        if self.fails {
            return Err(io::Error::from(io::ErrorKind::InvalidInput));
        }
        self.sent.lock().push((event, process_group));
        if let Some(table) = &self.honored_by {
            table.exit(process_group);
        }
        Ok(())
    }
}

/// Cooperative endpoint answering with a fixed HTTP status.
pub(crate) struct FakeNotifier {
    status: u16,
    calls: AtomicUsize,
}

impl FakeNotifier {
    pub fn responding(status: u16) -> Self {
        Self {
            status,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ShutdownNotifier for FakeNotifier {
    async fn notify(&self) -> Result<(), NegotiationFailure> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.status == 200 {
            Ok(())
        } else {
            Err(NegotiationFailure::Endpoint {
                status: self.status,
            })
        }
    }
}
