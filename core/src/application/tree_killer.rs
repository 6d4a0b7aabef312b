//! Best-effort forceful kill of a whole process tree.

use std::io;

use tracing::{debug, warn};

use super::resolver::descendants_of;
use crate::domain::{KillReport, KillRole, RootProcess};
use crate::error::TerminationError;
use crate::ports::ProcessTable;

/// Pids that never root a killable tree: 0 addresses every process in
/// `kill(2)` and is the idle process on Windows, 1 is init.
const PROTECTED_ROOTS: [u32; 2] = [0, 1];

/// Kill `root` and every process descended from it.
///
/// Descendants are terminated first, in breadth-first order, and the root
/// last, so the root cannot spawn replacements for children already gone.
/// Nothing here aborts early: a failed snapshot leaves only the root to kill,
/// and a failed terminate moves on to the next pid. Every attempt lands in the
/// returned report.
///
/// The calling process is never killed. It is refused as a root and skipped
/// as a descendant, as are the protected pids 0 and 1.
pub fn kill_tree<T>(table: &T, root: RootProcess) -> KillReport
where
    T: ProcessTable + ?Sized,
{
    kill_tree_as(table, root, std::process::id())
}

/// [`kill_tree`] on behalf of the process `own_pid`.
pub(crate) fn kill_tree_as<T>(table: &T, root: RootProcess, own_pid: u32) -> KillReport
where
    T: ProcessTable + ?Sized,
{
    let root_pid = root.pid();
    let mut report = KillReport::new(root_pid);

    if root_pid == own_pid || PROTECTED_ROOTS.contains(&root_pid) {
        warn!(pid = root_pid, "Refusing to kill protected process tree");
        let refusal = io::Error::new(
            io::ErrorKind::InvalidInput,
            "refusing to kill a protected process tree",
        );
        report.record(
            root_pid,
            KillRole::Root,
            Err(TerminationError::new(root_pid, refusal)),
        );
        return report;
    }

    let descendants = match descendants_of(table, root_pid) {
        Ok(pids) => pids,
        Err(e) => {
            warn!(pid = root_pid, error = %e, "Error getting child processes, killing root only");
            report.record_snapshot_error(e);
            Vec::new()
        }
    };

    debug!(
        pid = root_pid,
        descendants = descendants.len(),
        "Killing process tree"
    );

    for pid in descendants {
        if pid == own_pid {
            debug!(pid = pid, root = root_pid, "Skipping own process");
            report.record_skipped(pid);
            continue;
        }

        let result = table.terminate(pid);
        if let Err(e) = &result {
            warn!(pid = pid, root = root_pid, error = %e, "Error killing descendant process");
        }
        report.record(pid, KillRole::Descendant, result);
    }

    let result = table.terminate(root_pid);
    if let Err(e) = &result {
        warn!(pid = root_pid, error = %e, "Error killing root process");
    }
    report.record(root_pid, KillRole::Root, result);

    report
}
