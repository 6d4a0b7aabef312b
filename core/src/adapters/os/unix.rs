//! Unix process table: signals instead of handles.
//!
//! - `SIGKILL` for forced termination
//! - `killpg` with `SIGINT` (Ctrl-C) or `SIGTERM` (Ctrl-Break) for console events
//! - `setpgid(0, 0)` at spawn for a new process group
//!
//! There is no handle to hold on Unix, so a pid is addressed directly each time.

use std::io;

use nix::errno::Errno;
use nix::sys::signal::{kill, killpg, Signal};
use nix::unistd::Pid;
use tokio::process::Command;
use tracing::debug;

#[cfg(target_os = "macos")]
use super::darwin as platform;
#[cfg(target_os = "linux")]
use super::linux as platform;

use crate::domain::ConsoleEvent;
use crate::error::{SnapshotError, TerminationError};
use crate::ports::{ConsoleSignaler, ProcessTable};

/// Unix process table and console signaler.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnixProcessTable;

impl UnixProcessTable {
    pub fn new() -> Self {
        Self
    }
}

/// Pid 0 and negative values address process groups in `kill(2)`, never a
/// single process.
fn to_pid(pid: u32) -> Option<Pid> {
    match i32::try_from(pid) {
        Ok(raw) if raw > 0 => Some(Pid::from_raw(raw)),
        _ => None,
    }
}

impl ProcessTable for UnixProcessTable {
    type Snapshot = platform::ProcessSnapshot;

    fn snapshot(&self) -> Result<Self::Snapshot, SnapshotError> {
        platform::snapshot()
    }

    fn terminate(&self, pid: u32) -> Result<(), TerminationError> {
        let target = to_pid(pid).ok_or_else(|| {
            TerminationError::new(
                pid,
                io::Error::new(io::ErrorKind::InvalidInput, "not a single-process pid"),
            )
        })?;

        match kill(target, Signal::SIGKILL) {
            Ok(()) => {
                debug!(pid = pid, "SIGKILL sent");
                Ok(())
            }
            Err(Errno::ESRCH) => {
                debug!(pid = pid, "Process not found, already terminated");
                Ok(())
            }
            Err(errno) => Err(TerminationError::new(pid, io::Error::from(errno))),
        }
    }

    fn is_running(&self, pid: u32) -> bool {
        let Some(target) = to_pid(pid) else {
            return false;
        };

        // EPERM: the process exists but belongs to someone else
        match kill(target, None) {
            Ok(()) | Err(Errno::EPERM) => !platform::is_zombie(pid),
            Err(_) => false,
        }
    }
}

impl ConsoleSignaler for UnixProcessTable {
    fn send_event(&self, event: ConsoleEvent, process_group: u32) -> io::Result<()> {
        // Group 1 is init's; a group of 0 would be our own
        let group = to_pid(process_group)
            .filter(|group| group.as_raw() > 1)
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("refusing to signal process group {}", process_group),
                )
            })?;

        let signal = match event {
            ConsoleEvent::CtrlC => Signal::SIGINT,
            ConsoleEvent::CtrlBreak => Signal::SIGTERM,
        };

        debug!(process_group = process_group, signal = %signal, "Signalling process group");
        killpg(group, signal).map_err(io::Error::from)
    }
}

/// Make the spawned process the leader of a new process group.
pub fn new_process_group(command: &mut Command) {
    command.process_group(0);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::application::{descendants_of, kill_tree};
    use crate::domain::RootProcess;

    // Far above any default pid_max
    const NONEXISTENT_PID: u32 = 2_000_000_000;

    #[test]
    fn test_is_running_current_process() {
        let table = UnixProcessTable::new();
        assert!(table.is_running(std::process::id()));
    }

    #[test]
    fn test_is_running_nonexistent() {
        let table = UnixProcessTable::new();
        assert!(!table.is_running(NONEXISTENT_PID));
        assert!(!table.is_running(0));
    }

    #[test]
    fn test_terminate_nonexistent_process_succeeds() {
        let table = UnixProcessTable::new();
        assert!(table.terminate(NONEXISTENT_PID).is_ok());
    }

    #[test]
    fn test_terminate_rejects_group_addressing_pids() {
        let table = UnixProcessTable::new();
        let err = table.terminate(0).unwrap_err();
        assert_eq!(err.pid, 0);
        assert_eq!(err.source.kind(), io::ErrorKind::InvalidInput);
        assert!(table.terminate(u32::MAX).is_err());
    }

    #[test]
    fn test_console_event_refuses_special_groups() {
        let table = UnixProcessTable::new();
        assert!(table.send_event(ConsoleEvent::CtrlBreak, 0).is_err());
        assert!(table.send_event(ConsoleEvent::CtrlBreak, 1).is_err());
        assert!(table.send_event(ConsoleEvent::CtrlC, NONEXISTENT_PID).is_err());
    }

    #[tokio::test]
    async fn test_kill_tree_of_real_child() {
        let mut command = Command::new("sh");
        command
            .args(["-c", "sleep 30 & sleep 30 & wait"])
            .kill_on_drop(true);
        new_process_group(&mut command);
        let mut child = command.spawn().unwrap();
        let root = RootProcess::from_child(&child).unwrap();
        let table = UnixProcessTable::new();

        // Give the shell time to fork its children
        let mut descendants = Vec::new();
        for _ in 0..50 {
            descendants = descendants_of(&table, root.pid()).unwrap();
            if descendants.len() >= 2 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        assert!(descendants.len() >= 2, "children not found: {descendants:?}");

        let report = kill_tree(&table, root);
        assert!(report.is_complete());
        for pid in &descendants {
            assert!(report.attempted_pids().contains(pid));
        }
        assert_eq!(report.attempted_pids().last(), Some(&root.pid()));

        // The shell may exit on its own once its children are gone, so only
        // reaping is checked, not how it ended
        tokio::time::timeout(Duration::from_secs(5), child.wait())
            .await
            .expect("root still running after kill_tree")
            .unwrap();
        assert!(!table.is_running(root.pid()));

        for pid in descendants {
            let mut gone = false;
            for _ in 0..100 {
                if !table.is_running(pid) {
                    gone = true;
                    break;
                }
                tokio::time::sleep(Duration::from_millis(20)).await;
            }
            assert!(gone, "descendant {pid} survived kill_tree");
        }
    }
}
