//! Windows process table implementation
//!
//! Uses the Win32 API directly:
//! - `CreateToolhelp32Snapshot` / `Process32FirstW` / `Process32NextW` for snapshots
//! - `OpenProcess(PROCESS_TERMINATE)` + `TerminateProcess` for forced termination
//! - `GenerateConsoleCtrlEvent` for Ctrl-C / Ctrl-Break delivery to a process group
//! - `CREATE_NEW_PROCESS_GROUP` at spawn
//!
//! Windows never reparents orphans, so a parent pid in a snapshot may belong to
//! an exited process. The resolver tolerates that.

use std::io;
use std::mem;

use tokio::process::Command;
use tracing::{debug, warn};
use windows::Win32::Foundation::{
    CloseHandle, ERROR_INVALID_PARAMETER, ERROR_NO_MORE_FILES, FALSE, HANDLE, WAIT_TIMEOUT,
};
use windows::Win32::System::Console::{GenerateConsoleCtrlEvent, CTRL_BREAK_EVENT, CTRL_C_EVENT};
use windows::Win32::System::Diagnostics::ToolHelp::{
    CreateToolhelp32Snapshot, Process32FirstW, Process32NextW, PROCESSENTRY32W,
    TH32CS_SNAPPROCESS,
};
use windows::Win32::System::Threading::{
    OpenProcess, TerminateProcess, WaitForSingleObject, CREATE_NEW_PROCESS_GROUP,
    PROCESS_ACCESS_RIGHTS, PROCESS_QUERY_LIMITED_INFORMATION, PROCESS_SYNCHRONIZE,
    PROCESS_TERMINATE,
};

use crate::domain::{ConsoleEvent, ProcessRecord};
use crate::error::{SnapshotError, TerminationError};
use crate::ports::{ConsoleSignaler, ProcessTable};

/// Exit code reported for processes killed by `terminate`.
const TERMINATED_EXIT_CODE: u32 = 1;

/// A kernel handle closed when dropped.
struct OwnedHandle(HANDLE);

impl OwnedHandle {
    fn open_process(access: PROCESS_ACCESS_RIGHTS, pid: u32) -> windows::core::Result<Self> {
        // SAFETY: OpenProcess has no pointer arguments; the returned handle is owned here
        let handle = unsafe { OpenProcess(access, FALSE, pid)? };
        Ok(Self(handle))
    }
}

impl Drop for OwnedHandle {
    fn drop(&mut self) {
        // SAFETY: the handle is valid and closed exactly once
        if let Err(e) = unsafe { CloseHandle(self.0) } {
            warn!(error = %e, "Failed to close handle");
        }
    }
}

/// OpenProcess reports a pid that no longer exists as an invalid parameter.
fn is_gone(e: &windows::core::Error) -> bool {
    e.code() == ERROR_INVALID_PARAMETER.to_hresult()
}

/// Toolhelp process snapshot, walked one entry per `next`.
pub struct ProcessSnapshot {
    handle: OwnedHandle,
    entry: PROCESSENTRY32W,
    started: bool,
    finished: bool,
}

fn snapshot() -> Result<ProcessSnapshot, SnapshotError> {
    // SAFETY: no pointer arguments; the handle is owned by the snapshot
    let handle =
        unsafe { CreateToolhelp32Snapshot(TH32CS_SNAPPROCESS, 0) }.map_err(io::Error::from)?;

    let entry = PROCESSENTRY32W {
        dwSize: mem::size_of::<PROCESSENTRY32W>() as u32,
        ..Default::default()
    };

    Ok(ProcessSnapshot {
        handle: OwnedHandle(handle),
        entry,
        started: false,
        finished: false,
    })
}

impl Iterator for ProcessSnapshot {
    type Item = Result<ProcessRecord, SnapshotError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        // SAFETY: `entry` is a properly sized PROCESSENTRY32W owned by self
        let result = unsafe {
            if self.started {
                Process32NextW(self.handle.0, &mut self.entry)
            } else {
                Process32FirstW(self.handle.0, &mut self.entry)
            }
        };
        self.started = true;

        match result {
            Ok(()) => Some(Ok(ProcessRecord::new(
                self.entry.th32ProcessID,
                self.entry.th32ParentProcessID,
            ))),
            Err(e) if e.code() == ERROR_NO_MORE_FILES.to_hresult() => {
                self.finished = true;
                None
            }
            Err(e) => {
                self.finished = true;
                Some(Err(SnapshotError::Os(e.into())))
            }
        }
    }
}

/// Windows process table and console signaler.
#[derive(Debug, Default, Clone, Copy)]
pub struct WindowsProcessTable;

impl WindowsProcessTable {
    pub fn new() -> Self {
        Self
    }
}

impl ProcessTable for WindowsProcessTable {
    type Snapshot = ProcessSnapshot;

    fn snapshot(&self) -> Result<Self::Snapshot, SnapshotError> {
        snapshot()
    }

    fn terminate(&self, pid: u32) -> Result<(), TerminationError> {
        let handle = match OwnedHandle::open_process(PROCESS_TERMINATE, pid) {
            Ok(handle) => handle,
            Err(e) if is_gone(&e) => {
                debug!(pid = pid, "Process not found, already terminated");
                return Ok(());
            }
            Err(e) => return Err(TerminationError::new(pid, e.into())),
        };

        // SAFETY: handle is open with PROCESS_TERMINATE
        let result = unsafe { TerminateProcess(handle.0, TERMINATED_EXIT_CODE) };
        drop(handle);

        match result {
            Ok(()) => {
                debug!(pid = pid, "TerminateProcess succeeded");
                Ok(())
            }
            // An exiting process refuses TerminateProcess with access denied
            Err(_) if !self.is_running(pid) => {
                debug!(pid = pid, "Process exited during terminate");
                Ok(())
            }
            Err(e) => Err(TerminationError::new(pid, e.into())),
        }
    }

    fn is_running(&self, pid: u32) -> bool {
        let handle = match OwnedHandle::open_process(
            PROCESS_QUERY_LIMITED_INFORMATION | PROCESS_SYNCHRONIZE,
            pid,
        ) {
            Ok(handle) => handle,
            // Access denied still means the process exists
            Err(e) => return !is_gone(&e),
        };

        // SAFETY: handle is open with SYNCHRONIZE; a zero timeout only polls
        unsafe { WaitForSingleObject(handle.0, 0) == WAIT_TIMEOUT }
    }
}

impl ConsoleSignaler for WindowsProcessTable {
    fn send_event(&self, event: ConsoleEvent, process_group: u32) -> io::Result<()> {
        // Group 0 means every process attached to our console, ourselves included
        if process_group == 0 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "refusing to signal process group 0",
            ));
        }

        let ctrl_event = match event {
            ConsoleEvent::CtrlC => CTRL_C_EVENT,
            ConsoleEvent::CtrlBreak => CTRL_BREAK_EVENT,
        };

        debug!(process_group = process_group, event = %event, "Generating console control event");
        // SAFETY: no pointer arguments
        unsafe { GenerateConsoleCtrlEvent(ctrl_event, process_group) }.map_err(io::Error::from)
    }
}

/// Make the spawned process the root of a new process group.
pub fn new_process_group(command: &mut Command) {
    command.creation_flags(CREATE_NEW_PROCESS_GROUP.0);
}
