//! Process identity models.

use serde::{Deserialize, Serialize};

/// One entry of a process table snapshot.
///
/// Records from different snapshots are independent observations; two records
/// with the same pid are never reconciled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProcessRecord {
    pub pid: u32,
    pub parent_pid: u32,
}

impl ProcessRecord {
    pub fn new(pid: u32, parent_pid: u32) -> Self {
        Self { pid, parent_pid }
    }
}

/// The top-level process spawned by the executor.
///
/// Every tree computation is rooted at this pid. The process is created as the
/// root of its own process group, so its group id equals its pid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RootProcess {
    pid: u32,
}

impl RootProcess {
    pub fn new(pid: u32) -> Self {
        Self { pid }
    }

    /// Root of a spawned child, or `None` if the child has already been reaped.
    pub fn from_child(child: &tokio::process::Child) -> Option<Self> {
        child.id().map(Self::new)
    }

    pub fn pid(&self) -> u32 {
        self.pid
    }

    /// Id of the process group led by this process.
    pub fn process_group(&self) -> u32 {
        self.pid
    }
}

impl From<u32> for RootProcess {
    fn from(pid: u32) -> Self {
        Self::new(pid)
    }
}

/// Console control event delivered to a process group.
///
/// A process started with a new process group ignores Ctrl-C on Windows, so
/// Ctrl-Break is the default. On Unix the events map to `SIGINT` and `SIGTERM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConsoleEvent {
    CtrlC,
    #[default]
    CtrlBreak,
}

impl std::fmt::Display for ConsoleEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConsoleEvent::CtrlC => write!(f, "ctrl-c"),
            ConsoleEvent::CtrlBreak => write!(f, "ctrl-break"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_process_group_is_pid() {
        let root = RootProcess::new(4321);
        assert_eq!(root.pid(), 4321);
        assert_eq!(root.process_group(), 4321);
    }

    #[test]
    fn test_console_event_serde() {
        assert_eq!(ConsoleEvent::default(), ConsoleEvent::CtrlBreak);
        assert_eq!(
            serde_json::to_string(&ConsoleEvent::CtrlC).unwrap(),
            "\"ctrlC\""
        );
        let parsed: ConsoleEvent = serde_json::from_str("\"ctrlBreak\"").unwrap();
        assert_eq!(parsed, ConsoleEvent::CtrlBreak);
    }
}
