//! Aggregated outcome of a process tree kill.

use serde::Serialize;

use crate::error::{PartialKillError, SnapshotError, TerminationError};

/// Position of a pid in the killed tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum KillRole {
    Descendant,
    Root,
}

/// Result of one terminate attempt.
#[derive(Debug)]
pub struct PidOutcome {
    pub pid: u32,
    pub role: KillRole,
    pub result: Result<(), TerminationError>,
}

impl PidOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Every terminate attempt of one tree kill, in the order they were made.
///
/// A kill never aborts, so the report is the only place failures surface.
#[derive(Debug)]
pub struct KillReport {
    root: u32,
    snapshot_error: Option<SnapshotError>,
    outcomes: Vec<PidOutcome>,
    skipped: Vec<u32>,
}

impl KillReport {
    pub fn new(root: u32) -> Self {
        Self {
            root,
            snapshot_error: None,
            outcomes: Vec::new(),
            skipped: Vec::new(),
        }
    }

    pub(crate) fn record_snapshot_error(&mut self, error: SnapshotError) {
        self.snapshot_error = Some(error);
    }

    pub(crate) fn record(
        &mut self,
        pid: u32,
        role: KillRole,
        result: Result<(), TerminationError>,
    ) {
        self.outcomes.push(PidOutcome { pid, role, result });
    }

    pub(crate) fn record_skipped(&mut self, pid: u32) {
        self.skipped.push(pid);
    }

    pub fn root(&self) -> u32 {
        self.root
    }

    /// Set when descendant discovery failed and only the root was attempted.
    pub fn snapshot_error(&self) -> Option<&SnapshotError> {
        self.snapshot_error.as_ref()
    }

    pub fn outcomes(&self) -> &[PidOutcome] {
        &self.outcomes
    }

    /// Descendants deliberately left alive (the calling process).
    pub fn skipped(&self) -> &[u32] {
        &self.skipped
    }

    /// Pids a terminate was issued for, in order.
    pub fn attempted_pids(&self) -> Vec<u32> {
        self.outcomes.iter().map(|o| o.pid).collect()
    }

    pub fn failures(&self) -> impl Iterator<Item = &PidOutcome> {
        self.outcomes.iter().filter(|o| !o.is_ok())
    }

    /// True when every attempted pid is gone.
    pub fn is_complete(&self) -> bool {
        self.failures().next().is_none()
    }

    pub fn into_result(self) -> Result<(), PartialKillError> {
        let failures: Vec<_> = self
            .outcomes
            .into_iter()
            .filter_map(|o| o.result.err().map(|e| (o.pid, e)))
            .collect();

        if failures.is_empty() {
            Ok(())
        } else {
            Err(PartialKillError { failures })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_report_aggregates_failures() {
        let mut report = KillReport::new(10);
        report.record(11, KillRole::Descendant, Ok(()));
        report.record(
            12,
            KillRole::Descendant,
            Err(TerminationError::new(12, io::Error::from_raw_os_error(5))),
        );
        report.record(10, KillRole::Root, Ok(()));

        assert_eq!(report.attempted_pids(), vec![11, 12, 10]);
        assert!(!report.is_complete());
        assert_eq!(report.failures().map(|o| o.pid).collect::<Vec<_>>(), vec![12]);

        let err = report.into_result().unwrap_err();
        assert_eq!(err.failures.len(), 1);
        assert_eq!(err.failures[0].0, 12);
    }

    #[test]
    fn test_clean_report() {
        let mut report = KillReport::new(1);
        report.record(1, KillRole::Root, Ok(()));
        assert!(report.is_complete());
        assert!(report.snapshot_error().is_none());
        assert!(report.into_result().is_ok());
    }
}
