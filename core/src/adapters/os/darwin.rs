//! macOS process snapshot using `ps`.
//!
//! Executes: `ps -axo pid=,ppid=`

use std::io;
use std::process::{Command, Stdio};

use crate::domain::ProcessRecord;
use crate::error::SnapshotError;

const PS_PATH: &str = "/bin/ps";

/// Lines of one `ps` run, parsed on demand.
pub struct ProcessSnapshot {
    lines: std::vec::IntoIter<String>,
    finished: bool,
}

pub fn snapshot() -> Result<ProcessSnapshot, SnapshotError> {
    let output = Command::new(PS_PATH)
        .args(["-axo", "pid=,ppid="])
        .stdin(Stdio::null())
        .stderr(Stdio::null())
        .output()?;

    if !output.status.success() {
        return Err(SnapshotError::Os(io::Error::other(format!(
            "ps exited with {}",
            output.status
        ))));
    }

    let lines: Vec<String> = String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(str::to_owned)
        .collect();

    Ok(ProcessSnapshot {
        lines: lines.into_iter(),
        finished: false,
    })
}

impl Iterator for ProcessSnapshot {
    type Item = Result<ProcessRecord, SnapshotError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        for line in self.lines.by_ref() {
            if line.trim().is_empty() {
                continue;
            }
            let record = parse_ps_line(&line);
            if record.is_err() {
                self.finished = true;
            }
            return Some(record);
        }

        None
    }
}

/// Parse one `  pid  ppid` line.
pub(crate) fn parse_ps_line(line: &str) -> Result<ProcessRecord, SnapshotError> {
    let mut parts = line.split_whitespace();
    match (
        parts.next().and_then(|p| p.parse().ok()),
        parts.next().and_then(|p| p.parse().ok()),
    ) {
        (Some(pid), Some(parent_pid)) => Ok(ProcessRecord::new(pid, parent_pid)),
        _ => Err(SnapshotError::Malformed(line.to_string())),
    }
}

/// A zombie has exited and only waits to be reaped by its parent.
pub fn is_zombie(pid: u32) -> bool {
    Command::new(PS_PATH)
        .args(["-o", "stat=", "-p", &pid.to_string()])
        .stderr(Stdio::null())
        .output()
        .map(|output| String::from_utf8_lossy(&output.stdout).trim_start().starts_with('Z'))
        .unwrap_or(false)
}
