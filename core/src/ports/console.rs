//! Console control event port (interface).

use std::io;

use crate::domain::ConsoleEvent;

/// Port for delivering console control events to a process group.
pub trait ConsoleSignaler: Send + Sync {
    /// Deliver `event` to every member of `process_group`.
    fn send_event(&self, event: ConsoleEvent, process_group: u32) -> io::Result<()>;
}
