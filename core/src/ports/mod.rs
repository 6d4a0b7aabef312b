//! Ports layer - Trait definitions (interfaces).
//!
//! The application layer talks to the operating system and to the child's
//! cooperative shutdown endpoint only through these traits. Implementations
//! live in `adapters`; tests substitute in-memory fakes.

mod console;
mod notifier;
mod process_table;

pub use console::ConsoleSignaler;
pub use notifier::ShutdownNotifier;
pub use process_table::ProcessTable;
