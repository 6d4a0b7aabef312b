//! Adapters layer - External system implementations.
//!
//! - `os`: the process table and console signals of the current platform
//! - `http`: the child's cooperative shutdown endpoint

pub mod http;
pub mod os;

// Re-export main types for convenience
pub use http::HttpShutdownNotifier;
pub use os::PlatformProcessTable;
