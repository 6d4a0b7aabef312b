//! Process table adapters.
//!
//! Platform-specific snapshot, terminate and console event implementations.
//! The platform table implements both `ProcessTable` and `ConsoleSignaler`.

#[cfg(target_os = "macos")]
mod darwin;

#[cfg(target_os = "linux")]
mod linux;

#[cfg(unix)]
mod unix;

#[cfg(target_os = "windows")]
mod windows;

#[cfg(unix)]
pub use unix::{new_process_group, UnixProcessTable as PlatformProcessTable};

#[cfg(target_os = "windows")]
pub use windows::{new_process_group, WindowsProcessTable as PlatformProcessTable};

// Fallback for unsupported platforms (compile-time check)
#[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
compile_error!("Unsupported platform: only Linux, macOS and Windows are supported");
