//! Spawn-time process group setup.

use tokio::process::Command;
use tracing::debug;

use crate::adapters::os;
use crate::config::ControllerConfig;

/// Prepare `command` so the spawned process leads a new process group.
///
/// Console control events only reach the whole tree when it shares a group
/// rooted at the spawned process. The cooperative shutdown address is also
/// exported to the child, which must listen there to take part in the
/// cooperative shutdown protocol.
///
/// Must be applied once, before `spawn`.
pub fn configure_process_group<'a>(
    command: &'a mut Command,
    config: &ControllerConfig,
) -> &'a mut Command {
    os::new_process_group(command);
    command.env(&config.shutdown_addr_env, config.shutdown_addr.to_string());

    debug!(
        env = %config.shutdown_addr_env,
        addr = %config.shutdown_addr,
        "Configured new process group"
    );
    command
}
