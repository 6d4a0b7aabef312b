//! Run command - supervise a command as the root of its own process group.
//!
//! The command runs until it exits. On Ctrl-C its tree is stopped the same
//! way `taskreaper stop` would.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use taskreaper_core::{ControllerConfig, RootProcess, SystemController};
use tokio::process::Command;
use tracing::{info, warn};

use super::shutdown_request;
use super::stop::print_outcome;

/// Exit code of a process ended by SIGINT.
const INTERRUPTED_EXIT_CODE: i32 = 130;

/// How long to wait for the root to be reaped after it was stopped.
const REAP_TIMEOUT: Duration = Duration::from_secs(5);

/// Returns the exit code to report.
pub async fn run(
    command: &[String],
    signal: Option<&str>,
    timeout_secs: Option<u64>,
    config: ControllerConfig,
    json: bool,
) -> Result<i32> {
    let request = shutdown_request(signal, timeout_secs)?;
    let (program, args) = command.split_first().context("No command given")?;
    let controller = SystemController::new(config)?;

    let mut cmd = Command::new(program);
    cmd.args(args);
    controller.configure_process_group(&mut cmd);

    let mut child = cmd
        .spawn()
        .with_context(|| format!("Failed to spawn {}", program))?;
    let root = RootProcess::from_child(&child).context("Child exited before it could be tracked")?;
    info!(pid = root.pid(), program = %program, "Spawned process group root");

    tokio::select! {
        status = child.wait() => {
            let status = status.context("Failed to wait for child")?;
            info!(pid = root.pid(), status = %status, "Child exited");
            Ok(status.code().unwrap_or(1))
        }
        result = tokio::signal::ctrl_c() => {
            result.context("Failed to listen for Ctrl-C")?;
            eprintln!("Stopping process tree of {}...", root.pid());

            let outcome = controller.stop(root, &request).await;
            match tokio::time::timeout(REAP_TIMEOUT, child.wait()).await {
                Ok(status) => {
                    status.context("Failed to wait for child")?;
                }
                Err(_) => warn!(pid = root.pid(), "Child not reaped after stop"),
            }

            print_outcome(&outcome, json)?;
            if !outcome.is_clean() {
                bail!("Process tree of {} was not fully stopped", root.pid());
            }
            Ok(INTERRUPTED_EXIT_CODE)
        }
    }
}
