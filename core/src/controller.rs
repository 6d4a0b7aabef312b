//! Tree controller - one entry point over the application services.
//!
//! Owns the platform adapters and the configuration, and adds the `stop`
//! composite: negotiate, give the root `request.timeout` to exit, then kill
//! whatever is left.

use std::time::Duration;

use tokio::process::Command;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::adapters::{HttpShutdownNotifier, PlatformProcessTable};
use crate::application::{self, ShutdownNegotiator};
use crate::config::ControllerConfig;
use crate::domain::{KillReport, RootProcess, ShutdownRequest};
use crate::error::{NegotiationFailure, Result, SnapshotError};
use crate::ports::{ConsoleSignaler, ProcessTable, ShutdownNotifier};

/// Controller wired to the current platform and the HTTP endpoint.
pub type SystemController =
    TreeController<PlatformProcessTable, PlatformProcessTable, HttpShutdownNotifier>;

/// What `stop` did to a tree.
#[derive(Debug)]
pub struct StopOutcome {
    /// Result of the graceful negotiation.
    pub negotiation: std::result::Result<(), NegotiationFailure>,
    /// The root exited on its own before the deadline.
    pub exited_gracefully: bool,
    /// Present when the tree had to be killed.
    pub kill: Option<KillReport>,
}

impl StopOutcome {
    /// Every process the controller tried to kill is gone.
    pub fn is_clean(&self) -> bool {
        self.kill.as_ref().map_or(true, KillReport::is_complete)
    }
}

/// Lifecycle controller for process trees.
pub struct TreeController<T, C, N> {
    table: T,
    negotiator: ShutdownNegotiator<C, N>,
    config: ControllerConfig,
}

impl SystemController {
    /// Build a controller on the platform adapters.
    pub fn new(config: ControllerConfig) -> Result<Self> {
        config.validate()?;
        let table = PlatformProcessTable::new();
        let notifier = HttpShutdownNotifier::from_config(&config)?;
        Ok(Self::with_parts(table, table, notifier, config))
    }
}

impl<T, C, N> TreeController<T, C, N>
where
    T: ProcessTable,
    C: ConsoleSignaler,
    N: ShutdownNotifier,
{
    pub fn with_parts(table: T, console: C, notifier: N, config: ControllerConfig) -> Self {
        let negotiator = ShutdownNegotiator::new(console, notifier, config.console_event);
        Self {
            table,
            negotiator,
            config,
        }
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    /// Prepare `command` to spawn the root of a new process group.
    pub fn configure_process_group<'a>(&self, command: &'a mut Command) -> &'a mut Command {
        application::configure_process_group(command, &self.config)
    }

    /// Ask the tree to shut down. Never kills anything.
    pub async fn shutdown(
        &self,
        root: RootProcess,
        request: &ShutdownRequest,
    ) -> std::result::Result<(), NegotiationFailure> {
        info!(
            pid = root.pid(),
            signal = %request.signal,
            "Requesting graceful shutdown"
        );
        self.negotiator.negotiate(root, request).await
    }

    /// Forcefully kill the root and all of its descendants.
    pub fn kill_tree(&self, root: RootProcess) -> KillReport {
        let report = application::kill_tree(&self.table, root);
        if report.is_complete() {
            info!(pid = root.pid(), killed = report.outcomes().len(), "Process tree killed");
        } else {
            warn!(
                pid = root.pid(),
                failed = report.failures().count(),
                "Some processes of the tree survived"
            );
        }
        report
    }

    pub fn descendants_of(&self, pid: u32) -> std::result::Result<Vec<u32>, SnapshotError> {
        application::descendants_of(&self.table, pid)
    }

    pub fn is_running(&self, pid: u32) -> bool {
        self.table.is_running(pid)
    }

    /// Negotiate a shutdown and kill the tree if the root does not exit.
    ///
    /// A failed negotiation kills immediately. A completed one waits up to
    /// `request.timeout` for the root to exit first.
    pub async fn stop(&self, root: RootProcess, request: &ShutdownRequest) -> StopOutcome {
        let negotiation = self.shutdown(root, request).await;

        if let Err(failure) = &negotiation {
            warn!(pid = root.pid(), error = %failure, "Graceful shutdown failed, killing tree");
            return StopOutcome {
                negotiation,
                exited_gracefully: false,
                kill: Some(self.kill_tree(root)),
            };
        }

        if self.wait_for_exit(root.pid(), request.timeout).await {
            info!(pid = root.pid(), "Process exited gracefully");
            return StopOutcome {
                negotiation,
                exited_gracefully: true,
                kill: None,
            };
        }

        warn!(
            pid = root.pid(),
            timeout = ?request.timeout,
            "Process still running after shutdown request, killing tree"
        );
        StopOutcome {
            negotiation,
            exited_gracefully: false,
            kill: Some(self.kill_tree(root)),
        }
    }

    async fn wait_for_exit(&self, pid: u32, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let interval = self.config.poll_interval();

        loop {
            if !self.table.is_running(pid) {
                return true;
            }
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            debug!(pid = pid, "Waiting for process to exit");
            tokio::time::sleep(interval.min(deadline - now)).await;
        }
    }
}
