//! Stop command - graceful shutdown, escalating to a tree kill.

use anyhow::{bail, Result};
use serde_json::json;
use taskreaper_core::{ControllerConfig, RootProcess, StopOutcome, SystemController};

use super::{print_report, report_json, shutdown_request};

pub async fn run(
    pid: u32,
    signal: Option<&str>,
    timeout_secs: Option<u64>,
    config: ControllerConfig,
    json: bool,
) -> Result<()> {
    let request = shutdown_request(signal, timeout_secs)?;
    let controller = SystemController::new(config)?;

    let outcome = controller.stop(RootProcess::new(pid), &request).await;
    print_outcome(&outcome, json)?;

    if !outcome.is_clean() {
        bail!("Process tree of {} was not fully stopped", pid);
    }
    Ok(())
}

pub(crate) fn print_outcome(outcome: &StopOutcome, json: bool) -> Result<()> {
    if json {
        let negotiation = match &outcome.negotiation {
            Ok(()) => json!("completed"),
            Err(e) => json!({ "failed": e.to_string() }),
        };
        let output = json!({
            "negotiation": negotiation,
            "exitedGracefully": outcome.exited_gracefully,
            "kill": outcome.kill.as_ref().map(report_json),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    match &outcome.negotiation {
        Ok(()) if outcome.exited_gracefully => println!("Process exited gracefully."),
        Ok(()) => println!("Shutdown requested, but the process did not exit in time."),
        Err(e) => println!("Graceful shutdown failed: {}", e),
    }
    if let Some(report) = &outcome.kill {
        print_report(report);
    }
    Ok(())
}
