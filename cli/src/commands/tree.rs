//! Tree command - show the descendants of a process.

use anyhow::{Context, Result};
use serde_json::json;
use taskreaper_core::{ControllerConfig, SystemController};

pub fn run(pid: u32, config: ControllerConfig, json: bool) -> Result<()> {
    let controller = SystemController::new(config)?;
    let descendants = controller
        .descendants_of(pid)
        .context("Failed to enumerate processes")?;

    if json {
        let output = json!({
            "root": pid,
            "running": controller.is_running(pid),
            "descendants": descendants,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    if !controller.is_running(pid) {
        println!("Process {} is not running.", pid);
    }

    if descendants.is_empty() {
        println!("Process {} has no descendants.", pid);
        return Ok(());
    }

    println!("{:<8} ROLE", "PID");
    println!("{}", "-".repeat(20));
    println!("{:<8} root", pid);
    for descendant in &descendants {
        println!("{:<8} descendant", descendant);
    }

    println!("\nTotal: {} descendants", descendants.len());
    Ok(())
}
