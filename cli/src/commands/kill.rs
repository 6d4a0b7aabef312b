//! Kill command - forcefully kill a process tree.

use anyhow::Result;
use taskreaper_core::{ControllerConfig, RootProcess, SystemController};

use super::{print_report, report_json};

pub fn run(pid: u32, config: ControllerConfig, json: bool) -> Result<()> {
    let controller = SystemController::new(config)?;
    let report = controller.kill_tree(RootProcess::new(pid));

    if json {
        println!("{}", serde_json::to_string_pretty(&report_json(&report))?);
    } else {
        print_report(&report);
    }

    report.into_result()?;
    Ok(())
}
