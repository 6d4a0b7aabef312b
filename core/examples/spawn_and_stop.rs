//! Example: spawn a small process tree, list it, then stop it.
//!
//! Usage:
//!   cargo run --example spawn_and_stop            # terminate
//!   cargo run --example spawn_and_stop interrupt  # console event + HTTP request

use std::env;
use std::time::Duration;

use taskreaper_core::{ControllerConfig, RootProcess, ShutdownRequest, SystemController};
use tokio::process::Command;

#[cfg(unix)]
fn tree_command() -> Command {
    let mut command = Command::new("sh");
    command.args(["-c", "sleep 60 & sleep 60 & wait"]);
    command
}

#[cfg(windows)]
fn tree_command() -> Command {
    let mut command = Command::new("cmd");
    command.args(["/C", "ping -n 60 127.0.0.1 > NUL"]);
    command
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let signal = env::args().nth(1);
    let timeout = Some(Duration::from_secs(2));
    let request = match ShutdownRequest::from_signal_name(signal.as_deref(), timeout) {
        Ok(request) => request,
        Err(e) => {
            eprintln!("{}", e);
            return;
        }
    };

    let controller = match SystemController::new(ControllerConfig::default()) {
        Ok(controller) => controller,
        Err(e) => {
            eprintln!("Error creating controller: {}", e);
            return;
        }
    };

    let mut command = tree_command();
    controller.configure_process_group(&mut command);
    let mut child = match command.spawn() {
        Ok(child) => child,
        Err(e) => {
            eprintln!("Error spawning tree: {}", e);
            return;
        }
    };
    let Some(root) = RootProcess::from_child(&child) else {
        eprintln!("Child exited immediately");
        return;
    };

    // Let the shell start its children
    tokio::time::sleep(Duration::from_millis(500)).await;

    match controller.descendants_of(root.pid()) {
        Ok(descendants) => println!("Root {} has descendants {:?}", root.pid(), descendants),
        Err(e) => eprintln!("Error listing descendants: {}", e),
    }

    println!("Stopping with {} (timeout {:?})...", request.signal, request.timeout);
    let outcome = controller.stop(root, &request).await;

    match &outcome.negotiation {
        Ok(()) => println!("Negotiation completed"),
        Err(e) => println!("Negotiation failed: {}", e),
    }
    println!("Exited gracefully: {}", outcome.exited_gracefully);
    if let Some(report) = &outcome.kill {
        for o in report.outcomes() {
            let state = if o.is_ok() { "killed" } else { "FAILED" };
            println!("  {:<8} {:?} {}", o.pid, o.role, state);
        }
    }

    let _ = child.wait().await;
}
