//! Subcommand handlers.

pub mod config;
pub mod kill;
pub mod run;
pub mod stop;
pub mod tree;

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde_json::{json, Value};
use taskreaper_core::{ConfigStore, ControllerConfig, KillReport, ShutdownRequest};

/// Open the config store at `path`, or at the default location.
pub fn config_store(path: Option<&Path>) -> Result<ConfigStore> {
    match path {
        Some(path) => Ok(ConfigStore::with_path(path.to_path_buf())),
        None => ConfigStore::new().context("Failed to locate configuration"),
    }
}

pub async fn load_config(path: Option<&Path>) -> Result<ControllerConfig> {
    let store = config_store(path)?;
    store
        .load()
        .await
        .with_context(|| format!("Failed to load {}", store.config_path().display()))
}

pub fn shutdown_request(
    signal: Option<&str>,
    timeout_secs: Option<u64>,
) -> Result<ShutdownRequest> {
    Ok(ShutdownRequest::from_signal_name(
        signal,
        timeout_secs.map(Duration::from_secs),
    )?)
}

pub fn report_json(report: &KillReport) -> Value {
    let outcomes: Vec<Value> = report
        .outcomes()
        .iter()
        .map(|o| {
            json!({
                "pid": o.pid,
                "role": o.role,
                "error": o.result.as_ref().err().map(|e| e.to_string()),
            })
        })
        .collect();

    json!({
        "root": report.root(),
        "complete": report.is_complete(),
        "snapshotError": report.snapshot_error().map(|e| e.to_string()),
        "outcomes": outcomes,
        "skipped": report.skipped(),
    })
}

pub fn print_report(report: &KillReport) {
    if let Some(e) = report.snapshot_error() {
        eprintln!("Warning: descendants unknown ({}), only the root was killed", e);
    }

    for outcome in report.outcomes() {
        match &outcome.result {
            Ok(()) => println!("Killed {:<8} ({:?})", outcome.pid, outcome.role),
            Err(e) => println!("Failed {:<8} ({:?}): {}", outcome.pid, outcome.role, e.source),
        }
    }
    for pid in report.skipped() {
        println!("Skipped {:<7} (own process)", pid);
    }
}
