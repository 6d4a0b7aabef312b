//! Config command - show the effective configuration.

use std::path::Path;

use anyhow::Result;
use serde_json::json;
use taskreaper_core::ControllerConfig;

use super::config_store;

pub fn show(path: Option<&Path>, config: &ControllerConfig, json: bool) -> Result<()> {
    let store = config_store(path)?;

    if json {
        let output = json!({
            "path": store.config_path(),
            "config": config,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("Configuration file: {}", store.config_path().display());
    println!();
    println!("Shutdown endpoint:  {}", config.shutdown_url());
    println!("Request timeout:    {:?}", config.shutdown_timeout());
    println!("Console event:      {}", config.console_event);
    println!("Address variable:   {}", config.shutdown_addr_env);
    println!("Poll interval:      {:?}", config.poll_interval());
    Ok(())
}
