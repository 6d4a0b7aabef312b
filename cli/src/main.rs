//! taskreaper CLI - Stop and kill process trees
//!
//! A command-line tool for inspecting process trees, shutting them down
//! gracefully, killing them, and running commands under tree supervision.

mod commands;
mod logging;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "taskreaper")]
#[command(author, version, about = "Stop and kill process trees")]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,

    /// Path to the configuration file (default: ~/.taskreaper/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the descendants of a process
    Tree {
        /// Root process id
        pid: u32,
    },

    /// Forcefully kill a process and all of its descendants
    Kill {
        /// Root process id
        pid: u32,
    },

    /// Ask a process tree to shut down, killing it if it does not
    Stop {
        /// Root process id
        pid: u32,

        /// Shutdown signal (SIGINT/interrupt or SIGTERM/terminate)
        #[arg(short, long)]
        signal: Option<String>,

        /// Seconds the root may take to exit before the tree is killed
        #[arg(short, long)]
        timeout: Option<u64>,
    },

    /// Run a command as the root of a new process group
    Run {
        /// Signal used to stop the command on Ctrl-C
        #[arg(short, long)]
        signal: Option<String>,

        /// Seconds the command may take to exit after Ctrl-C
        #[arg(short, long)]
        timeout: Option<u64>,

        /// Command and arguments
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        command: Vec<String>,
    },

    /// Show current configuration
    Config,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let config = commands::load_config(cli.config.as_deref()).await?;

    match cli.command {
        Commands::Tree { pid } => {
            commands::tree::run(pid, config, cli.json)?;
        }
        Commands::Kill { pid } => {
            commands::kill::run(pid, config, cli.json)?;
        }
        Commands::Stop {
            pid,
            signal,
            timeout,
        } => {
            commands::stop::run(pid, signal.as_deref(), timeout, config, cli.json).await?;
        }
        Commands::Run {
            signal,
            timeout,
            command,
        } => {
            let code =
                commands::run::run(&command, signal.as_deref(), timeout, config, cli.json).await?;
            if code != 0 {
                std::process::exit(code);
            }
        }
        Commands::Config => {
            commands::config::show(cli.config.as_deref(), &config, cli.json)?;
        }
    }

    Ok(())
}
