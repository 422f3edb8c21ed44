#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod command;
mod config;
mod telemetry;

use std::process;

use anyhow::Context;
use conductor_reqwest::ConductorClient;

use crate::config::Cli;

// Tracing target constants
pub const TRACING_TARGET_STARTUP: &str = "conductor_cli::startup";
pub const TRACING_TARGET_COMMAND: &str = "conductor_cli::command";
pub const TRACING_TARGET_CONFIG: &str = "conductor_cli::config";

#[tokio::main]
async fn main() {
    let Err(error) = run().await else {
        process::exit(0);
    };

    if tracing::enabled!(tracing::Level::ERROR) {
        tracing::error!(
            target: TRACING_TARGET_STARTUP,
            error = %error,
            "command failed"
        );
    } else {
        eprintln!("Error: {error:#}");
    }

    process::exit(1);
}

/// Main application entry point.
async fn run() -> anyhow::Result<()> {
    let cli = Cli::init();

    telemetry::init_tracing()?;
    cli.log();

    let client = ConductorClient::new(cli.conductor.clone())
        .context("failed to create conductor client")?;
    let output = cli.command.run(&client.into_service()).await?;

    println!("{output}");
    Ok(())
}
