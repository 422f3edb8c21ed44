//! CLI configuration management.
//!
//! ```text
//! Cli
//! ├── command: Command            # register, start, execute, render
//! └── conductor: ConductorConfig  # server URL, credentials, HTTP timeout
//! ```
//!
//! Connection settings can be provided via CLI arguments or environment
//! variables. Use `--help` to see all available options.

use std::process;

use clap::Parser;
use conductor_reqwest::ConductorConfig;

use crate::command::Command;
use crate::{TRACING_TARGET_CONFIG, TRACING_TARGET_STARTUP};

/// Complete CLI configuration.
#[derive(Debug, Clone, Parser)]
#[command(name = "conductor")]
#[command(about = "Register and run Conductor workflow definitions")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Conductor server connection.
    #[clap(flatten)]
    pub conductor: ConductorConfig,
}

impl Cli {
    /// Loads environment variables from .env file (if enabled) and parses CLI arguments.
    ///
    /// The .env file is loaded before clap parses arguments so that its
    /// variables act as defaults.
    pub fn init() -> Self {
        Self::load_dotenv();
        Self::parse()
    }

    #[cfg(feature = "dotenv")]
    fn load_dotenv() {
        if let Err(err) = dotenvy::dotenv()
            && !err.not_found()
        {
            eprintln!("Warning: failed to load .env file: {err}");
        }
    }

    #[cfg(not(feature = "dotenv"))]
    fn load_dotenv() {}

    /// Logs configuration at debug level (no sensitive information).
    pub fn log(&self) {
        tracing::debug!(
            target: TRACING_TARGET_STARTUP,
            version = env!("CARGO_PKG_VERSION"),
            pid = process::id(),
            features = ?Self::enabled_features(),
            "Build information"
        );

        tracing::debug!(
            target: TRACING_TARGET_CONFIG,
            server_url = %self.conductor.server_url,
            authenticated = self.conductor.credentials().is_some(),
            http_timeout_secs = self.conductor.effective_timeout().as_secs(),
            command = self.command.name(),
            "Conductor configuration"
        );
    }

    /// Returns a list of enabled compile-time features.
    fn enabled_features() -> Vec<&'static str> {
        [cfg!(feature = "dotenv").then_some("dotenv")]
            .into_iter()
            .flatten()
            .collect()
    }
}
