//! Conductor client module.
//!
//! This module provides the main client interface for the server API.
//! It wraps the `reqwest` crate and caches the access token.

mod client;
mod config;

pub(crate) use client::decode;
pub use client::{ConductorClient, TRACING_TARGET};
pub use config::{ConductorConfig, DEFAULT_SERVER_URL, DEFAULT_TIMEOUT_SECS};
