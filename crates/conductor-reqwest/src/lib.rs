#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod connect;
mod error;
mod service;

#[cfg(test)]
mod test_server;

pub use crate::connect::{
    ConductorClient, ConductorConfig, DEFAULT_SERVER_URL, DEFAULT_TIMEOUT_SECS, TRACING_TARGET,
};
pub use crate::error::{Error, Result};
