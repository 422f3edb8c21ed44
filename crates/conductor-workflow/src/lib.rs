#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

/// Tracing target for workflow construction and export.
pub const TRACING_TARGET: &str = "conductor_workflow";

mod error;

pub mod definition;
pub mod executor;
pub mod prelude;
pub mod reference;
pub mod task;
pub mod workflow;

pub use error::{BoxedError, Error, ErrorKind, Result};
pub use workflow::ConductorWorkflow;
