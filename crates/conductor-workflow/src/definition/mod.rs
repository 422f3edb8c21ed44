//! Wire types of the definition document submitted to the engine.
//!
//! Every type here serializes to the engine's camelCase JSON. Optional fields
//! are omitted when unset, and deserialization fills in the same defaults the
//! builder uses so that documents written by hand load cleanly.

mod task;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum::{AsRefStr, Display, EnumString};

pub use self::task::{CacheConfig, SubWorkflowParams, WorkflowTask};

/// Definition schema version emitted by this crate.
pub const SCHEMA_VERSION: u32 = 2;

/// Default workflow timeout in seconds.
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 60;

/// What the engine does once a workflow exceeds its timeout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[derive(Serialize, Deserialize, AsRefStr, Display, EnumString)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum TimeoutPolicy {
    /// Terminate the workflow as timed out.
    #[default]
    #[serde(rename = "TIME_OUT_WF")]
    #[strum(serialize = "TIME_OUT_WF")]
    TimeOutWf,
    /// Only raise an alert and keep running.
    AlertOnly,
}

/// A complete workflow definition document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowDef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Primitive tasks in execution order.
    #[serde(default)]
    pub tasks: Vec<WorkflowTask>,
    /// Names of expected inputs. Documentation only.
    #[serde(default)]
    pub input_parameters: Vec<String>,
    #[serde(default)]
    pub output_parameters: Map<String, Value>,
    /// Name of the workflow started when this one fails. Empty for none.
    #[serde(default)]
    pub failure_workflow: String,
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    #[serde(default = "default_restartable")]
    pub restartable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_policy: Option<TimeoutPolicy>,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
    #[serde(default)]
    pub variables: Map<String, Value>,
    /// Default input values merged under the caller-provided input.
    #[serde(default)]
    pub input_template: Map<String, Value>,
    #[serde(default)]
    pub workflow_status_listener_enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workflow_status_listener_sink: Option<String>,
}

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

fn default_restartable() -> bool {
    true
}

fn default_timeout_seconds() -> u64 {
    DEFAULT_TIMEOUT_SECONDS
}

impl WorkflowDef {
    /// Collects every reference name in the document, including the ones in
    /// loop bodies and fork branches.
    ///
    /// Inline sub-workflow definitions have their own namespace and are not
    /// visited.
    pub fn reference_names(&self) -> Vec<&str> {
        let mut names = Vec::new();
        collect_reference_names(&self.tasks, &mut names);
        names
    }
}

fn collect_reference_names<'a>(tasks: &'a [WorkflowTask], names: &mut Vec<&'a str>) {
    for task in tasks {
        names.push(task.task_reference_name.as_str());
        if let Some(loop_over) = &task.loop_over {
            collect_reference_names(loop_over, names);
        }
        for branch in task.fork_tasks.iter().flatten() {
            collect_reference_names(branch, names);
        }
    }
}
