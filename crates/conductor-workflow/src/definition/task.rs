//! Primitive task definition, the wire form of a single task.

use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::WorkflowDef;
use crate::task::TaskType;

/// A single non-decomposable task entry of a workflow definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowTask {
    /// Task definition name (or the task type for system tasks).
    pub name: String,
    /// Unique reference name within the workflow definition.
    pub task_reference_name: String,
    /// Wire name of the task type, e.g. `FORK_JOIN`.
    #[serde(rename = "type")]
    pub task_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub input_parameters: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub optional: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_config: Option<CacheConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expression: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evaluator_type: Option<String>,
    /// Loop condition of `DO_WHILE` tasks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loop_condition: Option<String>,
    /// Loop body of `DO_WHILE` tasks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loop_over: Option<Vec<WorkflowTask>>,
    /// Parallel branches of `FORK_JOIN` tasks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fork_tasks: Option<Vec<Vec<WorkflowTask>>>,
    /// Reference names a `JOIN` task waits on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub join_on: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_workflow_param: Option<SubWorkflowParams>,
    /// Input key holding the task list of `FORK_JOIN_DYNAMIC` tasks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dynamic_fork_tasks_param: Option<String>,
    /// Input key holding the per-task inputs of `FORK_JOIN_DYNAMIC` tasks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dynamic_fork_tasks_input_param_name: Option<String>,
}

impl WorkflowTask {
    /// Creates a task entry with only its identity set.
    pub fn new(
        name: impl Into<String>,
        task_reference_name: impl Into<String>,
        task_type: TaskType,
    ) -> Self {
        Self {
            name: name.into(),
            task_reference_name: task_reference_name.into(),
            task_type: task_type.to_string(),
            description: None,
            input_parameters: Map::new(),
            optional: None,
            cache_config: None,
            expression: None,
            evaluator_type: None,
            loop_condition: None,
            loop_over: None,
            fork_tasks: None,
            join_on: None,
            sub_workflow_param: None,
            dynamic_fork_tasks_param: None,
            dynamic_fork_tasks_input_param_name: None,
        }
    }

    /// Parses the wire type, if it is one this crate knows.
    pub fn kind(&self) -> Option<TaskType> {
        TaskType::from_str(&self.task_type).ok()
    }

    /// Returns whether this is a static `FORK_JOIN` task.
    pub fn is_fork(&self) -> bool {
        self.task_type == TaskType::ForkJoin.as_ref()
    }

    /// Returns whether this is a `JOIN` task.
    pub fn is_join(&self) -> bool {
        self.task_type == TaskType::Join.as_ref()
    }
}

/// Result caching settings of a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheConfig {
    /// Cache key, usually built from input expressions.
    pub key: String,
    /// Time to live of cached output in seconds.
    pub ttl_in_second: u64,
}

/// Sub-workflow pointer carried by `SUB_WORKFLOW` tasks.
///
/// Either `workflow_definition` is set (inline) or the engine looks the
/// definition up by `name` and `version`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubWorkflowParams {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u32>,
    /// Task name to worker domain routing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_to_domain: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workflow_definition: Option<Box<WorkflowDef>>,
}
