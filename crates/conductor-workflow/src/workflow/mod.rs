//! The workflow graph builder.

mod compose;
mod normalizer;
mod run;

use serde::Serialize;
use serde_json::{Map, Value};
use uuid::Uuid;

pub use self::normalizer::{insert_implicit_joins, normalize};
pub use self::run::{ExecuteOptions, StartOptions};
use crate::definition::{
    DEFAULT_TIMEOUT_SECONDS, SCHEMA_VERSION, TimeoutPolicy, WorkflowDef, WorkflowTask,
};
use crate::task::{ForkTask, InlineSubWorkflowTask, Task, TaskNode, TaskType};
use crate::{Error, Result, TRACING_TARGET, reference};

/// An ordered list of task nodes plus the metadata of one workflow definition.
///
/// The builder is a plain owned value. Tasks are appended with [`add`],
/// [`add_all`], [`fork`] or the `>>` operator, and the definition document
/// is produced by [`to_workflow_def`], which never changes the builder.
///
/// [`add`]: ConductorWorkflow::add
/// [`add_all`]: ConductorWorkflow::add_all
/// [`fork`]: ConductorWorkflow::fork
/// [`to_workflow_def`]: ConductorWorkflow::to_workflow_def
#[derive(Debug, Clone, PartialEq)]
pub struct ConductorWorkflow {
    name: String,
    version: Option<u32>,
    description: Option<String>,
    tasks: Vec<TaskNode>,
    owner_email: Option<String>,
    timeout_policy: Option<TimeoutPolicy>,
    timeout_seconds: u64,
    failure_workflow: String,
    restartable: bool,
    status_listener_sink: Option<String>,
    input_parameters: Vec<String>,
    output_parameters: Map<String, Value>,
    input_template: Map<String, Value>,
    variables: Map<String, Value>,
}

impl ConductorWorkflow {
    /// Creates an empty workflow.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: None,
            description: None,
            tasks: Vec::new(),
            owner_email: None,
            timeout_policy: None,
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            failure_workflow: String::new(),
            restartable: true,
            status_listener_sink: None,
            input_parameters: Vec::new(),
            output_parameters: Map::new(),
            input_template: Map::new(),
            variables: Map::new(),
        }
    }

    /// Returns the workflow name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the version, if set.
    pub fn version(&self) -> Option<u32> {
        self.version
    }

    /// Returns the description, if set.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the task nodes in insertion order, before expansion.
    pub fn tasks(&self) -> &[TaskNode] {
        &self.tasks
    }

    /// Returns the run timeout in seconds.
    pub fn timeout_seconds(&self) -> u64 {
        self.timeout_seconds
    }

    /// Returns whether completed runs may be restarted.
    pub fn restartable(&self) -> bool {
        self.restartable
    }

    /// Returns the status listener sink, if the listener is enabled.
    pub fn status_listener_sink(&self) -> Option<&str> {
        self.status_listener_sink.as_deref()
    }

    /// Returns the default input values.
    pub fn input_template(&self) -> &Map<String, Value> {
        &self.input_template
    }

    /// Sets the workflow name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the version.
    #[must_use]
    pub fn with_version(mut self, version: u32) -> Self {
        self.version = Some(version);
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the owner email.
    #[must_use]
    pub fn with_owner_email(mut self, owner_email: impl Into<String>) -> Self {
        self.owner_email = Some(owner_email.into());
        self
    }

    /// Sets what happens when a run exceeds its timeout.
    #[must_use]
    pub fn with_timeout_policy(mut self, timeout_policy: TimeoutPolicy) -> Self {
        self.timeout_policy = Some(timeout_policy);
        self
    }

    /// Sets the run timeout in seconds.
    #[must_use]
    pub fn with_timeout_seconds(mut self, timeout_seconds: u64) -> Self {
        self.timeout_seconds = timeout_seconds;
        self
    }

    /// Sets the workflow started when this one fails.
    #[must_use]
    pub fn with_failure_workflow(mut self, failure_workflow: impl Into<String>) -> Self {
        self.failure_workflow = failure_workflow.into();
        self
    }

    /// Sets whether completed runs may be restarted.
    #[must_use]
    pub fn with_restartable(mut self, restartable: bool) -> Self {
        self.restartable = restartable;
        self
    }

    /// Enables the status listener publishing to `sink`.
    #[must_use]
    pub fn with_status_listener(mut self, sink: impl Into<String>) -> Self {
        self.status_listener_sink = Some(sink.into());
        self
    }

    /// Disables the status listener and clears its sink.
    #[must_use]
    pub fn without_status_listener(mut self) -> Self {
        self.status_listener_sink = None;
        self
    }

    /// Documents the expected input names.
    #[must_use]
    pub fn with_input_parameters<I>(mut self, input_parameters: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.input_parameters = input_parameters.into_iter().map(Into::into).collect();
        self
    }

    /// Replaces the output mapping. `null` resets it.
    pub fn with_output_parameters(mut self, output_parameters: impl Serialize) -> Result<Self> {
        self.output_parameters = object("output parameters", output_parameters)?;
        Ok(self)
    }

    /// Sets a single output mapping.
    #[must_use]
    pub fn with_output_parameter(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.output_parameters.insert(key.into(), value.into());
        self
    }

    /// Replaces the default input values. `null` resets them.
    pub fn with_input_template(mut self, input_template: impl Serialize) -> Result<Self> {
        self.input_template = object("input template", input_template)?;
        Ok(self)
    }

    /// Replaces the initial workflow variables. `null` resets them.
    pub fn with_variables(mut self, variables: impl Serialize) -> Result<Self> {
        self.variables = object("variables", variables)?;
        Ok(self)
    }

    /// Appends a task node.
    #[must_use]
    pub fn add(mut self, task: impl Into<TaskNode>) -> Self {
        self.tasks.push(task.into());
        self
    }

    /// Appends task nodes in order.
    #[must_use]
    pub fn add_all<I>(mut self, tasks: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<TaskNode>,
    {
        self.tasks.extend(tasks.into_iter().map(Into::into));
        self
    }

    /// Appends a fork over `branches` with a generated reference name.
    ///
    /// The matching join is inserted on export unless the next node added is
    /// an explicit join.
    pub fn fork(mut self, branches: Vec<Vec<TaskNode>>) -> Result<Self> {
        let reference_name = format!("forked_{}", Uuid::new_v4().simple());
        self.tasks.push(ForkTask::new(reference_name, branches)?.into());
        Ok(self)
    }

    /// Returns an expression addressing this workflow's input.
    pub fn workflow_input<'a>(&self, path: impl Into<Option<&'a str>>) -> String {
        reference::workflow_input(path)
    }

    /// Returns an expression addressing this workflow's output.
    pub fn workflow_output<'a>(&self, path: impl Into<Option<&'a str>>) -> String {
        reference::workflow_output(path)
    }

    /// Exports the definition document.
    pub fn to_workflow_def(&self) -> WorkflowDef {
        let tasks = normalize(&self.tasks);

        tracing::debug!(
            target: TRACING_TARGET,
            workflow = %self.name,
            version = ?self.version,
            node_count = self.tasks.len(),
            task_count = tasks.len(),
            "Exported workflow definition"
        );

        WorkflowDef {
            name: self.name.clone(),
            version: self.version,
            description: self.description.clone(),
            tasks,
            input_parameters: self.input_parameters.clone(),
            output_parameters: self.output_parameters.clone(),
            failure_workflow: self.failure_workflow.clone(),
            schema_version: SCHEMA_VERSION,
            restartable: self.restartable,
            owner_email: self.owner_email.clone(),
            timeout_policy: self.timeout_policy,
            timeout_seconds: self.timeout_seconds,
            variables: self.variables.clone(),
            input_template: self.input_template.clone(),
            workflow_status_listener_enabled: self.status_listener_sink.is_some(),
            workflow_status_listener_sink: self.status_listener_sink.clone(),
        }
    }

    /// Exports this workflow as a single inline `SUB_WORKFLOW` task.
    ///
    /// Each call generates a new reference name.
    pub fn to_workflow_task(&self) -> WorkflowTask {
        self.to_inline_task().to_workflow_task()
    }

    /// Snapshots this workflow into an inline sub-workflow node.
    ///
    /// The reference name is `<name>_<suffix>` and the input template is
    /// copied into the node's inputs.
    pub fn to_inline_task(&self) -> InlineSubWorkflowTask {
        let mut task = Task::generated(unique_reference(&self.name), TaskType::SubWorkflow);
        for (key, value) in &self.input_template {
            task.set_input(key.clone(), value.clone());
        }

        InlineSubWorkflowTask::from_task(task, self)
    }
}

impl From<&ConductorWorkflow> for TaskNode {
    fn from(workflow: &ConductorWorkflow) -> Self {
        Self::InlineSubWorkflow(workflow.to_inline_task())
    }
}

impl From<ConductorWorkflow> for TaskNode {
    fn from(workflow: ConductorWorkflow) -> Self {
        Self::from(&workflow)
    }
}

/// Builds `<prefix>_<uuid>` with characters that are invalid in reference
/// names replaced by `_`.
fn unique_reference(prefix: &str) -> String {
    let prefix: String = prefix
        .chars()
        .map(|c| match c {
            '$' | '{' | '}' | '.' => '_',
            c if c.is_whitespace() => '_',
            c => c,
        })
        .collect();

    format!("{prefix}_{}", Uuid::new_v4().simple())
}

fn object(field: &str, value: impl Serialize) -> Result<Map<String, Value>> {
    match serde_json::to_value(value)? {
        Value::Null => Ok(Map::new()),
        Value::Object(map) => Ok(map),
        _ => Err(Error::validation().with_message(format!("workflow {field} must be an object"))),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::task::{DoWhileTask, JoinTask, validate_reference_name};

    fn simple(reference_name: &str) -> Task {
        Task::simple(reference_name, reference_name).unwrap()
    }

    #[test]
    fn test_defaults() {
        let def = ConductorWorkflow::new("empty").to_workflow_def();

        assert_eq!(def.schema_version, 2);
        assert_eq!(def.timeout_seconds, 60);
        assert!(def.restartable);
        assert!(def.failure_workflow.is_empty());
        assert!(def.tasks.is_empty());
        assert!(!def.workflow_status_listener_enabled);
        assert_eq!(def.version, None);
    }

    #[test]
    fn test_export_is_idempotent() {
        let workflow = ConductorWorkflow::new("orders")
            .with_version(1)
            .add(simple("a"))
            .fork(vec![vec![simple("b").into()], vec![simple("c").into()]])
            .unwrap()
            .add(simple("d"));

        let first = serde_json::to_string(&workflow.to_workflow_def()).unwrap();
        let second = serde_json::to_string(&workflow.to_workflow_def()).unwrap();

        assert_eq!(first, second);
        assert_eq!(workflow.tasks().len(), 3);
    }

    #[test]
    fn test_fork_reference_and_join() {
        let workflow = ConductorWorkflow::new("fan")
            .fork(vec![vec![simple("a").into()], vec![simple("b").into(), simple("c").into()]])
            .unwrap();

        let def = workflow.to_workflow_def();
        assert_eq!(def.tasks.len(), 2);

        let fork = &def.tasks[0];
        assert!(fork.task_reference_name.starts_with("forked_"));
        assert_eq!(
            def.tasks[1].task_reference_name,
            format!("join_{}", fork.task_reference_name)
        );
        assert_eq!(def.tasks[1].join_on, Some(vec!["a".to_owned(), "c".to_owned()]));
    }

    #[test]
    fn test_fork_followed_by_explicit_join() {
        let join = JoinTask::new("wait", vec!["a".into(), "b".into()]).unwrap();
        let def = ConductorWorkflow::new("fan")
            .fork(vec![vec![simple("a").into()], vec![simple("b").into()]])
            .unwrap()
            .add(join)
            .to_workflow_def();

        assert_eq!(def.tasks.len(), 2);
        assert_eq!(def.tasks[1].task_reference_name, "wait");
    }

    #[test]
    fn test_fork_with_empty_branch() {
        let error = ConductorWorkflow::new("fan")
            .fork(vec![vec![simple("a").into()], vec![]])
            .unwrap_err();

        assert_eq!(error.kind(), crate::ErrorKind::InvalidStructure);
    }

    #[test]
    fn test_status_listener_toggle() {
        let workflow = ConductorWorkflow::new("listened").with_status_listener("kafka:events");
        let def = workflow.to_workflow_def();
        assert!(def.workflow_status_listener_enabled);
        assert_eq!(def.workflow_status_listener_sink.as_deref(), Some("kafka:events"));

        let def = workflow.without_status_listener().to_workflow_def();
        assert!(!def.workflow_status_listener_enabled);
        assert!(def.workflow_status_listener_sink.is_none());
    }

    #[test]
    fn test_metadata_export() {
        let def = ConductorWorkflow::new("orders")
            .with_description("Order processing")
            .with_owner_email("team@example.com")
            .with_timeout_policy(TimeoutPolicy::AlertOnly)
            .with_timeout_seconds(600)
            .with_failure_workflow("orders_cleanup")
            .with_restartable(false)
            .with_input_parameters(["order_id", "customer"])
            .with_output_parameter("total", "${calc.output.total}")
            .with_input_template(json!({"currency": "EUR"}))
            .unwrap()
            .with_variables(json!({"attempts": 0}))
            .unwrap()
            .to_workflow_def();

        let value = serde_json::to_value(&def).unwrap();
        assert_eq!(value["description"], json!("Order processing"));
        assert_eq!(value["ownerEmail"], json!("team@example.com"));
        assert_eq!(value["timeoutPolicy"], json!("ALERT_ONLY"));
        assert_eq!(value["timeoutSeconds"], json!(600));
        assert_eq!(value["failureWorkflow"], json!("orders_cleanup"));
        assert_eq!(value["restartable"], json!(false));
        assert_eq!(value["inputParameters"], json!(["order_id", "customer"]));
        assert_eq!(value["outputParameters"], json!({"total": "${calc.output.total}"}));
        assert_eq!(value["inputTemplate"], json!({"currency": "EUR"}));
        assert_eq!(value["variables"], json!({"attempts": 0}));
        assert_eq!(value["schemaVersion"], json!(2));
    }

    #[test]
    fn test_non_object_maps_are_rejected() {
        assert!(ConductorWorkflow::new("w").with_variables(json!([1])).is_err());
        assert!(ConductorWorkflow::new("w").with_input_template("x").is_err());

        let workflow = ConductorWorkflow::new("w")
            .with_output_parameters(json!({"a": 1}))
            .unwrap()
            .with_output_parameters(Value::Null)
            .unwrap();
        assert!(workflow.to_workflow_def().output_parameters.is_empty());
    }

    #[test]
    fn test_to_workflow_task_embeds_definition() {
        let child = ConductorWorkflow::new("child")
            .with_version(4)
            .with_input_template(json!({"region": "eu"}))
            .unwrap()
            .add(simple("a"));

        let first = child.to_workflow_task();
        let second = child.to_workflow_task();

        assert_ne!(first.task_reference_name, second.task_reference_name);
        assert!(first.task_reference_name.starts_with("child_"));
        assert_eq!(first.task_type, "SUB_WORKFLOW");
        assert_eq!(first.input_parameters.get("region"), Some(&json!("eu")));

        let params = first.sub_workflow_param.unwrap();
        assert_eq!(params.name, "child");
        assert_eq!(params.version, Some(4));
        assert_eq!(params.workflow_definition.unwrap().tasks.len(), 1);
    }

    #[test]
    fn test_generated_reference_is_valid() {
        let reference_name = unique_reference("billing v2.1");
        assert!(reference_name.starts_with("billing_v2_1_"));
        assert!(validate_reference_name(&reference_name).is_ok());
    }

    #[test]
    fn test_loop_inside_workflow() {
        let looped = DoWhileTask::fixed("retry", 3, vec![simple("attempt").into()]).unwrap();
        let def = ConductorWorkflow::new("w").add(looped).to_workflow_def();

        assert_eq!(
            def.tasks[0].loop_condition.as_deref(),
            Some("if ( $.retry.iteration < 3 ) { true; } else { false; }")
        );
        assert_eq!(def.tasks[0].loop_over.as_ref().map(Vec::len), Some(1));
    }

    #[test]
    fn test_reference_helpers() {
        let workflow = ConductorWorkflow::new("w");
        assert_eq!(workflow.workflow_input("id"), "${workflow.input.id}");
        assert_eq!(workflow.workflow_output(None), "${workflow.output}");
    }

    #[test]
    fn test_add_all_preserves_order() {
        let workflow = ConductorWorkflow::new("w").add_all([simple("a"), simple("b"), simple("c")]);
        let references: Vec<_> = workflow
            .tasks()
            .iter()
            .map(TaskNode::reference_name)
            .collect();

        assert_eq!(references, vec!["a", "b", "c"]);
    }
}
