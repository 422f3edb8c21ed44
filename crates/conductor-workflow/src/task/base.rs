//! The task node shared by every task variant.

use serde::Serialize;
use serde_json::{Map, Value};

use super::TaskType;
use crate::definition::{CacheConfig, WorkflowTask};
use crate::{Error, Result, reference};

/// Characters that would break `${...}` expressions if used in a reference name.
const RESERVED_CHARACTERS: [char; 4] = ['$', '{', '}', '.'];

/// A primitive task node.
///
/// The reference name is fixed at construction and validated so that every
/// expression produced by [`Task::output`] and [`Task::input`] is well-formed.
/// All other attributes are changed through the `with_*` (consuming) or
/// `set_*` (borrowing) setters, which take ownership of what they store.
#[derive(Debug, Clone, PartialEq)]
pub struct Task {
    reference_name: String,
    kind: TaskType,
    name: String,
    description: Option<String>,
    optional: Option<bool>,
    input_parameters: Map<String, Value>,
    cache_key: Option<String>,
    cache_ttl_seconds: u64,
    expression: Option<String>,
    evaluator_type: Option<String>,
}

impl Task {
    /// Creates a task of the given type.
    ///
    /// The task name defaults to the wire name of the type.
    pub fn new(reference_name: impl Into<String>, kind: TaskType) -> Result<Self> {
        let reference_name = reference_name.into();
        validate_reference_name(&reference_name)?;
        Ok(Self::generated(reference_name, kind))
    }

    /// Creates a task whose reference name was produced by this crate.
    pub(crate) fn generated(reference_name: String, kind: TaskType) -> Self {
        Self {
            reference_name,
            kind,
            name: kind.as_str().to_owned(),
            description: None,
            optional: None,
            input_parameters: Map::new(),
            cache_key: None,
            cache_ttl_seconds: 0,
            expression: None,
            evaluator_type: None,
        }
    }

    /// Creates a `SIMPLE` task executed by workers polling `task_def_name`.
    pub fn simple(task_def_name: impl Into<String>, reference_name: impl Into<String>) -> Result<Self> {
        Ok(Self::new(reference_name, TaskType::Simple)?.with_name(task_def_name))
    }

    /// Creates an `INLINE` task evaluating `script` with the given evaluator.
    pub fn inline(
        reference_name: impl Into<String>,
        script: impl Into<String>,
        evaluator_type: impl Into<String>,
    ) -> Result<Self> {
        Ok(Self::new(reference_name, TaskType::Inline)?
            .with_input("expression", Value::String(script.into()))
            .with_input("evaluatorType", Value::String(evaluator_type.into())))
    }

    /// Creates a `SET_VARIABLE` task storing `variables` on the workflow.
    pub fn set_variable(reference_name: impl Into<String>, variables: impl Serialize) -> Result<Self> {
        Self::new(reference_name, TaskType::SetVariable)?.with_input_parameters(variables)
    }

    /// Creates a `WAIT` task that completes after `duration` (e.g. `"10s"`).
    pub fn wait_for(reference_name: impl Into<String>, duration: impl Into<String>) -> Result<Self> {
        Ok(Self::new(reference_name, TaskType::Wait)?.with_input("duration", Value::String(duration.into())))
    }

    /// Creates a `WAIT` task that completes at `until` (e.g. `"2026-01-01 00:00 UTC"`).
    pub fn wait_until(reference_name: impl Into<String>, until: impl Into<String>) -> Result<Self> {
        Ok(Self::new(reference_name, TaskType::Wait)?.with_input("until", Value::String(until.into())))
    }

    /// Creates an `HTTP` task issuing `http_request`.
    pub fn http(reference_name: impl Into<String>, http_request: impl Serialize) -> Result<Self> {
        let http_request = serde_json::to_value(http_request)?;
        Ok(Self::new(reference_name, TaskType::Http)?.with_input("http_request", http_request))
    }

    /// Creates a `JSON_JQ_TRANSFORM` task applying `query`.
    pub fn json_jq(reference_name: impl Into<String>, query: impl Into<String>) -> Result<Self> {
        Ok(Self::new(reference_name, TaskType::JsonJqTransform)?
            .with_input("queryExpression", Value::String(query.into())))
    }

    /// Creates a `TERMINATE` task ending the workflow with `status`.
    pub fn terminate(
        reference_name: impl Into<String>,
        status: impl Into<String>,
        reason: Option<String>,
    ) -> Result<Self> {
        let mut task = Self::new(reference_name, TaskType::Terminate)?
            .with_input("terminationStatus", Value::String(status.into()));
        if let Some(reason) = reason {
            task.set_input("terminationReason", reason);
        }
        Ok(task)
    }

    /// Returns the reference name, unique within a workflow definition.
    pub fn reference_name(&self) -> &str {
        &self.reference_name
    }

    /// Returns the task type.
    pub fn kind(&self) -> TaskType {
        self.kind
    }

    /// Returns the task definition name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the description, if set.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the optional flag. `None` means the task is required.
    pub fn optional(&self) -> Option<bool> {
        self.optional
    }

    /// Returns the input parameters.
    pub fn input_parameters(&self) -> &Map<String, Value> {
        &self.input_parameters
    }

    /// Returns the cache key and time to live, if caching is enabled.
    pub fn cache(&self) -> Option<(&str, u64)> {
        match &self.cache_key {
            Some(key) if self.cache_ttl_seconds > 0 => Some((key.as_str(), self.cache_ttl_seconds)),
            _ => None,
        }
    }

    /// Returns the expression evaluated by decision-like task types.
    pub fn expression(&self) -> Option<&str> {
        self.expression.as_deref()
    }

    /// Returns the evaluator used for [`Task::expression`].
    pub fn evaluator_type(&self) -> Option<&str> {
        self.evaluator_type.as_deref()
    }

    /// Sets the task definition name.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Sets the description.
    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = Some(description.into());
    }

    /// Marks the task as optional, so its failure does not fail the workflow.
    pub fn set_optional(&mut self, optional: bool) {
        self.optional = Some(optional);
    }

    /// Replaces all input parameters.
    ///
    /// `null` resets the parameters to an empty map. Any other value must
    /// serialize to a JSON object.
    pub fn set_input_parameters(&mut self, input_parameters: impl Serialize) -> Result<()> {
        self.input_parameters = match serde_json::to_value(input_parameters)? {
            Value::Null => Map::new(),
            Value::Object(map) => map,
            other => {
                return Err(Error::validation().with_message(format!(
                    "input parameters of '{}' must be an object, got {}",
                    self.reference_name,
                    value_type(&other)
                )));
            }
        };
        Ok(())
    }

    /// Merges the fields of `input_parameters` into the existing parameters.
    ///
    /// Keys already present are overwritten. `null` is a no-op.
    pub fn extend_input_parameters(&mut self, input_parameters: impl Serialize) -> Result<()> {
        match serde_json::to_value(input_parameters)? {
            Value::Null => Ok(()),
            Value::Object(map) => {
                self.input_parameters.extend(map);
                Ok(())
            }
            other => Err(Error::validation().with_message(format!(
                "input parameters of '{}' must be an object, got {}",
                self.reference_name,
                value_type(&other)
            ))),
        }
    }

    /// Sets a single input parameter.
    pub fn set_input(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.input_parameters.insert(key.into(), value.into());
    }

    /// Enables result caching under `key` for `ttl_seconds`.
    ///
    /// A zero time to live leaves caching disabled on export.
    pub fn set_cache(&mut self, key: impl Into<String>, ttl_seconds: u64) {
        self.cache_key = Some(key.into());
        self.cache_ttl_seconds = ttl_seconds;
    }

    /// Sets the expression evaluated by decision-like task types.
    pub fn set_expression(&mut self, expression: impl Into<String>) {
        self.expression = Some(expression.into());
    }

    /// Sets the evaluator used for the expression, e.g. `javascript`.
    pub fn set_evaluator_type(&mut self, evaluator_type: impl Into<String>) {
        self.evaluator_type = Some(evaluator_type.into());
    }

    /// Consuming form of [`Task::set_name`].
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.set_name(name);
        self
    }

    /// Consuming form of [`Task::set_description`].
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.set_description(description);
        self
    }

    /// Consuming form of [`Task::set_optional`].
    #[must_use]
    pub fn with_optional(mut self, optional: bool) -> Self {
        self.set_optional(optional);
        self
    }

    /// Consuming form of [`Task::set_input_parameters`].
    pub fn with_input_parameters(mut self, input_parameters: impl Serialize) -> Result<Self> {
        self.set_input_parameters(input_parameters)?;
        Ok(self)
    }

    /// Consuming form of [`Task::set_input`].
    #[must_use]
    pub fn with_input(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set_input(key, value);
        self
    }

    /// Consuming form of [`Task::set_cache`].
    #[must_use]
    pub fn with_cache(mut self, key: impl Into<String>, ttl_seconds: u64) -> Self {
        self.set_cache(key, ttl_seconds);
        self
    }

    /// Consuming form of [`Task::set_expression`].
    #[must_use]
    pub fn with_expression(mut self, expression: impl Into<String>) -> Self {
        self.set_expression(expression);
        self
    }

    /// Consuming form of [`Task::set_evaluator_type`].
    #[must_use]
    pub fn with_evaluator_type(mut self, evaluator_type: impl Into<String>) -> Self {
        self.set_evaluator_type(evaluator_type);
        self
    }

    /// Returns an expression addressing this task's output, or a path within it.
    pub fn output<'a>(&self, path: impl Into<Option<&'a str>>) -> String {
        reference::task_output(&self.reference_name, path)
    }

    /// Returns an expression addressing this task's input, or a path within it.
    pub fn input<'a>(&self, path: impl Into<Option<&'a str>>) -> String {
        reference::task_input(&self.reference_name, path)
    }

    /// Returns `${<ref>.output.<name>}`.
    ///
    /// Fails with a missing attribute error for internal names (leading `_`).
    pub fn output_ref(&self, name: &str) -> Result<String> {
        reference::output_attribute(&self.reference_name, name)
    }

    /// Converts this task into its primitive wire form.
    pub fn to_workflow_task(&self) -> WorkflowTask {
        let mut task = WorkflowTask::new(&self.name, &self.reference_name, self.kind);
        task.description = self.description.clone();
        task.input_parameters = self.input_parameters.clone();
        task.optional = self.optional;
        task.cache_config = self.cache().map(|(key, ttl)| CacheConfig {
            key: key.to_owned(),
            ttl_in_second: ttl,
        });
        task.expression = self.expression.clone();
        task.evaluator_type = self.evaluator_type.clone();
        task
    }
}

/// Checks that `reference_name` can be embedded in a reference expression.
pub fn validate_reference_name(reference_name: &str) -> Result<()> {
    if reference_name.is_empty() {
        return Err(Error::validation().with_message("task reference name must not be empty"));
    }

    if let Some(c) = reference_name
        .chars()
        .find(|c| c.is_whitespace() || RESERVED_CHARACTERS.contains(c))
    {
        return Err(Error::validation().with_message(format!(
            "task reference name '{reference_name}' contains invalid character {c:?}"
        )));
    }

    Ok(())
}

fn value_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
