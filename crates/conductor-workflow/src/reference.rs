//! Reference expressions.
//!
//! Conductor resolves `${...}` expressions at run time against the workflow
//! input, the workflow output, or the input/output of a task addressed by its
//! reference name. The functions here only build the strings; nothing checks
//! that the addressed path exists.
//!
//! ```text
//! ${workflow.input}              workflow_input(None)
//! ${workflow.input.user.id}      workflow_input("user.id")
//! ${fetch.output.items[0]}       task_output("fetch", "items[0]")
//! ${fetch.output[0].id}          task_output("fetch", "[0].id")
//! ```

use crate::{Error, Result};

/// Root of workflow input expressions.
pub const WORKFLOW_INPUT: &str = "workflow.input";

/// Root of workflow output expressions.
pub const WORKFLOW_OUTPUT: &str = "workflow.output";

/// Prefix of attribute names that never resolve to output references.
pub const INTERNAL_PREFIX: char = '_';

/// Returns an expression addressing the workflow input.
pub fn workflow_input<'a>(path: impl Into<Option<&'a str>>) -> String {
    expression(WORKFLOW_INPUT, path.into())
}

/// Returns an expression addressing the workflow output.
pub fn workflow_output<'a>(path: impl Into<Option<&'a str>>) -> String {
    expression(WORKFLOW_OUTPUT, path.into())
}

/// Returns an expression addressing the input of a task.
pub fn task_input<'a>(reference_name: &str, path: impl Into<Option<&'a str>>) -> String {
    expression(&format!("{reference_name}.input"), path.into())
}

/// Returns an expression addressing the output of a task.
pub fn task_output<'a>(reference_name: &str, path: impl Into<Option<&'a str>>) -> String {
    expression(&format!("{reference_name}.output"), path.into())
}

/// Returns `${reference_name.output.name}` for a bare attribute name.
///
/// Names starting with [`INTERNAL_PREFIX`] are reserved and rejected with a
/// missing attribute error.
pub fn output_attribute(reference_name: &str, name: &str) -> Result<String> {
    if name.is_empty() || name.starts_with(INTERNAL_PREFIX) {
        return Err(Error::missing_attribute()
            .with_message(format!("task '{reference_name}' has no attribute '{name}'")));
    }

    Ok(format!("${{{reference_name}.output.{name}}}"))
}

fn expression(root: &str, path: Option<&str>) -> String {
    match path {
        None | Some("") => format!("${{{root}}}"),
        // The caller already supplied the separator.
        Some(path) if path.starts_with(['.', '[']) => format!("${{{root}{path}}}"),
        Some(path) => format!("${{{root}.{path}}}"),
    }
}
