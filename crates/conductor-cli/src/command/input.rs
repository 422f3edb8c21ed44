//! Reading definition documents and workflow input from the command line.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use anyhow::{Context, bail};
use conductor_workflow::definition::WorkflowDef;
use serde_json::{Map, Value};

/// Reads a workflow definition document from `path`.
pub fn load_definition(path: &Path) -> anyhow::Result<WorkflowDef> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read definition file {}", path.display()))?;

    let definition: WorkflowDef = serde_json::from_str(&contents)
        .with_context(|| format!("failed to parse definition file {}", path.display()))?;

    if definition.name.trim().is_empty() {
        bail!("definition file {} has an empty workflow name", path.display());
    }

    let mut seen = HashSet::new();
    if let Some(duplicate) = definition
        .reference_names()
        .into_iter()
        .find(|name| !seen.insert(*name))
    {
        bail!(
            "definition file {} uses task reference name '{duplicate}' more than once",
            path.display()
        );
    }

    Ok(definition)
}

/// Parses the `--input` argument. Absent input is an empty object.
pub fn parse_input(input: Option<&str>) -> anyhow::Result<Map<String, Value>> {
    let Some(input) = input else {
        return Ok(Map::new());
    };

    match serde_json::from_str(input).context("workflow input is not valid JSON")? {
        Value::Object(map) => Ok(map),
        other => bail!("workflow input must be a JSON object, got {other}"),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    fn write_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_definition_fills_defaults() {
        let file = write_file(r#"{"name": "order_flow", "version": 3}"#);
        let definition = load_definition(file.path()).unwrap();

        assert_eq!(definition.name, "order_flow");
        assert_eq!(definition.version, Some(3));
        assert_eq!(definition.schema_version, 2);
        assert_eq!(definition.timeout_seconds, 60);
        assert!(definition.restartable);
    }

    #[test]
    fn test_load_definition_errors() {
        let missing = Path::new("/nonexistent/definition.json");
        let error = load_definition(missing).unwrap_err();
        assert!(error.to_string().contains("failed to read"));

        let file = write_file("not json");
        let error = load_definition(file.path()).unwrap_err();
        assert!(error.to_string().contains("failed to parse"));

        let file = write_file(r#"{"name": "  "}"#);
        assert!(load_definition(file.path()).is_err());
    }

    #[test]
    fn test_load_definition_rejects_duplicate_references() {
        let file = write_file(
            r#"{
                "name": "order_flow",
                "tasks": [
                    {"name": "charge_card", "taskReferenceName": "charge", "type": "SIMPLE"},
                    {
                        "name": "DO_WHILE",
                        "taskReferenceName": "retry",
                        "type": "DO_WHILE",
                        "loopOver": [
                            {"name": "charge_card", "taskReferenceName": "charge", "type": "SIMPLE"}
                        ]
                    }
                ]
            }"#,
        );

        let error = load_definition(file.path()).unwrap_err();
        assert!(error.to_string().contains("'charge' more than once"));
    }

    #[test]
    fn test_parse_input() {
        assert!(parse_input(None).unwrap().is_empty());

        let input = parse_input(Some(r#"{"orderId": "o-1"}"#)).unwrap();
        assert_eq!(input["orderId"], "o-1");

        assert!(parse_input(Some("[1, 2]")).is_err());
        assert!(parse_input(Some("{")).is_err());
    }
}
