use schemars::schema_for;

use crate::model::WorkflowTemplate;

/// JSON Schema of the workflow template exchange format.
pub fn get_schema_json() -> String {
    let schema = schema_for!(WorkflowTemplate);
    serde_json::to_string_pretty(&schema).unwrap_or_default()
}

/// Print the JSON Schema for `WorkflowTemplate`.
pub fn run() -> anyhow::Result<()> {
    let schema = schema_for!(WorkflowTemplate);
    let json = serde_json::to_string_pretty(&schema)?;
    println!("{json}");
    Ok(())
}
