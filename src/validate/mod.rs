mod ports;
mod references;

use std::path::Path;

use thiserror::Error;

use crate::graph::HandleSide;
use crate::model::WorkflowTemplate;
use crate::registry::NodeTypeRegistry;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Edge `{edge_id}` references unknown node `{node_id}`")]
    UnknownNode { edge_id: String, node_id: String },

    #[error("Duplicate node ID `{node_id}`")]
    DuplicateNodeId { node_id: String },

    #[error("Edge `{edge_id}` uses {side} port `{handle}` which node `{node_id}` does not have")]
    InvalidHandle {
        edge_id: String,
        node_id: String,
        handle: String,
        side: HandleSide,
    },
}

/// Load and fully validate a template from a JSON file.
pub fn load_and_validate(path: &Path) -> Result<WorkflowTemplate, Vec<ValidationError>> {
    let contents = std::fs::read_to_string(path).map_err(|e| vec![ValidationError::Io(e)])?;
    let template: WorkflowTemplate =
        serde_json::from_str(&contents).map_err(|e| vec![ValidationError::Json(e)])?;
    validate(&template)?;
    Ok(template)
}

/// Validate a template, collecting all errors.
///
/// Cycles and unknown node types are not errors: the engine orders
/// execution, and unknown types render with the fallback descriptor.
pub fn validate(template: &WorkflowTemplate) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    errors.extend(references::check_duplicate_ids(template));
    errors.extend(references::check_edge_references(template));
    errors.extend(ports::check_handles(template));

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Node types in the template that the registry does not know.
pub fn unknown_types<'a>(template: &'a WorkflowTemplate, registry: &NodeTypeRegistry) -> Vec<&'a str> {
    let mut unknown: Vec<&str> = template
        .nodes
        .iter()
        .map(|n| n.node_type.as_str())
        .filter(|t| !registry.contains(t))
        .collect();
    unknown.sort_unstable();
    unknown.dedup();
    unknown
}

/// CLI entry point for the `validate` subcommand.
pub fn run(path: &Path) -> anyhow::Result<()> {
    match load_and_validate(path) {
        Ok(template) => {
            println!(
                "Template '{}' is valid. {} nodes, {} edges.",
                template.name,
                template.nodes.len(),
                template.edges.len()
            );
            let registry = NodeTypeRegistry::builtin();
            for t in unknown_types(&template, &registry) {
                println!("  note: node type `{t}` is not in the catalog; it will render as a generic node");
            }
            if crate::graph::topo::has_cycle(&template.nodes, &template.edges) {
                println!("  note: the graph contains a cycle; the engine decides whether it can run");
            }
            Ok(())
        }
        Err(errors) => {
            eprintln!("Validation failed with {} error(s):", errors.len());
            for (i, e) in errors.iter().enumerate() {
                eprintln!("  {}. {}", i + 1, e);
            }
            std::process::exit(1);
        }
    }
}
