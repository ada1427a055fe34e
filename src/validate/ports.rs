use std::collections::HashMap;

use crate::graph::HandleSide;
use crate::model::{WorkflowNode, WorkflowTemplate};

use super::ValidationError;

/// Check that every edge names an output port on its source and an input
/// port on its target, using the ports stored on the template's nodes.
/// Edges with missing endpoints are left to `check_edge_references`.
pub fn check_handles(template: &WorkflowTemplate) -> Vec<ValidationError> {
    let nodes: HashMap<&str, &WorkflowNode> =
        template.nodes.iter().map(|n| (n.id(), n)).collect();
    let mut errors = Vec::new();

    for edge in &template.edges {
        if let Some(src) = nodes.get(edge.source.as_str()) {
            if !src.has_output(&edge.source_handle) {
                errors.push(ValidationError::InvalidHandle {
                    edge_id: edge.id.clone(),
                    node_id: edge.source.clone(),
                    handle: edge.source_handle.clone(),
                    side: HandleSide::Source,
                });
            }
        }
        if let Some(dst) = nodes.get(edge.target.as_str()) {
            if !dst.has_input(&edge.target_handle) {
                errors.push(ValidationError::InvalidHandle {
                    edge_id: edge.id.clone(),
                    node_id: edge.target.clone(),
                    handle: edge.target_handle.clone(),
                    side: HandleSide::Target,
                });
            }
        }
    }

    errors
}
