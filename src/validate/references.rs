use std::collections::HashSet;

use crate::model::WorkflowTemplate;

use super::ValidationError;

/// Check that all node IDs are unique.
pub fn check_duplicate_ids(template: &WorkflowTemplate) -> Vec<ValidationError> {
    let mut seen = HashSet::new();
    let mut errors = Vec::new();

    for node in &template.nodes {
        if !seen.insert(node.id()) {
            errors.push(ValidationError::DuplicateNodeId {
                node_id: node.id().to_string(),
            });
        }
    }

    errors
}

/// Check that every edge references existing nodes.
pub fn check_edge_references(template: &WorkflowTemplate) -> Vec<ValidationError> {
    let node_ids: HashSet<&str> = template.nodes.iter().map(|n| n.id()).collect();
    let mut errors = Vec::new();

    for edge in &template.edges {
        for endpoint in [&edge.source, &edge.target] {
            if !node_ids.contains(endpoint.as_str()) {
                errors.push(ValidationError::UnknownNode {
                    edge_id: edge.id.clone(),
                    node_id: endpoint.clone(),
                });
            }
        }
    }

    errors
}
