use serde::Serialize;

use crate::graph::WorkflowGraph;
use crate::model::node::{ExecutionStatus, NodeId, Position};

use super::ExecutionTracker;

/// A node ready for drawing.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderNode {
    pub id: NodeId,
    #[serde(rename = "type")]
    pub node_type: String,
    pub label: String,
    pub icon: String,
    pub position: Position,
    pub is_executing: bool,
    pub execution_status: ExecutionStatus,
    pub has_output: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionView {
    pub nodes: Vec<RenderNode>,
    /// Edges carrying data in this pass: source succeeded, target started.
    pub highlighted_edges: Vec<String>,
}

/// Merge the graph with the tracker's statuses.
pub fn render(graph: &WorkflowGraph, tracker: &ExecutionTracker) -> ExecutionView {
    let registry = graph.registry();
    let nodes = graph
        .nodes()
        .iter()
        .map(|node| {
            let status = tracker.status(&node.id);
            RenderNode {
                id: node.id.clone(),
                node_type: node.node_type.clone(),
                label: node.data.label.clone(),
                icon: registry.resolve(&node.node_type).icon.clone(),
                position: node.position,
                is_executing: status == ExecutionStatus::Running,
                execution_status: status,
                has_output: status == ExecutionStatus::Success,
            }
        })
        .collect();

    let highlighted_edges = graph
        .edges()
        .iter()
        .filter(|e| {
            tracker.status(&e.source) == ExecutionStatus::Success
                && matches!(
                    tracker.status(&e.target),
                    ExecutionStatus::Running | ExecutionStatus::Success
                )
        })
        .map(|e| e.id.clone())
        .collect();

    ExecutionView {
        nodes,
        highlighted_edges,
    }
}
