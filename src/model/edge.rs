use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::node::NodeId;

/// A connection from an output port of one node to an input port of another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct WorkflowEdge {
    pub id: String,
    /// Source node ID.
    pub source: NodeId,
    /// Destination node ID.
    pub target: NodeId,
    /// Output port name on the source node.
    #[serde(rename = "sourceHandle")]
    pub source_handle: String,
    /// Input port name on the target node.
    #[serde(rename = "targetHandle")]
    pub target_handle: String,
}

impl WorkflowEdge {
    pub fn touches(&self, node_id: &str) -> bool {
        self.source == node_id || self.target == node_id
    }
}
