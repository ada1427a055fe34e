use std::borrow::Cow;
use std::collections::BTreeMap;

use schemars::{JsonSchema, Schema, SchemaGenerator};
use serde::{Deserialize, Serialize};

use super::config::{ConfigError, NodeConfig};

/// A unique identifier for a node within a workflow.
pub type NodeId = String;

/// Port name → port type tag (e.g. `"price" → "number"`), ordered by name.
pub type Ports = BTreeMap<String, String>;

/// Canvas coordinate of a node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Position { x, y }
    }
}

/// Per-node execution state as reported by the engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionStatus {
    #[default]
    None,
    Running,
    Success,
    Error,
}

impl ExecutionStatus {
    /// Success and error end a node's execution pass.
    pub fn is_terminal(self) -> bool {
        matches!(self, ExecutionStatus::Success | ExecutionStatus::Error)
    }
}

impl std::fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ExecutionStatus::None => "none",
            ExecutionStatus::Running => "running",
            ExecutionStatus::Success => "success",
            ExecutionStatus::Error => "error",
        };
        f.write_str(s)
    }
}

/// The `data` payload of a node on the canvas.
///
/// `inputs`/`outputs` start as a copy of the type descriptor's ports and may
/// diverge per instance. `node_data` is the typed configuration for the
/// node's type.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeData {
    pub label: String,
    pub inputs: Ports,
    pub outputs: Ports,
    pub node_data: NodeConfig,
    pub execution_status: ExecutionStatus,
}

/// A node instance in a workflow graph.
///
/// On the wire this is `{id, type, position, data: {label, inputs, outputs,
/// node_data, executionStatus}}` with `node_data` a flat JSON object. Parsing
/// checks `node_data` against the shape declared for `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "WireNode", into = "WireNode")]
pub struct WorkflowNode {
    pub id: NodeId,
    /// Node type key, resolved through the node type registry.
    pub node_type: String,
    pub position: Position,
    pub data: NodeData,
}

impl WorkflowNode {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn has_input(&self, handle: &str) -> bool {
        self.data.inputs.contains_key(handle)
    }

    pub fn has_output(&self, handle: &str) -> bool {
        self.data.outputs.contains_key(handle)
    }

    /// Short label for display (type + label).
    pub fn display_label(&self) -> String {
        if self.data.label.is_empty() || self.data.label == self.node_type {
            self.node_type.clone()
        } else {
            format!("{}({})", self.node_type, self.data.label)
        }
    }
}

// ── Wire format ─────────────────────────────────────────────────────

/// Serialized form of a workflow node.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct WireNode {
    /// Unique identifier for this node.
    pub id: NodeId,
    /// Node type key, e.g. "pyth-network", "swap", "riskManager".
    #[serde(rename = "type")]
    pub node_type: String,
    #[serde(default)]
    pub position: Position,
    pub data: WireNodeData,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct WireNodeData {
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub inputs: Ports,
    #[serde(default)]
    pub outputs: Ports,
    /// Type-specific configuration fields.
    #[serde(default)]
    pub node_data: serde_json::Map<String, serde_json::Value>,
    #[serde(default, rename = "executionStatus")]
    pub execution_status: ExecutionStatus,
}

impl TryFrom<WireNode> for WorkflowNode {
    type Error = ConfigError;

    fn try_from(wire: WireNode) -> Result<Self, Self::Error> {
        let node_data = NodeConfig::from_map(&wire.node_type, wire.data.node_data)?;
        Ok(WorkflowNode {
            id: wire.id,
            node_type: wire.node_type,
            position: wire.position,
            data: NodeData {
                label: wire.data.label,
                inputs: wire.data.inputs,
                outputs: wire.data.outputs,
                node_data,
                execution_status: wire.data.execution_status,
            },
        })
    }
}

impl From<WorkflowNode> for WireNode {
    fn from(node: WorkflowNode) -> Self {
        WireNode {
            id: node.id,
            node_type: node.node_type,
            position: node.position,
            data: WireNodeData {
                label: node.data.label,
                inputs: node.data.inputs,
                outputs: node.data.outputs,
                node_data: node.data.node_data.to_map(),
                execution_status: node.data.execution_status,
            },
        }
    }
}

impl JsonSchema for WorkflowNode {
    fn schema_name() -> Cow<'static, str> {
        "WorkflowNode".into()
    }

    fn json_schema(generator: &mut SchemaGenerator) -> Schema {
        WireNode::json_schema(generator)
    }
}
