//! The editable workflow graph: typed nodes connected port-to-port.
//!
//! The graph owns referential integrity (removing a node removes its edges)
//! and port validation on connect. It does not enforce acyclicity; the
//! external engine validates execution order.

mod ids;
pub mod topo;

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::{Map, Value};
use thiserror::Error;

use crate::model::config::ConfigError;
use crate::model::edge::WorkflowEdge;
use crate::model::node::{ExecutionStatus, NodeData, NodeId, Ports, Position, WorkflowNode};
use crate::model::template::{TemplateMeta, WorkflowTemplate};
use crate::registry::NodeTypeRegistry;
use crate::validate::{self, ValidationError};

pub use ids::IdGenerator;

/// Which end of an edge a handle belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleSide {
    Source,
    Target,
}

impl std::fmt::Display for HandleSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HandleSide::Source => f.write_str("output"),
            HandleSide::Target => f.write_str("input"),
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum GraphError {
    #[error("Node `{node_id}` has no {side} port `{handle}`")]
    InvalidHandle {
        node_id: String,
        handle: String,
        side: HandleSide,
    },

    #[error("Unknown node `{node_id}`")]
    UnknownNode { node_id: String },

    #[error(transparent)]
    InvalidConfig(#[from] ConfigError),
}

/// Partial update of a node's `data`. `node_data` keys are merged over the
/// current configuration; the other fields replace when present.
#[derive(Debug, Clone, Default)]
pub struct NodeDataPatch {
    pub label: Option<String>,
    pub inputs: Option<Ports>,
    pub outputs: Option<Ports>,
    pub node_data: Map<String, Value>,
}

impl NodeDataPatch {
    pub fn config(entries: impl IntoIterator<Item = (String, Value)>) -> Self {
        NodeDataPatch {
            node_data: entries.into_iter().collect(),
            ..Default::default()
        }
    }

    pub fn label(label: impl Into<String>) -> Self {
        NodeDataPatch {
            label: Some(label.into()),
            ..Default::default()
        }
    }
}

/// A live workflow graph.
#[derive(Debug, Clone)]
pub struct WorkflowGraph {
    registry: Arc<NodeTypeRegistry>,
    nodes: Vec<WorkflowNode>,
    edges: Vec<WorkflowEdge>,
    ids: IdGenerator,
}

impl Default for WorkflowGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkflowGraph {
    /// Empty graph over the built-in node catalog.
    pub fn new() -> Self {
        Self::with_registry(NodeTypeRegistry::builtin())
    }

    pub fn with_registry(registry: Arc<NodeTypeRegistry>) -> Self {
        WorkflowGraph {
            registry,
            nodes: Vec::new(),
            edges: Vec::new(),
            ids: IdGenerator::new(),
        }
    }

    pub fn registry(&self) -> &NodeTypeRegistry {
        &self.registry
    }

    pub fn shared_registry(&self) -> Arc<NodeTypeRegistry> {
        Arc::clone(&self.registry)
    }

    pub fn nodes(&self) -> &[WorkflowNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[WorkflowEdge] {
        &self.edges
    }

    pub fn node(&self, id: &str) -> Option<&WorkflowNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    fn node_mut(&mut self, id: &str) -> Option<&mut WorkflowNode> {
        self.nodes.iter_mut().find(|n| n.id == id)
    }

    fn fresh_id(&mut self, prefix: &str) -> String {
        let nodes = &self.nodes;
        let edges = &self.edges;
        self.ids.next(prefix, |id| {
            nodes.iter().any(|n| n.id == id) || edges.iter().any(|e| e.id == id)
        })
    }

    /// Edges leaving `id`.
    pub fn outgoing<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a WorkflowEdge> + 'a {
        self.edges.iter().filter(move |e| e.source == id)
    }

    /// Edges entering `id`.
    pub fn incoming<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a WorkflowEdge> + 'a {
        self.edges.iter().filter(move |e| e.target == id)
    }

    /// Create a node of `node_type` at `position`. Ports and default
    /// configuration are copied from the resolved descriptor.
    pub fn add_node(&mut self, node_type: &str, position: Position) -> &WorkflowNode {
        let descriptor = self.registry.resolve(node_type);
        let data = NodeData {
            label: descriptor.label.clone(),
            inputs: descriptor.inputs.clone(),
            outputs: descriptor.outputs.clone(),
            node_data: descriptor.default_config.clone(),
            execution_status: ExecutionStatus::None,
        };
        let id = self.fresh_id(node_type);
        tracing::debug!(%id, node_type, "add node");

        self.nodes.push(WorkflowNode {
            id,
            node_type: node_type.to_string(),
            position,
            data,
        });
        let last = self.nodes.len() - 1;
        &self.nodes[last]
    }

    /// Remove a node together with every edge touching it. No-op when absent.
    pub fn remove_node(&mut self, id: &str) -> Option<WorkflowNode> {
        let pos = self.nodes.iter().position(|n| n.id == id)?;
        let node = self.nodes.remove(pos);
        let before = self.edges.len();
        self.edges.retain(|e| !e.touches(id));
        tracing::debug!(
            id,
            edges_removed = before - self.edges.len(),
            "remove node"
        );
        Some(node)
    }

    /// Connect an output port of `source` to an input port of `target`.
    ///
    /// Handles are checked against the nodes' current port copies, not the
    /// registry. Parallel edges and cycles are allowed.
    pub fn connect(
        &mut self,
        source: &str,
        source_handle: &str,
        target: &str,
        target_handle: &str,
    ) -> Result<&WorkflowEdge, GraphError> {
        check_handles(&self.nodes, source, source_handle, target, target_handle)?;

        let id = self.fresh_id(&format!("e-{source}-{target}"));
        tracing::debug!(%id, source, source_handle, target, target_handle, "connect");
        self.edges.push(WorkflowEdge {
            id,
            source: source.to_string(),
            target: target.to_string(),
            source_handle: source_handle.to_string(),
            target_handle: target_handle.to_string(),
        });
        let last = self.edges.len() - 1;
        Ok(&self.edges[last])
    }

    /// Remove a single edge by id.
    pub fn disconnect(&mut self, edge_id: &str) -> Option<WorkflowEdge> {
        let pos = self.edges.iter().position(|e| e.id == edge_id)?;
        Some(self.edges.remove(pos))
    }

    /// Drag a node. Returns false when the node does not exist.
    pub fn move_node(&mut self, id: &str, position: Position) -> bool {
        match self.node_mut(id) {
            Some(node) => {
                node.position = position;
                true
            }
            None => false,
        }
    }

    /// Apply `patch` to a node's data.
    ///
    /// Returns `Ok(false)` when no node has `id`. A patch producing an invalid
    /// configuration is rejected and leaves the node untouched. Replacing a
    /// port set drops edges that used a port no longer present.
    pub fn update_node_data(&mut self, id: &str, patch: &NodeDataPatch) -> Result<bool, GraphError> {
        let Some(node) = self.nodes.iter_mut().find(|n| n.id == id) else {
            return Ok(false);
        };

        let config = if patch.node_data.is_empty() {
            None
        } else {
            Some(node.data.node_data.merged(&node.node_type, &patch.node_data)?)
        };

        if let Some(config) = config {
            node.data.node_data = config;
        }
        if let Some(label) = &patch.label {
            node.data.label = label.clone();
        }
        if let Some(inputs) = &patch.inputs {
            node.data.inputs = inputs.clone();
        }
        if let Some(outputs) = &patch.outputs {
            node.data.outputs = outputs.clone();
        }

        if patch.inputs.is_some() || patch.outputs.is_some() {
            let nodes = &self.nodes;
            let before = self.edges.len();
            self.edges.retain(|e| {
                check_handles(nodes, &e.source, &e.source_handle, &e.target, &e.target_handle)
                    .is_ok()
            });
            let dropped = before - self.edges.len();
            if dropped > 0 {
                tracing::warn!(id, dropped, "ports changed, dropped dangling edges");
            }
        }
        Ok(true)
    }

    /// Record an engine-reported status on the node's data.
    pub(crate) fn set_status(&mut self, id: &str, status: ExecutionStatus) -> bool {
        match self.node_mut(id) {
            Some(node) => {
                node.data.execution_status = status;
                true
            }
            None => false,
        }
    }

    /// Dependency order of the nodes (insertion order when cyclic).
    pub fn topological_order(&self) -> Vec<NodeId> {
        topo::dependency_order(&self.nodes, &self.edges)
    }

    pub fn has_cycle(&self) -> bool {
        topo::has_cycle(&self.nodes, &self.edges)
    }

    /// Snapshot the graph as a template.
    pub fn to_template(&self, meta: TemplateMeta) -> WorkflowTemplate {
        WorkflowTemplate {
            name: meta.name,
            description: meta.description,
            category: meta.category,
            difficulty: meta.difficulty,
            nodes: self.nodes.clone(),
            edges: self.edges.clone(),
        }
    }

    /// Instantiate a template over the built-in catalog.
    pub fn from_template(template: &WorkflowTemplate) -> Result<Self, Vec<ValidationError>> {
        Self::from_template_with(NodeTypeRegistry::builtin(), template)
    }

    /// Instantiate a template with fresh node and edge ids. The template is
    /// validated first; all problems are reported together.
    pub fn from_template_with(
        registry: Arc<NodeTypeRegistry>,
        template: &WorkflowTemplate,
    ) -> Result<Self, Vec<ValidationError>> {
        validate::validate(template)?;

        let mut graph = Self::with_registry(registry);
        let mut id_map: HashMap<&str, String> = HashMap::with_capacity(template.nodes.len());

        for node in &template.nodes {
            let id = graph.fresh_id(&node.node_type);
            id_map.insert(node.id.as_str(), id.clone());
            graph.nodes.push(WorkflowNode {
                id,
                node_type: node.node_type.clone(),
                position: node.position,
                data: NodeData {
                    execution_status: ExecutionStatus::None,
                    ..node.data.clone()
                },
            });
        }

        for edge in &template.edges {
            let (Some(source), Some(target)) = (
                id_map.get(edge.source.as_str()),
                id_map.get(edge.target.as_str()),
            ) else {
                continue;
            };
            let (source, target) = (source.clone(), target.clone());
            let id = graph.fresh_id(&format!("e-{source}-{target}"));
            graph.edges.push(WorkflowEdge {
                id,
                source,
                target,
                source_handle: edge.source_handle.clone(),
                target_handle: edge.target_handle.clone(),
            });
        }

        tracing::debug!(
            name = %template.name,
            nodes = graph.nodes.len(),
            edges = graph.edges.len(),
            "loaded template"
        );
        Ok(graph)
    }
}

/// Check that both endpoints exist and expose the named ports.
pub(crate) fn check_handles(
    nodes: &[WorkflowNode],
    source: &str,
    source_handle: &str,
    target: &str,
    target_handle: &str,
) -> Result<(), GraphError> {
    let find = |id: &str| {
        nodes
            .iter()
            .find(|n| n.id == id)
            .ok_or_else(|| GraphError::UnknownNode {
                node_id: id.to_string(),
            })
    };
    let src = find(source)?;
    let dst = find(target)?;

    if !src.has_output(source_handle) {
        return Err(GraphError::InvalidHandle {
            node_id: source.to_string(),
            handle: source_handle.to_string(),
            side: HandleSide::Source,
        });
    }
    if !dst.has_input(target_handle) {
        return Err(GraphError::InvalidHandle {
            node_id: target.to_string(),
            handle: target_handle.to_string(),
            side: HandleSide::Target,
        });
    }
    Ok(())
}
