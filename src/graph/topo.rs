use std::collections::HashMap;

use petgraph::algo::{is_cyclic_directed, toposort};
use petgraph::graph::{DiGraph, NodeIndex};

use crate::model::edge::WorkflowEdge;
use crate::model::node::{NodeId, WorkflowNode};

/// Build a petgraph DiGraph over node ids. Parallel edges collapse into
/// repeated petgraph edges; edges with unknown endpoints are skipped.
fn build<'a>(
    nodes: &'a [WorkflowNode],
    edges: &'a [WorkflowEdge],
) -> (DiGraph<&'a str, ()>, HashMap<&'a str, NodeIndex>) {
    let mut graph = DiGraph::<&str, ()>::new();
    let mut index_map: HashMap<&str, NodeIndex> = HashMap::new();

    for node in nodes {
        let idx = graph.add_node(node.id());
        index_map.insert(node.id(), idx);
    }

    for edge in edges {
        if let (Some(&from_idx), Some(&to_idx)) = (
            index_map.get(edge.source.as_str()),
            index_map.get(edge.target.as_str()),
        ) {
            graph.add_edge(from_idx, to_idx, ());
        }
    }

    (graph, index_map)
}

/// Dependency order of the nodes. Cyclic graphs are not rejected here;
/// they fall back to insertion order.
pub fn dependency_order(nodes: &[WorkflowNode], edges: &[WorkflowEdge]) -> Vec<NodeId> {
    let (graph, _) = build(nodes, edges);
    match toposort(&graph, None) {
        Ok(order) => order.into_iter().map(|idx| graph[idx].to_string()).collect(),
        Err(cycle) => {
            tracing::debug!(
                node = graph[cycle.node_id()],
                "graph is cyclic, using insertion order"
            );
            nodes.iter().map(|n| n.id.clone()).collect()
        }
    }
}

/// Whether the edges form a directed cycle (self-loops included).
pub fn has_cycle(nodes: &[WorkflowNode], edges: &[WorkflowEdge]) -> bool {
    let (graph, _) = build(nodes, edges);
    is_cyclic_directed(&graph)
}
