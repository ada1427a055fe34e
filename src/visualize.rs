use std::collections::{HashMap, HashSet};
use std::fmt::Write as _;
use std::path::Path;

use crate::model::config::NodeConfig;
use crate::model::node::WorkflowNode;
use crate::model::template::WorkflowTemplate;
use crate::registry::NodeTypeRegistry;
use crate::validate;

/// Entry point for the `visualize` command.
pub fn run(path: &Path, format: &str, output: Option<&Path>) -> anyhow::Result<()> {
    let template = validate::load_and_validate(path).map_err(|errs| {
        anyhow::anyhow!(
            "Cannot visualize invalid workflow:\n{}",
            errs.iter()
                .map(|e| format!("  - {e}"))
                .collect::<Vec<_>>()
                .join("\n")
        )
    })?;

    let rendered = match format {
        "ascii" => render_ascii(&template),
        "dot" => render_dot(&template),
        other => anyhow::bail!("Unknown format '{other}'. Use: ascii, dot"),
    };
    write_output(&rendered, output)
}

// ── DOT Rendering ────────────────────────────────────────────────────

/// Render the template as a DOT language string.
pub fn render_dot(template: &WorkflowTemplate) -> String {
    let registry = NodeTypeRegistry::builtin();
    let mut dot = String::new();
    dot.push_str("digraph workflow {\n");
    dot.push_str("    rankdir=LR;\n");
    dot.push_str("    bgcolor=\"#1a1a2e\";\n");
    dot.push_str("    node [fontname=\"Helvetica\", fontsize=10, style=filled, fontcolor=\"#ffffff\"];\n");
    dot.push_str("    edge [fontname=\"Helvetica\", fontsize=9, color=\"#888888\", fontcolor=\"#cccccc\"];\n");
    let _ = writeln!(
        dot,
        "    labelloc=t;\n    label=\"{}\";\n    fontcolor=\"#ffffff\";\n",
        escape_dot(&template.name)
    );

    for node in &template.nodes {
        let category = registry.resolve(&node.node_type).category.as_str();
        let (shape, color) = category_style(category);
        let _ = writeln!(
            dot,
            "    \"{}\" [label=\"{}\\n{}\", shape={shape}, fillcolor=\"{color}\"];",
            escape_dot(&node.id),
            escape_dot(&node.data.label),
            escape_dot(&node_detail(node)),
        );
    }

    dot.push('\n');

    for edge in &template.edges {
        let _ = writeln!(
            dot,
            "    \"{}\" -> \"{}\" [label=\"{} \u{2192} {}\"];",
            escape_dot(&edge.source),
            escape_dot(&edge.target),
            escape_dot(&edge.source_handle),
            escape_dot(&edge.target_handle),
        );
    }

    dot.push_str("}\n");
    dot
}

fn category_style(category: &str) -> (&'static str, &'static str) {
    match category {
        "data" => ("cylinder", "#1565c0"),
        "agent" => ("box", "#6a1b9a"),
        "logic" => ("diamond", "#f9a825"),
        "action" => ("parallelogram", "#e65100"),
        "output" => ("note", "#2e7d32"),
        _ => ("box", "#37474f"),
    }
}

/// Short human-readable summary of a node's configuration.
pub fn node_detail(node: &WorkflowNode) -> String {
    match &node.data.node_data {
        NodeConfig::PythNetwork(c) => c.symbol.clone(),
        NodeConfig::ChartData(c) => format!("{} {}", c.symbol, c.interval),
        NodeConfig::VisionAgent(c) => format!("{} {}", c.symbol, c.timeframe),
        NodeConfig::TradingAgent(c) => format!("{:?} max ${}", c.strategy, c.max_position_usd),
        NodeConfig::RiskManager(c) => format!("dd {}%, max ${}", c.max_drawdown_pct, c.max_position_usd),
        NodeConfig::YieldOptimizer(c) => format!("min {}% APY, {}", c.min_apy, c.protocols.join("/")),
        NodeConfig::Condition(c) => format!("{} {}", c.operator.symbol(), c.threshold),
        NodeConfig::Swap(c) => format!("{} {} -> {}", c.amount, c.from_token, c.to_token),
        NodeConfig::LimitOrder(c) => format!("{:?} {} {} @ {}", c.side, c.amount, c.pair, c.limit_price),
        NodeConfig::SendToken(c) => {
            let r = &c.recipient;
            let to = match (r.get(..6), r.get(r.len().saturating_sub(4)..)) {
                (Some(head), Some(tail)) if r.len() > 10 => format!("{head}...{tail}"),
                _ => r.clone(),
            };
            format!("{} {} to {to}", c.amount, c.token)
        }
        NodeConfig::Notification(c) => format!("{:?}", c.channel),
        NodeConfig::Custom(map) => format!("{} fields", map.len()),
    }
}

/// Escape special characters for DOT format.
fn escape_dot(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}

// ── Output ───────────────────────────────────────────────────────────

/// Write text output to file or stdout.
fn write_output(content: &str, output: Option<&Path>) -> anyhow::Result<()> {
    if let Some(path) = output {
        std::fs::write(path, content)?;
        eprintln!("Written to {}", path.display());
    } else {
        print!("{content}");
    }
    Ok(())
}

// ── ASCII Rendering ──────────────────────────────────────────────────

/// Group node ids into dependency layers (Kahn). Nodes caught in a cycle
/// never reach in-degree zero and are returned separately.
fn layers(template: &WorkflowTemplate) -> (Vec<Vec<&str>>, Vec<&str>) {
    let node_ids: Vec<&str> = template.nodes.iter().map(|n| n.id.as_str()).collect();
    let node_set: HashSet<&str> = node_ids.iter().copied().collect();

    let mut in_degree: HashMap<&str, usize> = node_ids.iter().map(|&id| (id, 0)).collect();
    let mut successors: HashMap<&str, Vec<&str>> = HashMap::new();

    for edge in &template.edges {
        let (from, to) = (edge.source.as_str(), edge.target.as_str());
        if node_set.contains(from) && node_set.contains(to) {
            *in_degree.entry(to).or_default() += 1;
            successors.entry(from).or_default().push(to);
        }
    }

    let mut queue: Vec<&str> = node_ids
        .iter()
        .copied()
        .filter(|id| in_degree.get(id) == Some(&0))
        .collect();
    let mut placed: HashSet<&str> = HashSet::new();
    let mut layers = Vec::new();

    while !queue.is_empty() {
        placed.extend(queue.iter().copied());
        let mut next = Vec::new();
        for &id in &queue {
            for &succ in successors.get(id).map(Vec::as_slice).unwrap_or_default() {
                if let Some(deg) = in_degree.get_mut(succ) {
                    *deg -= 1;
                    if *deg == 0 {
                        next.push(succ);
                    }
                }
            }
        }
        next.dedup();
        layers.push(std::mem::replace(&mut queue, next));
    }

    let cyclic = node_ids.into_iter().filter(|id| !placed.contains(id)).collect();
    (layers, cyclic)
}

pub fn render_ascii(template: &WorkflowTemplate) -> String {
    let (layers, cyclic) = layers(template);
    let label: HashMap<&str, String> = template
        .nodes
        .iter()
        .map(|n| (n.id.as_str(), format!("[{}: {}]", n.id, n.data.label)))
        .collect();

    let mut predecessors: HashMap<&str, Vec<(&str, &str, &str)>> = HashMap::new();
    for edge in &template.edges {
        predecessors.entry(edge.target.as_str()).or_default().push((
            edge.source.as_str(),
            edge.source_handle.as_str(),
            edge.target_handle.as_str(),
        ));
    }

    let rule = "\u{2500}".repeat(60);
    let mut out = String::new();
    let _ = writeln!(out, "\n  Workflow: {}", template.name);
    if !template.description.is_empty() {
        let _ = writeln!(out, "  {}", template.description);
    }
    let _ = writeln!(out, "  {rule}\n");

    for (i, layer) in layers.iter().enumerate() {
        if i > 0 {
            for &id in layer {
                for &(from, out_port, in_port) in predecessors.get(id).map(Vec::as_slice).unwrap_or_default() {
                    let _ = writeln!(
                        out,
                        "      {from}.{out_port} \u{2500}\u{2500}\u{25b6} {id}.{in_port}"
                    );
                }
            }
            out.push('\n');
        }
        let labels: Vec<&str> = layer
            .iter()
            .filter_map(|id| label.get(id).map(String::as_str))
            .collect();
        let _ = writeln!(out, "  Layer {i}: {}\n", labels.join("  "));
    }

    if !cyclic.is_empty() {
        let labels: Vec<&str> = cyclic
            .iter()
            .filter_map(|id| label.get(id).map(String::as_str))
            .collect();
        let _ = writeln!(out, "  Cycle: {}\n", labels.join("  "));
    }

    let _ = writeln!(out, "  {rule}");
    let _ = writeln!(
        out,
        "  {} nodes, {} edges\n",
        template.nodes.len(),
        template.edges.len()
    );
    out
}
