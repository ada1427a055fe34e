use std::fmt::Write as _;

use crate::model::node::Ports;
use crate::registry::NodeTypeRegistry;

fn format_ports(ports: &Ports) -> String {
    if ports.is_empty() {
        return "-".to_string();
    }
    ports
        .iter()
        .map(|(name, tag)| format!("{name}: {tag}"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Human-readable listing of every node type in `registry`, in palette order.
pub fn listing(registry: &NodeTypeRegistry) -> String {
    let mut out = String::from("Available Node Types\n====================\n");
    for (i, d) in registry.descriptors().enumerate() {
        let _ = writeln!(out, "\n{}. {} ({})", i + 1, d.node_type, d.label);
        let _ = writeln!(out, "   Category: {}", d.category);
        let _ = writeln!(out, "   Inputs:   {}", format_ports(&d.inputs));
        let _ = writeln!(out, "   Outputs:  {}", format_ports(&d.outputs));
        let config = d.default_config.to_map();
        if !config.is_empty() {
            out.push_str("   Defaults:\n");
            for (key, value) in &config {
                let _ = writeln!(out, "     - {key}: {value}");
            }
        }
    }
    out.push_str(
        "\nUnknown types render with the generic `default` descriptor (no ports)\n\
         and keep their node_data as an open key/value map.\n",
    );
    out
}

/// Print a human-readable listing of all available node types.
pub fn run() -> anyhow::Result<()> {
    print!("{}", listing(&NodeTypeRegistry::builtin()));
    Ok(())
}
