use crate::model::config::{NodeConfig, kind};
use crate::model::node::Ports;

use super::NodeTypeDescriptor;

fn ports(entries: &[(&str, &str)]) -> Ports {
    entries
        .iter()
        .map(|(name, tag)| (name.to_string(), tag.to_string()))
        .collect()
}

fn descriptor(
    node_type: &str,
    label: &str,
    icon: &str,
    category: &str,
    inputs: &[(&str, &str)],
    outputs: &[(&str, &str)],
) -> NodeTypeDescriptor {
    NodeTypeDescriptor {
        node_type: node_type.to_string(),
        label: label.to_string(),
        icon: icon.to_string(),
        category: category.to_string(),
        inputs: ports(inputs),
        outputs: ports(outputs),
        default_config: NodeConfig::default_for(node_type),
    }
}

/// Descriptor every unknown type resolves to: no ports, generic label.
pub fn fallback() -> NodeTypeDescriptor {
    descriptor(kind::DEFAULT, "Node", "box", "other", &[], &[])
}

/// The built-in node catalog, in palette order.
pub fn builtin() -> Vec<NodeTypeDescriptor> {
    vec![
        // ── Data sources ────────────────────────────────────
        descriptor(
            kind::PYTH_NETWORK,
            "Pyth Price Feed",
            "chart-line",
            "data",
            &[],
            &[("price", "number")],
        ),
        descriptor(
            kind::CHART_DATA,
            "Chart Data",
            "candlestick",
            "data",
            &[],
            &[("ohlc", "candles")],
        ),
        // ── Agents ──────────────────────────────────────────
        descriptor(
            kind::VISION_AGENT,
            "Vision Agent",
            "eye",
            "agent",
            &[("chart", "candles")],
            &[("sentiment", "signal")],
        ),
        descriptor(
            kind::TRADING_AGENT,
            "Trading Agent",
            "bot",
            "agent",
            &[("price", "number"), ("sentiment", "signal")],
            &[("signal", "signal")],
        ),
        descriptor(
            kind::RISK_MANAGER,
            "Risk Manager",
            "shield",
            "agent",
            &[("signal", "signal")],
            &[("approved", "trigger")],
        ),
        descriptor(
            kind::YIELD_OPTIMIZER,
            "Yield Optimizer",
            "percent",
            "agent",
            &[("activate", "trigger")],
            &[("allocation", "allocation")],
        ),
        // ── Logic ───────────────────────────────────────────
        descriptor(
            kind::CONDITION,
            "Condition",
            "git-branch",
            "logic",
            &[("value", "number")],
            &[("true", "trigger"), ("false", "trigger")],
        ),
        // ── Actions ─────────────────────────────────────────
        descriptor(
            kind::SWAP,
            "Swap",
            "repeat",
            "action",
            &[("activate", "trigger"), ("amount", "number")],
            &[("result", "transaction")],
        ),
        descriptor(
            kind::LIMIT_ORDER,
            "Limit Order",
            "target",
            "action",
            &[("price", "number"), ("activate", "trigger")],
            &[("order", "transaction")],
        ),
        descriptor(
            kind::SEND_TOKEN,
            "Send Token",
            "send",
            "action",
            &[("activate", "trigger")],
            &[("result", "transaction")],
        ),
        descriptor(
            kind::NOTIFICATION,
            "Notification",
            "bell",
            "output",
            &[("message", "any")],
            &[],
        ),
    ]
}
