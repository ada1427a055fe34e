//! Built-in workflow presets.

use std::sync::Arc;

use crate::model::config::{
    ComparisonOperator, ConditionConfig, LimitOrderConfig, NodeConfig, NotificationChannel,
    NotificationConfig, OrderSide, PythConfig, RiskManagerConfig, SwapConfig, TradingAgentConfig,
    TradingStrategy, YieldOptimizerConfig, kind,
};
use crate::model::node::{ExecutionStatus, NodeData, Position, WorkflowNode};
use crate::model::template::{Difficulty, WorkflowTemplate};
use crate::model::WorkflowEdge;
use crate::registry::NodeTypeRegistry;

/// Assembles a template with stable, readable ids.
struct Preset {
    registry: Arc<NodeTypeRegistry>,
    nodes: Vec<WorkflowNode>,
    edges: Vec<WorkflowEdge>,
}

impl Preset {
    fn new() -> Self {
        Preset {
            registry: NodeTypeRegistry::builtin(),
            nodes: Vec::new(),
            edges: Vec::new(),
        }
    }

    fn node(mut self, id: &str, node_type: &str, x: f64, y: f64, config: Option<NodeConfig>) -> Self {
        let descriptor = self.registry.resolve(node_type);
        self.nodes.push(WorkflowNode {
            id: id.to_string(),
            node_type: node_type.to_string(),
            position: Position::new(x, y),
            data: NodeData {
                label: descriptor.label.clone(),
                inputs: descriptor.inputs.clone(),
                outputs: descriptor.outputs.clone(),
                node_data: config.unwrap_or_else(|| descriptor.default_config.clone()),
                execution_status: ExecutionStatus::None,
            },
        });
        self
    }

    fn edge(mut self, source: &str, source_handle: &str, target: &str, target_handle: &str) -> Self {
        self.edges.push(WorkflowEdge {
            id: format!("e-{source}-{source_handle}-{target}"),
            source: source.to_string(),
            target: target.to_string(),
            source_handle: source_handle.to_string(),
            target_handle: target_handle.to_string(),
        });
        self
    }

    fn finish(self, name: &str, description: &str, category: &str, difficulty: Difficulty) -> WorkflowTemplate {
        WorkflowTemplate {
            name: name.to_string(),
            description: description.to_string(),
            category: category.to_string(),
            difficulty,
            nodes: self.nodes,
            edges: self.edges,
        }
    }
}

fn price_alert() -> WorkflowTemplate {
    Preset::new()
        .node("price", kind::PYTH_NETWORK, 0.0, 100.0, None)
        .node(
            "above",
            kind::CONDITION,
            250.0,
            100.0,
            Some(NodeConfig::Condition(ConditionConfig {
                operator: ComparisonOperator::Gt,
                threshold: 4_000.0,
                ..Default::default()
            })),
        )
        .node(
            "alert",
            kind::NOTIFICATION,
            500.0,
            100.0,
            Some(NodeConfig::Notification(NotificationConfig {
                channel: NotificationChannel::Telegram,
                target: String::new(),
                ..Default::default()
            })),
        )
        .edge("price", "price", "above", "value")
        .edge("above", "true", "alert", "message")
        .finish(
            "Price Alert",
            "Notify when ETH/USD crosses a threshold.",
            "monitoring",
            Difficulty::Beginner,
        )
}

fn ai_trading() -> WorkflowTemplate {
    Preset::new()
        .node("chart", kind::CHART_DATA, 0.0, 0.0, None)
        .node("price", kind::PYTH_NETWORK, 0.0, 200.0, None)
        .node("vision", kind::VISION_AGENT, 250.0, 0.0, None)
        .node(
            "trader",
            kind::TRADING_AGENT,
            500.0,
            100.0,
            Some(NodeConfig::TradingAgent(TradingAgentConfig {
                strategy: TradingStrategy::Momentum,
                max_position_usd: 2_500.0,
                ..Default::default()
            })),
        )
        .node(
            "risk",
            kind::RISK_MANAGER,
            750.0,
            100.0,
            Some(NodeConfig::RiskManager(RiskManagerConfig {
                max_drawdown_pct: 5.0,
                max_position_usd: 2_500.0,
                ..Default::default()
            })),
        )
        .node(
            "swap",
            kind::SWAP,
            1_000.0,
            100.0,
            Some(NodeConfig::Swap(SwapConfig {
                from_token: "USDC".into(),
                to_token: "ETH".into(),
                amount: 500.0,
                slippage_bps: 30.0,
                ..Default::default()
            })),
        )
        .node("notify", kind::NOTIFICATION, 1_250.0, 100.0, None)
        .edge("chart", "ohlc", "vision", "chart")
        .edge("vision", "sentiment", "trader", "sentiment")
        .edge("price", "price", "trader", "price")
        .edge("trader", "signal", "risk", "signal")
        .edge("risk", "approved", "swap", "activate")
        .edge("swap", "result", "notify", "message")
        .finish(
            "AI Trading Pipeline",
            "Chart vision and price feed drive a trading agent; approved signals execute a swap.",
            "trading",
            Difficulty::Advanced,
        )
}

fn yield_rebalancer() -> WorkflowTemplate {
    Preset::new()
        .node("price", kind::PYTH_NETWORK, 0.0, 100.0, None)
        .node(
            "calm",
            kind::CONDITION,
            250.0,
            100.0,
            Some(NodeConfig::Condition(ConditionConfig {
                operator: ComparisonOperator::Gte,
                threshold: 3_000.0,
                ..Default::default()
            })),
        )
        .node(
            "optimizer",
            kind::YIELD_OPTIMIZER,
            500.0,
            100.0,
            Some(NodeConfig::YieldOptimizer(YieldOptimizerConfig {
                min_apy: 4.0,
                protocols: vec!["aave".into(), "compound".into(), "morpho".into()],
                ..Default::default()
            })),
        )
        .node("notify", kind::NOTIFICATION, 750.0, 100.0, None)
        .edge("price", "price", "calm", "value")
        .edge("calm", "true", "optimizer", "activate")
        .edge("optimizer", "allocation", "notify", "message")
        .finish(
            "Yield Rebalancer",
            "Move idle stablecoins to the best lending APY while the market is calm.",
            "yield",
            Difficulty::Intermediate,
        )
}

fn buy_the_dip() -> WorkflowTemplate {
    Preset::new()
        .node(
            "price",
            kind::PYTH_NETWORK,
            0.0,
            100.0,
            Some(NodeConfig::PythNetwork(PythConfig {
                symbol: "BTC/USD".into(),
                price_feed_id: None,
                ..Default::default()
            })),
        )
        .node(
            "dip",
            kind::CONDITION,
            250.0,
            0.0,
            Some(NodeConfig::Condition(ConditionConfig {
                operator: ComparisonOperator::Lt,
                threshold: 60_000.0,
                ..Default::default()
            })),
        )
        .node(
            "order",
            kind::LIMIT_ORDER,
            500.0,
            100.0,
            Some(NodeConfig::LimitOrder(LimitOrderConfig {
                pair: "BTC/USDC".into(),
                side: OrderSide::Buy,
                limit_price: 58_000.0,
                amount: 0.01,
                ..Default::default()
            })),
        )
        .node("notify", kind::NOTIFICATION, 750.0, 100.0, None)
        .edge("price", "price", "dip", "value")
        .edge("price", "price", "order", "price")
        .edge("dip", "true", "order", "activate")
        .edge("order", "order", "notify", "message")
        .finish(
            "Buy the Dip",
            "Place a BTC limit order when the price drops below a threshold.",
            "trading",
            Difficulty::Beginner,
        )
}

/// Every built-in preset, simplest first.
pub fn presets() -> Vec<WorkflowTemplate> {
    vec![price_alert(), buy_the_dip(), yield_rebalancer(), ai_trading()]
}

/// Case-insensitive lookup by preset name.
pub fn find(name: &str) -> Option<WorkflowTemplate> {
    presets()
        .into_iter()
        .find(|t| t.name.eq_ignore_ascii_case(name))
}

/// Print the preset catalog.
pub fn run_list() -> anyhow::Result<()> {
    println!("Workflow Templates");
    println!("==================");
    for t in presets() {
        println!();
        println!("{} [{} / {}]", t.name, t.category, t.difficulty);
        println!("  {}", t.description);
        println!("  {} nodes, {} edges", t.nodes.len(), t.edges.len());
    }
    Ok(())
}

/// Print a preset as JSON, defaulting to the full trading pipeline.
pub fn run_example(name: Option<&str>) -> anyhow::Result<()> {
    let template = match name {
        Some(name) => find(name).ok_or_else(|| {
            let known: Vec<String> = presets().into_iter().map(|t| t.name).collect();
            anyhow::anyhow!("no template named `{name}` (available: {})", known.join(", "))
        })?,
        None => ai_trading(),
    };
    println!("{}", serde_json::to_string_pretty(&template)?);
    Ok(())
}
