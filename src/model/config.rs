use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Node type keys for the built-in catalog.
pub mod kind {
    pub const PYTH_NETWORK: &str = "pyth-network";
    pub const CHART_DATA: &str = "chart-data";
    pub const VISION_AGENT: &str = "visionAgent";
    pub const TRADING_AGENT: &str = "tradingAgent";
    pub const RISK_MANAGER: &str = "riskManager";
    pub const YIELD_OPTIMIZER: &str = "yieldOptimizer";
    pub const CONDITION: &str = "condition";
    pub const SWAP: &str = "swap";
    pub const LIMIT_ORDER: &str = "limitOrder";
    pub const SEND_TOKEN: &str = "sendToken";
    pub const NOTIFICATION: &str = "notification";
    pub const DEFAULT: &str = "default";
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("node_data for `{node_type}` does not match its shape: {reason}")]
    Shape { node_type: String, reason: String },

    #[error("node_data for `{node_type}` is invalid: {reason}")]
    Invalid { node_type: String, reason: String },
}

// ── Per-type configuration ──────────────────────────────────────────

/// Pyth price feed source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct PythConfig {
    /// Feed symbol, e.g. "ETH/USD".
    pub symbol: String,
    /// Hex feed id; resolved from `symbol` by the engine when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_feed_id: Option<String>,
    /// Keys this node type does not define, kept as given.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for PythConfig {
    fn default() -> Self {
        PythConfig {
            symbol: "ETH/USD".into(),
            price_feed_id: None,
            extra: Map::new(),
        }
    }
}

/// OHLC candle source feeding chart consumers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ChartDataConfig {
    pub symbol: String,
    /// Candle width, e.g. "1m", "1h", "1d".
    pub interval: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for ChartDataConfig {
    fn default() -> Self {
        ChartDataConfig {
            symbol: "ETH/USD".into(),
            interval: "1h".into(),
            extra: Map::new(),
        }
    }
}

/// Chart-reading agent emitting a market sentiment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct VisionAgentConfig {
    pub symbol: String,
    pub timeframe: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for VisionAgentConfig {
    fn default() -> Self {
        VisionAgentConfig {
            symbol: "ETH/USD".into(),
            timeframe: "4h".into(),
            extra: Map::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum TradingStrategy {
    #[default]
    Momentum,
    MeanReversion,
    Breakout,
}

/// Agent turning price + sentiment into a BUY/SELL/HOLD signal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct TradingAgentConfig {
    pub strategy: TradingStrategy,
    pub max_position_usd: f64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for TradingAgentConfig {
    fn default() -> Self {
        TradingAgentConfig {
            strategy: TradingStrategy::Momentum,
            max_position_usd: 1_000.0,
            extra: Map::new(),
        }
    }
}

/// Gate approving or rejecting trading signals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct RiskManagerConfig {
    /// Maximum tolerated drawdown in percent (0-100).
    pub max_drawdown_pct: f64,
    pub max_position_usd: f64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for RiskManagerConfig {
    fn default() -> Self {
        RiskManagerConfig {
            max_drawdown_pct: 10.0,
            max_position_usd: 5_000.0,
            extra: Map::new(),
        }
    }
}

/// Rebalances idle funds into the best-yielding protocol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct YieldOptimizerConfig {
    /// Minimum APY in percent for a protocol to be considered.
    pub min_apy: f64,
    pub protocols: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for YieldOptimizerConfig {
    fn default() -> Self {
        YieldOptimizerConfig {
            min_apy: 5.0,
            protocols: vec!["aave".into(), "compound".into()],
            extra: Map::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonOperator {
    #[default]
    Gt,
    Gte,
    Lt,
    Lte,
    Eq,
}

impl ComparisonOperator {
    pub fn symbol(self) -> &'static str {
        match self {
            ComparisonOperator::Gt => ">",
            ComparisonOperator::Gte => ">=",
            ComparisonOperator::Lt => "<",
            ComparisonOperator::Lte => "<=",
            ComparisonOperator::Eq => "==",
        }
    }
}

/// Routes a trigger to its `true` or `false` output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ConditionConfig {
    pub operator: ComparisonOperator,
    pub threshold: f64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Same-chain token swap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct SwapConfig {
    pub from_token: String,
    pub to_token: String,
    pub amount: f64,
    /// Slippage tolerance in basis points.
    pub slippage_bps: f64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for SwapConfig {
    fn default() -> Self {
        SwapConfig {
            from_token: "USDC".into(),
            to_token: "ETH".into(),
            amount: 0.0,
            slippage_bps: 50.0,
            extra: Map::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum OrderSide {
    #[default]
    Buy,
    Sell,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct LimitOrderConfig {
    pub pair: String,
    pub side: OrderSide,
    pub limit_price: f64,
    pub amount: f64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for LimitOrderConfig {
    fn default() -> Self {
        LimitOrderConfig {
            pair: "ETH/USDC".into(),
            side: OrderSide::Buy,
            limit_price: 0.0,
            amount: 0.0,
            extra: Map::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct SendTokenConfig {
    pub token: String,
    /// Recipient address (0x-prefixed hex); may be left empty while editing.
    pub recipient: String,
    pub amount: f64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for SendTokenConfig {
    fn default() -> Self {
        SendTokenConfig {
            token: "USDC".into(),
            recipient: String::new(),
            amount: 0.0,
            extra: Map::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum NotificationChannel {
    #[default]
    Telegram,
    Discord,
    Webhook,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct NotificationConfig {
    pub channel: NotificationChannel,
    /// Chat id, channel id or URL depending on `channel`.
    pub target: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ── NodeConfig ──────────────────────────────────────────────────────

/// Typed `node_data` of a workflow node, one shape per node type.
///
/// Types outside the built-in catalog keep an open key/value map.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeConfig {
    PythNetwork(PythConfig),
    ChartData(ChartDataConfig),
    VisionAgent(VisionAgentConfig),
    TradingAgent(TradingAgentConfig),
    RiskManager(RiskManagerConfig),
    YieldOptimizer(YieldOptimizerConfig),
    Condition(ConditionConfig),
    Swap(SwapConfig),
    LimitOrder(LimitOrderConfig),
    SendToken(SendTokenConfig),
    Notification(NotificationConfig),
    Custom(Map<String, Value>),
}

impl Serialize for NodeConfig {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_map().serialize(serializer)
    }
}

impl Default for NodeConfig {
    fn default() -> Self {
        NodeConfig::Custom(Map::new())
    }
}

fn parse<T: DeserializeOwned>(node_type: &str, map: Map<String, Value>) -> Result<T, ConfigError> {
    serde_json::from_value(Value::Object(map)).map_err(|e| ConfigError::Shape {
        node_type: node_type.to_string(),
        reason: e.to_string(),
    })
}

fn to_object<T: Serialize>(config: &T) -> Map<String, Value> {
    match serde_json::to_value(config) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    }
}

impl NodeConfig {
    /// Default configuration for a node type.
    pub fn default_for(node_type: &str) -> NodeConfig {
        match node_type {
            kind::PYTH_NETWORK => NodeConfig::PythNetwork(PythConfig::default()),
            kind::CHART_DATA => NodeConfig::ChartData(ChartDataConfig::default()),
            kind::VISION_AGENT => NodeConfig::VisionAgent(VisionAgentConfig::default()),
            kind::TRADING_AGENT => NodeConfig::TradingAgent(TradingAgentConfig::default()),
            kind::RISK_MANAGER => NodeConfig::RiskManager(RiskManagerConfig::default()),
            kind::YIELD_OPTIMIZER => NodeConfig::YieldOptimizer(YieldOptimizerConfig::default()),
            kind::CONDITION => NodeConfig::Condition(ConditionConfig::default()),
            kind::SWAP => NodeConfig::Swap(SwapConfig::default()),
            kind::LIMIT_ORDER => NodeConfig::LimitOrder(LimitOrderConfig::default()),
            kind::SEND_TOKEN => NodeConfig::SendToken(SendTokenConfig::default()),
            kind::NOTIFICATION => NodeConfig::Notification(NotificationConfig::default()),
            _ => NodeConfig::Custom(Map::new()),
        }
    }

    /// Parse a flat `node_data` object into the shape declared for `node_type`.
    /// Missing fields take their defaults; wrongly typed or out-of-range
    /// fields are rejected. Keys the shape does not define are carried
    /// through untouched.
    pub fn from_map(node_type: &str, map: Map<String, Value>) -> Result<NodeConfig, ConfigError> {
        let config = match node_type {
            kind::PYTH_NETWORK => NodeConfig::PythNetwork(parse(node_type, map)?),
            kind::CHART_DATA => NodeConfig::ChartData(parse(node_type, map)?),
            kind::VISION_AGENT => NodeConfig::VisionAgent(parse(node_type, map)?),
            kind::TRADING_AGENT => NodeConfig::TradingAgent(parse(node_type, map)?),
            kind::RISK_MANAGER => NodeConfig::RiskManager(parse(node_type, map)?),
            kind::YIELD_OPTIMIZER => NodeConfig::YieldOptimizer(parse(node_type, map)?),
            kind::CONDITION => NodeConfig::Condition(parse(node_type, map)?),
            kind::SWAP => NodeConfig::Swap(parse(node_type, map)?),
            kind::LIMIT_ORDER => NodeConfig::LimitOrder(parse(node_type, map)?),
            kind::SEND_TOKEN => NodeConfig::SendToken(parse(node_type, map)?),
            kind::NOTIFICATION => NodeConfig::Notification(parse(node_type, map)?),
            _ => NodeConfig::Custom(map),
        };
        config.check(node_type)?;
        Ok(config)
    }

    /// Flat JSON object form, as stored under `data.node_data`.
    pub fn to_map(&self) -> Map<String, Value> {
        match self {
            NodeConfig::PythNetwork(c) => to_object(c),
            NodeConfig::ChartData(c) => to_object(c),
            NodeConfig::VisionAgent(c) => to_object(c),
            NodeConfig::TradingAgent(c) => to_object(c),
            NodeConfig::RiskManager(c) => to_object(c),
            NodeConfig::YieldOptimizer(c) => to_object(c),
            NodeConfig::Condition(c) => to_object(c),
            NodeConfig::Swap(c) => to_object(c),
            NodeConfig::LimitOrder(c) => to_object(c),
            NodeConfig::SendToken(c) => to_object(c),
            NodeConfig::Notification(c) => to_object(c),
            NodeConfig::Custom(map) => map.clone(),
        }
    }

    /// Shallow-merge `patch` over the current fields and re-parse.
    pub fn merged(&self, node_type: &str, patch: &Map<String, Value>) -> Result<NodeConfig, ConfigError> {
        let mut map = self.to_map();
        for (key, value) in patch {
            map.insert(key.clone(), value.clone());
        }
        NodeConfig::from_map(node_type, map)
    }

    fn check(&self, node_type: &str) -> Result<(), ConfigError> {
        let invalid = |reason: String| ConfigError::Invalid {
            node_type: node_type.to_string(),
            reason,
        };
        let non_negative = |name: &str, v: f64| {
            if v.is_finite() && v >= 0.0 {
                Ok(())
            } else {
                Err(invalid(format!("{name} must be a non-negative number, got {v}")))
            }
        };

        match self {
            NodeConfig::PythNetwork(c) if c.symbol.trim().is_empty() => {
                Err(invalid("symbol must not be empty".into()))
            }
            NodeConfig::ChartData(c) if c.symbol.trim().is_empty() => {
                Err(invalid("symbol must not be empty".into()))
            }
            NodeConfig::TradingAgent(c) => non_negative("max_position_usd", c.max_position_usd),
            NodeConfig::RiskManager(c) => {
                if !(0.0..=100.0).contains(&c.max_drawdown_pct) {
                    return Err(invalid(format!(
                        "max_drawdown_pct {} outside valid range 0..=100",
                        c.max_drawdown_pct
                    )));
                }
                non_negative("max_position_usd", c.max_position_usd)
            }
            NodeConfig::YieldOptimizer(c) => non_negative("min_apy", c.min_apy),
            NodeConfig::Condition(c) if !c.threshold.is_finite() => {
                Err(invalid("threshold must be finite".into()))
            }
            NodeConfig::Swap(c) => {
                non_negative("amount", c.amount)?;
                if !(0.0..=10_000.0).contains(&c.slippage_bps) {
                    return Err(invalid(format!(
                        "slippage_bps {} outside valid range 0..=10000",
                        c.slippage_bps
                    )));
                }
                Ok(())
            }
            NodeConfig::LimitOrder(c) => {
                non_negative("limit_price", c.limit_price)?;
                non_negative("amount", c.amount)
            }
            NodeConfig::SendToken(c) => {
                non_negative("amount", c.amount)?;
                if !c.recipient.is_empty() && !c.recipient.starts_with("0x") {
                    return Err(invalid(format!(
                        "recipient `{}` is not a 0x-prefixed address",
                        c.recipient
                    )));
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }
}
