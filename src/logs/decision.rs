use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Agent categories a log line can be attributed to, in matching priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum AgentCategory {
    Vision,
    Trading,
    Risk,
    Yield,
}

impl AgentCategory {
    pub const ALL: [AgentCategory; 4] = [
        AgentCategory::Vision,
        AgentCategory::Trading,
        AgentCategory::Risk,
        AgentCategory::Yield,
    ];
}

impl std::fmt::Display for AgentCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            AgentCategory::Vision => "vision",
            AgentCategory::Trading => "trading",
            AgentCategory::Risk => "risk",
            AgentCategory::Yield => "yield",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum Sentiment {
    Bullish,
    Bearish,
    Neutral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum TradeAction {
    Buy,
    Sell,
    Hold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum YieldAction {
    Rebalance,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct VisionDecision {
    pub sentiment: Option<Sentiment>,
    pub confidence: u8,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TradingDecision {
    pub action: TradeAction,
    pub confidence: u8,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RiskDecision {
    /// `None` when the line names the risk manager without a verdict.
    pub approved: Option<bool>,
    pub confidence: u8,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct YieldDecision {
    pub action: Option<YieldAction>,
    /// APY in percent when the line states one.
    pub apy: Option<f64>,
    pub confidence: u8,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

/// Latest decision per agent category. Later lines overwrite earlier ones;
/// no history is kept here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AgentDecisions {
    pub vision: Option<VisionDecision>,
    pub trading: Option<TradingDecision>,
    pub risk: Option<RiskDecision>,
    #[serde(rename = "yield")]
    pub yield_: Option<YieldDecision>,
    /// Most recent entry the engine tagged as an error.
    #[serde(rename = "lastError")]
    pub last_error: Option<String>,
}

impl AgentDecisions {
    pub fn has(&self, category: AgentCategory) -> bool {
        match category {
            AgentCategory::Vision => self.vision.is_some(),
            AgentCategory::Trading => self.trading.is_some(),
            AgentCategory::Risk => self.risk.is_some(),
            AgentCategory::Yield => self.yield_.is_some(),
        }
    }

    pub fn is_empty(&self) -> bool {
        AgentCategory::ALL.iter().all(|c| !self.has(*c)) && self.last_error.is_none()
    }

    /// One line per category for terminal output.
    pub fn summary_lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        if let Some(v) = &self.vision {
            let sentiment = v
                .sentiment
                .map(|s| format!("{s:?}").to_uppercase())
                .unwrap_or_else(|| "-".into());
            lines.push(format!("vision   {sentiment:<8} {:>3}%  {}", v.confidence, v.message));
        }
        if let Some(t) = &self.trading {
            let action = format!("{:?}", t.action).to_uppercase();
            lines.push(format!("trading  {action:<8} {:>3}%  {}", t.confidence, t.message));
        }
        if let Some(r) = &self.risk {
            let verdict = match r.approved {
                Some(true) => "APPROVED",
                Some(false) => "REJECTED",
                None => "-",
            };
            lines.push(format!("risk     {verdict:<8} {:>3}%  {}", r.confidence, r.message));
        }
        if let Some(y) = &self.yield_ {
            let action = y.action.map(|_| "REBALANCE").unwrap_or("-");
            let apy = y.apy.map(|a| format!(" (APY {a}%)")).unwrap_or_default();
            lines.push(format!("yield    {action:<8} {:>3}%  {}{apy}", y.confidence, y.message));
        }
        if let Some(e) = &self.last_error {
            lines.push(format!("error    {e}"));
        }
        lines
    }
}
