use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A token balance reported by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Balance {
    pub token: String,
    pub chain: String,
    pub amount: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usd_value: Option<f64>,
}

/// One row of transaction history.
///
/// `timestamp` and `amount` are kept as the backend formats them so the
/// CSV export reproduces them verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Transaction {
    pub timestamp: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(deserialize_with = "amount_as_string")]
    pub amount: String,
    pub chain: String,
    pub status: String,
    #[serde(rename = "txHash")]
    pub tx_hash: String,
}

fn amount_as_string<'de, D: serde::Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    match serde_json::Value::deserialize(d)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "amount must be a string or number, got {other}"
        ))),
    }
}
