//! Token Report Model
//!
//! Shape of the QuillCheck `tokens/information` payload. Everything is
//! optional: the report is passed through as-is and nothing here is
//! validated or recomputed. Explicit `null`s are treated like missing keys.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

/// Deserialize `null` as the type's default
fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A numeric figure that may arrive as a JSON number or a numeric string
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Figure {
    Number(serde_json::Number),
    Text(String),
}

impl Figure {
    /// Exact decimal value, if the figure is numeric
    #[must_use]
    pub fn to_decimal(&self) -> Option<Decimal> {
        let raw = match self {
            Self::Number(n) => n.to_string(),
            Self::Text(s) => s.trim().to_string(),
        };
        Decimal::from_str(&raw)
            .or_else(|_| Decimal::from_scientific(&raw))
            .ok()
    }
}

impl fmt::Display for Figure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// `{"percent": …}`
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Percent {
    pub percent: Option<Figure>,
}

/// `{"number": …}`
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Count {
    pub number: Option<Figure>,
}

/// Full analysis payload for one (chain, address) pair
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenReport {
    #[serde(default, deserialize_with = "nullable")]
    pub token_information: TokenInformation,

    #[serde(default, deserialize_with = "nullable")]
    pub token_score: TokenScore,

    #[serde(default, deserialize_with = "nullable")]
    pub market_checks: MarketChecks,

    #[serde(default, deserialize_with = "nullable")]
    pub code_checks: CodeChecks,

    #[serde(default, deserialize_with = "nullable")]
    pub honeypot_details: HoneypotDetails,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenInformation {
    pub token_name: Option<String>,
    pub token_symbol: Option<String>,
    pub token_address: Option<String>,
    /// ISO-8601 timestamp
    pub token_creation_date: Option<String>,
    pub total_supply: Option<Figure>,
    /// Link name → URL; `null` URLs are kept so the payload round-trips
    #[serde(default, deserialize_with = "nullable")]
    pub external_links: BTreeMap<String, Option<String>>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenScore {
    #[serde(default, deserialize_with = "nullable")]
    pub total_score: Percent,
    #[serde(default, deserialize_with = "nullable")]
    pub code_score: Percent,
    #[serde(default, deserialize_with = "nullable")]
    pub market_score: Percent,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketChecks {
    #[serde(default, deserialize_with = "nullable")]
    pub holders_checks: HoldersChecks,
    #[serde(default, deserialize_with = "nullable")]
    pub liquidity_checks: LiquidityChecks,
    #[serde(default, deserialize_with = "nullable")]
    pub pair_by_pair_information: Vec<TradingPair>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HoldersChecks {
    #[serde(default, deserialize_with = "nullable")]
    pub holders_count: Count,
    #[serde(default, deserialize_with = "nullable")]
    pub percent_distributed: PercentDistributed,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PercentDistributed {
    #[serde(default, deserialize_with = "nullable")]
    pub top_three: Percent,
    #[serde(default, deserialize_with = "nullable")]
    pub top_ten: Percent,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiquidityChecks {
    #[serde(default, deserialize_with = "nullable")]
    pub aggregated_information: AggregatedLiquidity,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedLiquidity {
    #[serde(default, deserialize_with = "nullable")]
    pub total_lp_supply_in_usd: Count,
    #[serde(default, deserialize_with = "nullable")]
    pub lp_holder_count: Count,
    #[serde(default, deserialize_with = "nullable")]
    pub trading_pair_count: Count,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradingPair {
    pub token0_symbol: Option<String>,
    pub token1_symbol: Option<String>,
    pub dex_name: Option<String>,
    pub lp_supply_in_usd: Option<Figure>,
    pub pair_address: Option<String>,
}

/// Contract-level checks. Entries are kept raw because the provider mixes
/// check objects with plain scalar fields in the same map.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeChecks {
    #[serde(default, deserialize_with = "nullable")]
    pub ownership_checks: BTreeMap<String, serde_json::Value>,
}

/// A described pass/fail check
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CheckFinding {
    pub description: String,
    pub passed: bool,
}

impl CodeChecks {
    /// Checks that carry a description, in key order
    #[must_use]
    pub fn ownership_findings(&self) -> Vec<CheckFinding> {
        self.ownership_checks
            .values()
            .filter_map(|value| {
                let check = value.as_object()?;
                let description = check.get("description")?.as_str()?.to_string();
                let passed = check.get("status").is_some_and(is_truthy);
                Some(CheckFinding { description, passed })
            })
            .collect()
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HoneypotDetails {
    /// `0` when the token is sellable; anything else is a flag
    pub is_token_honeypot: Option<serde_json::Value>,
}

impl HoneypotDetails {
    /// `None` when the provider did not report a result
    #[must_use]
    pub fn is_honeypot(&self) -> Option<bool> {
        match self.is_token_honeypot.as_ref()? {
            serde_json::Value::Bool(flag) => Some(*flag),
            serde_json::Value::Number(n) => n.as_f64().map(|v| v != 0.0),
            serde_json::Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                "0" | "false" => Some(false),
                "1" | "true" => Some(true),
                _ => None,
            },
            _ => None,
        }
    }
}

fn is_truthy(value: &serde_json::Value) -> bool {
    match value {
        serde_json::Value::Null => false,
        serde_json::Value::Bool(b) => *b,
        serde_json::Value::Number(n) => n.as_f64().is_some_and(|v| v != 0.0),
        serde_json::Value::String(s) => !s.is_empty(),
        serde_json::Value::Array(a) => !a.is_empty(),
        serde_json::Value::Object(o) => !o.is_empty(),
    }
}
