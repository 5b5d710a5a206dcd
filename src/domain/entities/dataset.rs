use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::entities::rows::{lenient_number, number_from_value, CategoryRow, UserRow};

/// The full structured document behind the dashboard. Every field defaults
/// when absent so a minimal document (title/period/currency only) still
/// renders.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Dataset {
    pub title: String,
    pub period: String,
    pub currency: String,
    pub currency_symbol: String,
    pub transaction_stats: TransactionStats,
    #[serde(deserialize_with = "lenient_count_map")]
    pub payment_status: BTreeMap<String, f64>,
    #[serde(deserialize_with = "lenient_count_map")]
    pub transaction_status: BTreeMap<String, f64>,
    #[serde(deserialize_with = "failure_reasons_from_any")]
    pub failure_reasons: Vec<FailureReason>,
    pub categories: Vec<CategoryRow>,
    pub users: Users,
}

impl Dataset {
    /// Built-in minimal dataset used when the base document cannot be
    /// retrieved. Aggregates and tables stay empty.
    pub fn fallback() -> Self {
        Self {
            title: "Huge Selfcare Performance Dashboard".to_string(),
            period: "30th October to 30th November 2025".to_string(),
            currency: "ZAR".to_string(),
            currency_symbol: "ZAR".to_string(),
            ..Self::default()
        }
    }

    pub fn currency_label(&self) -> &str {
        if self.currency_symbol.is_empty() {
            &self.currency
        } else {
            &self.currency_symbol
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TransactionStats {
    #[serde(deserialize_with = "lenient_number")]
    pub total_orders: f64,
    #[serde(deserialize_with = "lenient_number")]
    pub success_orders: f64,
    #[serde(deserialize_with = "lenient_number")]
    pub failure_orders: f64,
    #[serde(deserialize_with = "lenient_number")]
    pub total_value_orders: f64,
    #[serde(deserialize_with = "lenient_number")]
    pub success_value: f64,
    #[serde(deserialize_with = "lenient_number")]
    pub avg_success_value: f64,
    #[serde(deserialize_with = "lenient_number")]
    pub max_order_value: f64,
    #[serde(deserialize_with = "lenient_number")]
    pub min_order_value: f64,
}

impl TransactionStats {
    pub fn success_rate(&self) -> f64 {
        if self.total_orders == 0.0 {
            0.0
        } else {
            self.success_orders / self.total_orders * 100.0
        }
    }

    pub fn failure_rate(&self) -> f64 {
        if self.total_orders == 0.0 {
            0.0
        } else {
            self.failure_orders / self.total_orders * 100.0
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Users {
    pub attempts: Vec<UserRow>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FailureReason {
    pub reason: String,
    #[serde(deserialize_with = "lenient_number")]
    pub count: f64,
}

/// Source documents carry failure reasons either as an ordered sequence of
/// `{reason, count}` or as a reason→count map. Both forms are normalized to
/// the sequence form at the parse boundary so nothing downstream has to care.
fn failure_reasons_from_any<'de, D>(deserializer: D) -> Result<Vec<FailureReason>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Seq(Vec<FailureReason>),
        Map(BTreeMap<String, serde_json::Value>),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Seq(reasons) => Ok(reasons),
        Raw::Map(counts) => Ok(counts
            .into_iter()
            .map(|(reason, count)| FailureReason {
                reason,
                count: number_from_value(&count),
            })
            .collect()),
    }
}

fn lenient_count_map<'de, D>(deserializer: D) -> Result<BTreeMap<String, f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = BTreeMap::<String, serde_json::Value>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .map(|(status, count)| (status, number_from_value(&count)))
        .collect())
}
