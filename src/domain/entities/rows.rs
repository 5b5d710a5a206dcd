use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

/// Total conversion of loosely typed input into a number. Strips thousands
/// separators and surrounding whitespace; anything that does not parse as a
/// finite decimal becomes 0.
pub fn to_number(raw: &str) -> f64 {
    let cleaned = raw.replace(',', "");
    match cleaned.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => value,
        _ => 0.0,
    }
}

pub fn number_from_value(value: &serde_json::Value) -> f64 {
    match value {
        serde_json::Value::Number(number) => number
            .as_f64()
            .filter(|parsed| parsed.is_finite())
            .unwrap_or(0.0),
        serde_json::Value::String(text) => to_number(text),
        _ => 0.0,
    }
}

/// Serde shim: accepts a JSON number or a dirty string ("1,234.50") in a
/// numeric position and coerces it with the same defaulting as `to_number`.
pub fn lenient_number<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(number_from_value(&value))
}

/// Formats a coerced number back into cell text. Whole numbers drop the
/// fractional part so edits round-trip as "10", not "10.0".
pub fn number_to_text(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 9_007_199_254_740_992.0 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CategoryRow {
    pub product: String,
    #[serde(deserialize_with = "lenient_number")]
    pub total_orders: f64,
    #[serde(deserialize_with = "lenient_number")]
    pub success: f64,
    #[serde(deserialize_with = "lenient_number")]
    pub initiated: f64,
    #[serde(deserialize_with = "lenient_number")]
    pub purchase_initiated: f64,
    #[serde(deserialize_with = "lenient_number")]
    pub failure: f64,
}

pub const CATEGORY_FIELDS: [&str; 6] = [
    "product",
    "totalOrders",
    "success",
    "initiated",
    "purchaseInitiated",
    "failure",
];

impl CategoryRow {
    /// Projects a raw field→text mapping (table edit, CSV import, partial
    /// JSON) into the canonical shape. Missing text defaults to empty,
    /// missing or dirty numerics default to 0.
    pub fn from_raw(raw: &BTreeMap<String, String>) -> Self {
        let number = |field: &str| raw.get(field).map(String::as_str).map_or(0.0, to_number);
        Self {
            product: raw.get("product").cloned().unwrap_or_default(),
            total_orders: number("totalOrders"),
            success: number("success"),
            initiated: number("initiated"),
            purchase_initiated: number("purchaseInitiated"),
            failure: number("failure"),
        }
    }

    pub fn to_raw(&self) -> BTreeMap<String, String> {
        let mut raw = BTreeMap::new();
        raw.insert("product".to_string(), self.product.clone());
        raw.insert("totalOrders".to_string(), number_to_text(self.total_orders));
        raw.insert("success".to_string(), number_to_text(self.success));
        raw.insert("initiated".to_string(), number_to_text(self.initiated));
        raw.insert(
            "purchaseInitiated".to_string(),
            number_to_text(self.purchase_initiated),
        );
        raw.insert("failure".to_string(), number_to_text(self.failure));
        raw
    }

    /// Cell text in `CATEGORY_FIELDS` order, for the editable table.
    pub fn to_cells(&self) -> Vec<String> {
        vec![
            self.product.clone(),
            number_to_text(self.total_orders),
            number_to_text(self.success),
            number_to_text(self.initiated),
            number_to_text(self.purchase_initiated),
            number_to_text(self.failure),
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UserRow {
    pub user: String,
    #[serde(deserialize_with = "lenient_number")]
    pub attempts: f64,
}

pub const USER_FIELDS: [&str; 2] = ["user", "attempts"];

impl UserRow {
    pub fn from_raw(raw: &BTreeMap<String, String>) -> Self {
        Self {
            user: raw.get("user").cloned().unwrap_or_default(),
            attempts: raw.get("attempts").map(String::as_str).map_or(0.0, to_number),
        }
    }

    pub fn to_raw(&self) -> BTreeMap<String, String> {
        let mut raw = BTreeMap::new();
        raw.insert("user".to_string(), self.user.clone());
        raw.insert("attempts".to_string(), number_to_text(self.attempts));
        raw
    }

    pub fn to_cells(&self) -> Vec<String> {
        vec![self.user.clone(), number_to_text(self.attempts)]
    }
}
