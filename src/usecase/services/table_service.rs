use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::Result;

use crate::domain::entities::rows::{CategoryRow, UserRow, CATEGORY_FIELDS, USER_FIELDS};
use crate::infra::csv::codec::{self, CsvTable};
use crate::usecase::ports::store::{
    store_rows, OverrideStore, StoreError, CATEGORIES_KEY, USERS_KEY,
};

/// Edits, imports, and exports for the two locally overridable tables.
pub struct TableService {
    store: Arc<dyn OverrideStore>,
}

impl TableService {
    pub fn new(store: Arc<dyn OverrideStore>) -> Self {
        Self { store }
    }

    /// Coerces edited cell text (in `CATEGORY_FIELDS` column order) and stores
    /// the result as the categories override.
    pub fn save_category_drafts(&self, drafts: &[Vec<String>]) -> Result<(), StoreError> {
        let rows: Vec<CategoryRow> = drafts
            .iter()
            .map(|cells| CategoryRow::from_raw(&zip_fields(&CATEGORY_FIELDS, cells)))
            .collect();
        store_rows(self.store.as_ref(), CATEGORIES_KEY, &rows)
    }

    pub fn save_user_drafts(&self, drafts: &[Vec<String>]) -> Result<(), StoreError> {
        let rows: Vec<UserRow> = drafts
            .iter()
            .map(|cells| UserRow::from_raw(&zip_fields(&USER_FIELDS, cells)))
            .collect();
        store_rows(self.store.as_ref(), USERS_KEY, &rows)
    }

    /// Drops both overrides so the base dataset shows through again.
    pub fn reset_overrides(&self) -> Result<(), StoreError> {
        self.store.clear(CATEGORIES_KEY)?;
        self.store.clear(USERS_KEY)
    }

    pub fn import_categories_csv(&self, text: &str) -> Result<usize, StoreError> {
        let table = codec::parse(text);
        let rows: Vec<CategoryRow> = table
            .rows
            .iter()
            .map(|raw| CategoryRow::from_raw(&canonicalize(&table, raw, canonical_category_field)))
            .collect();
        store_rows(self.store.as_ref(), CATEGORIES_KEY, &rows)?;
        Ok(rows.len())
    }

    pub fn import_users_csv(&self, text: &str) -> Result<usize, StoreError> {
        let table = codec::parse(text);
        let rows: Vec<UserRow> = table
            .rows
            .iter()
            .map(|raw| UserRow::from_raw(&canonicalize(&table, raw, canonical_user_field)))
            .collect();
        store_rows(self.store.as_ref(), USERS_KEY, &rows)?;
        Ok(rows.len())
    }

    /// CSV text for the given effective rows, in fixed header order.
    pub fn export_categories(&self, rows: &[CategoryRow]) -> Result<String> {
        let headers: Vec<String> = CATEGORY_FIELDS.iter().map(|h| h.to_string()).collect();
        let raw: Vec<BTreeMap<String, String>> = rows.iter().map(CategoryRow::to_raw).collect();
        codec::serialize(&headers, &raw)
    }

    pub fn export_users(&self, rows: &[UserRow]) -> Result<String> {
        let headers: Vec<String> = USER_FIELDS.iter().map(|h| h.to_string()).collect();
        let raw: Vec<BTreeMap<String, String>> = rows.iter().map(UserRow::to_raw).collect();
        codec::serialize(&headers, &raw)
    }
}

fn zip_fields(fields: &[&str], cells: &[String]) -> BTreeMap<String, String> {
    fields
        .iter()
        .zip(cells.iter())
        .map(|(field, cell)| (field.to_string(), cell.clone()))
        .collect()
}

/// Remaps imported headers onto canonical field names, walking the columns in
/// file order so the first recognized column wins. Unrecognized headers are
/// dropped.
fn canonicalize(
    table: &CsvTable,
    raw: &BTreeMap<String, String>,
    field_for: fn(&str) -> Option<&'static str>,
) -> BTreeMap<String, String> {
    let mut out = BTreeMap::new();
    for header in &table.headers {
        if let (Some(field), Some(value)) = (field_for(header), raw.get(header)) {
            out.entry(field.to_string()).or_insert_with(|| value.clone());
        }
    }
    out
}

fn normalize_header(header: &str) -> String {
    header
        .chars()
        .filter(|ch| !ch.is_whitespace())
        .collect::<String>()
        .to_ascii_lowercase()
}

fn canonical_category_field(header: &str) -> Option<&'static str> {
    match normalize_header(header).as_str() {
        "product" | "productdescription" => Some("product"),
        "totalorders" => Some("totalOrders"),
        "success" => Some("success"),
        "initiated" => Some("initiated"),
        "purchaseinitiated" => Some("purchaseInitiated"),
        "failure" => Some("failure"),
        _ => None,
    }
}

fn canonical_user_field(header: &str) -> Option<&'static str> {
    match normalize_header(header).as_str() {
        "user" => Some("user"),
        "attempts" | "transactionattempts" => Some("attempts"),
        _ => None,
    }
}
