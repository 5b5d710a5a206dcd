use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::domain::entities::dataset::{Dataset, FailureReason, Users};
use crate::domain::entities::rows::{number_to_text, to_number, CategoryRow, UserRow};
use crate::infra::csv::codec;
use crate::infra::store::memory::MemoryStore;
use crate::infra::store::sqlite::SqliteStore;
use crate::usecase::ports::store::{
    load_rows, store_rows, OverrideStore, CATEGORIES_KEY, USERS_KEY,
};
use crate::usecase::services::load_service::{parse_dataset, LoadService};
use crate::usecase::services::merge_service::MergeService;
use crate::usecase::services::table_service::TableService;
use crate::*;

fn unique_test_dir(prefix: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock should be after epoch")
        .as_nanos();
    std::env::temp_dir().join(format!("selfcare-{prefix}-{nanos}"))
}

fn sample_dataset() -> Dataset {
    let mut dataset = Dataset::fallback();
    dataset.categories = vec![
        CategoryRow {
            product: "Airtime Top-up".to_string(),
            total_orders: 100.0,
            success: 80.0,
            initiated: 10.0,
            purchase_initiated: 5.0,
            failure: 5.0,
        },
        CategoryRow {
            product: "Data Bundle 1GB".to_string(),
            total_orders: 50.0,
            success: 40.0,
            initiated: 4.0,
            purchase_initiated: 3.0,
            failure: 3.0,
        },
    ];
    dataset.users = Users {
        attempts: vec![
            UserRow {
                user: "27821234567".to_string(),
                attempts: 12.0,
            },
            UserRow {
                user: "27835550912".to_string(),
                attempts: 7.0,
            },
        ],
    };
    dataset
}

#[test]
fn csv_parse_splits_headers_and_zips_rows() {
    let table = codec::parse("product,totalOrders,success\nWidget,10,8\nGadget,5\n");

    assert_eq!(table.headers, vec!["product", "totalOrders", "success"]);
    assert_eq!(table.rows.len(), 2);
    assert_eq!(table.rows[0]["product"], "Widget");
    assert_eq!(table.rows[0]["totalOrders"], "10");
    assert_eq!(table.rows[0]["success"], "8");
    assert_eq!(
        table.rows[1]["success"], "",
        "missing trailing fields should become empty text"
    );
}

#[test]
fn csv_parse_handles_quoted_fields() {
    let table = codec::parse("product,note\n\"A, \"\"B\"\"\",plain\n");

    assert_eq!(table.rows.len(), 1);
    assert_eq!(
        table.rows[0]["product"], "A, \"B\"",
        "quoted commas and doubled quotes should survive parsing"
    );
    assert_eq!(table.rows[0]["note"], "plain");
}

#[test]
fn csv_parse_skips_blank_lines() {
    let table = codec::parse("user,attempts\n\nalice,3\n\n\nbob,4\n");

    assert_eq!(table.rows.len(), 2);
    assert_eq!(table.rows[0]["user"], "alice");
    assert_eq!(table.rows[1]["user"], "bob");
}

#[test]
fn csv_parse_of_empty_input_yields_empty_table() {
    assert_eq!(codec::parse(""), codec::CsvTable::default());
    assert_eq!(codec::parse("\n  \n"), codec::CsvTable::default());
}

#[test]
fn csv_serialize_quotes_special_fields_and_terminates_lines() {
    let headers = vec!["product".to_string(), "note".to_string()];
    let mut row = BTreeMap::new();
    row.insert("product".to_string(), "A, \"B\"".to_string());
    row.insert("note".to_string(), "plain".to_string());

    let text = codec::serialize(&headers, &[row]).expect("serialize should succeed");

    assert_eq!(text, "product,note\n\"A, \"\"B\"\"\",plain\n");
}

#[test]
fn csv_round_trip_preserves_values() {
    let headers = vec!["product".to_string(), "totalOrders".to_string()];
    let mut first = BTreeMap::new();
    first.insert("product".to_string(), "A, \"B\"".to_string());
    first.insert("totalOrders".to_string(), "1200".to_string());
    let mut second = BTreeMap::new();
    second.insert("product".to_string(), "Widget".to_string());
    second.insert("totalOrders".to_string(), "10".to_string());
    let rows = vec![first, second];

    let text = codec::serialize(&headers, &rows).expect("serialize should succeed");
    let parsed = codec::parse(&text);

    assert_eq!(parsed.headers, headers);
    assert_eq!(parsed.rows, rows);
}

#[test]
fn to_number_is_total() {
    assert_eq!(to_number(""), 0.0);
    assert_eq!(to_number("abc"), 0.0);
    assert_eq!(to_number("1,234.50"), 1234.5);
    assert_eq!(to_number("  42  "), 42.0);
    assert_eq!(to_number("-7"), -7.0);
    assert_eq!(to_number("inf"), 0.0, "non-finite input should default to 0");
}

#[test]
fn number_to_text_drops_fraction_for_whole_numbers() {
    assert_eq!(number_to_text(10.0), "10");
    assert_eq!(number_to_text(10.5), "10.5");
    assert_eq!(number_to_text(0.0), "0");
}

#[test]
fn category_row_from_raw_defaults_missing_fields() {
    let mut raw = BTreeMap::new();
    raw.insert("product".to_string(), "Widget".to_string());
    raw.insert("totalOrders".to_string(), "1,200".to_string());

    let row = CategoryRow::from_raw(&raw);

    assert_eq!(row.product, "Widget");
    assert_eq!(row.total_orders, 1200.0);
    assert_eq!(row.success, 0.0);
    assert_eq!(row.initiated, 0.0);
    assert_eq!(row.purchase_initiated, 0.0);
    assert_eq!(row.failure, 0.0);
}

#[test]
fn sqlite_store_persists_values_across_connections() {
    let temp_dir = unique_test_dir("sqlite-persist");
    fs::create_dir_all(&temp_dir).expect("should create temp dir");
    let db_path = temp_dir.join("overrides.sqlite");

    let store = SqliteStore {
        db_path: db_path.clone(),
    };
    store.init().expect("init should succeed");
    store
        .set_raw("selfcare.test.v1", "[1,2,3]")
        .expect("set should succeed");

    let reopened = SqliteStore { db_path };
    let value = reopened
        .get_raw("selfcare.test.v1")
        .expect("get should succeed");
    assert_eq!(value.as_deref(), Some("[1,2,3]"));

    fs::remove_dir_all(&temp_dir).expect("should cleanup temp dir");
}

#[test]
fn sqlite_store_set_replaces_and_clear_removes() {
    let temp_dir = unique_test_dir("sqlite-clear");
    fs::create_dir_all(&temp_dir).expect("should create temp dir");
    let db_path = temp_dir.join("overrides.sqlite");

    let store = SqliteStore { db_path };
    store.init().expect("init should succeed");

    store.set_raw("key", "old").expect("set should succeed");
    store.set_raw("key", "new").expect("set should replace");
    assert_eq!(
        store.get_raw("key").expect("get should succeed").as_deref(),
        Some("new")
    );

    store.clear("key").expect("clear should succeed");
    assert_eq!(store.get_raw("key").expect("get should succeed"), None);

    fs::remove_dir_all(&temp_dir).expect("should cleanup temp dir");
}

#[test]
fn load_rows_falls_back_when_key_is_absent() {
    let store = MemoryStore::new();
    let fallback = vec![UserRow {
        user: "alice".to_string(),
        attempts: 3.0,
    }];

    let loaded = load_rows(&store, USERS_KEY, &fallback);

    assert_eq!(loaded, fallback);
}

#[test]
fn load_rows_falls_back_on_corrupt_blob() {
    let store = MemoryStore::new();
    store
        .set_raw(CATEGORIES_KEY, "{not json")
        .expect("set should succeed");
    let fallback = vec![CategoryRow {
        product: "Widget".to_string(),
        ..CategoryRow::default()
    }];

    let loaded = load_rows(&store, CATEGORIES_KEY, &fallback);

    assert_eq!(
        loaded, fallback,
        "a blob that no longer parses should behave like an absent key"
    );
}

#[test]
fn store_rows_then_load_rows_round_trips() {
    let store = MemoryStore::new();
    let rows = vec![
        UserRow {
            user: "alice".to_string(),
            attempts: 3.0,
        },
        UserRow {
            user: "bob".to_string(),
            attempts: 0.0,
        },
    ];

    store_rows(&store, USERS_KEY, &rows).expect("store should succeed");
    let loaded: Vec<UserRow> = load_rows(&store, USERS_KEY, &[]);

    assert_eq!(loaded, rows);
}

#[test]
fn effective_without_overrides_matches_base() {
    let store = Arc::new(MemoryStore::new());
    let merge = MergeService::new(store);
    let base = sample_dataset();

    let merged = merge.effective(&base);

    assert_eq!(merged, base);
}

#[test]
fn effective_uses_stored_categories_override() {
    let store = Arc::new(MemoryStore::new());
    let override_rows = vec![CategoryRow {
        product: "Replacement".to_string(),
        total_orders: 1.0,
        ..CategoryRow::default()
    }];
    store_rows(store.as_ref(), CATEGORIES_KEY, &override_rows).expect("store should succeed");
    let merge = MergeService::new(store);
    let base = sample_dataset();

    let merged = merge.effective(&base);

    assert_eq!(
        merged.categories, override_rows,
        "override should replace the base rows wholesale"
    );
    assert_eq!(
        merged.users.attempts, base.users.attempts,
        "the other table should be untouched"
    );
    assert_eq!(merged.transaction_stats, base.transaction_stats);
    assert_eq!(merged.title, base.title);
}

#[test]
fn effective_after_clear_restores_base_rows() {
    let store = Arc::new(MemoryStore::new());
    let override_rows = vec![CategoryRow::default()];
    store_rows(store.as_ref(), CATEGORIES_KEY, &override_rows).expect("store should succeed");
    store.clear(CATEGORIES_KEY).expect("clear should succeed");
    let merge = MergeService::new(store);
    let base = sample_dataset();

    let merged = merge.effective(&base);

    assert_eq!(merged.categories, base.categories);
}

#[test]
fn effective_is_repeatable_with_unchanged_inputs() {
    let store = Arc::new(MemoryStore::new());
    store_rows(
        store.as_ref(),
        USERS_KEY,
        &[UserRow {
            user: "alice".to_string(),
            attempts: 1.0,
        }],
    )
    .expect("store should succeed");
    let merge = MergeService::new(store);
    let base = sample_dataset();

    assert_eq!(merge.effective(&base), merge.effective(&base));
}

#[test]
fn parse_dataset_rejects_malformed_json() {
    assert!(parse_dataset("{not json").is_err());
}

#[test]
fn parse_dataset_defaults_missing_fields() {
    let dataset = parse_dataset(r#"{"title": "Minimal"}"#).expect("parse should succeed");

    assert_eq!(dataset.title, "Minimal");
    assert!(dataset.categories.is_empty());
    assert!(dataset.users.attempts.is_empty());
    assert_eq!(dataset.transaction_stats.total_orders, 0.0);
}

#[test]
fn parse_dataset_normalizes_failure_reason_shapes() {
    let from_seq = parse_dataset(
        r#"{"failureReasons": [{"reason": "Timeout", "count": 3}, {"reason": "Declined", "count": 2}]}"#,
    )
    .expect("sequence form should parse");
    let from_map =
        parse_dataset(r#"{"failureReasons": {"Declined": 2, "Timeout": 3}}"#)
            .expect("map form should parse");

    let mut seq_sorted = from_seq.failure_reasons.clone();
    seq_sorted.sort_by(|a, b| a.reason.cmp(&b.reason));
    assert_eq!(seq_sorted, from_map.failure_reasons);
    assert_eq!(
        from_seq.failure_reasons[0],
        FailureReason {
            reason: "Timeout".to_string(),
            count: 3.0,
        },
        "sequence form should preserve its order"
    );
}

#[test]
fn parse_dataset_coerces_dirty_numeric_strings() {
    let dataset = parse_dataset(
        r#"{"categories": [{"product": "Widget", "totalOrders": "1,200", "success": "abc"}]}"#,
    )
    .expect("parse should succeed");

    assert_eq!(dataset.categories.len(), 1);
    assert_eq!(dataset.categories[0].total_orders, 1200.0);
    assert_eq!(dataset.categories[0].success, 0.0);
}

#[test]
fn repo_data_json_parses() {
    let text = fs::read_to_string("data.json").expect("repo should ship data.json");
    let dataset = parse_dataset(&text).expect("data.json should parse");

    assert!(!dataset.categories.is_empty());
    assert!(!dataset.users.attempts.is_empty());
    assert!(dataset.transaction_stats.total_orders > 0.0);
}

#[test]
fn load_base_or_fallback_uses_builtin_when_file_missing() {
    let missing = unique_test_dir("no-data").join("data.json");
    let service = LoadService::new(missing);

    let dataset = service.load_base_or_fallback();

    assert_eq!(dataset, Dataset::fallback());
    assert_eq!(dataset.currency, "ZAR");
    assert!(dataset.categories.is_empty());
}

#[test]
fn import_maps_display_label_headers() {
    let store = Arc::new(MemoryStore::new());
    let service = TableService::new(store.clone());

    let count = service
        .import_categories_csv("Product Description,Total Orders\nWidget,10\n")
        .expect("import should succeed");

    assert_eq!(count, 1);
    let stored: Vec<CategoryRow> = load_rows(store.as_ref(), CATEGORIES_KEY, &[]);
    assert_eq!(
        stored,
        vec![CategoryRow {
            product: "Widget".to_string(),
            total_orders: 10.0,
            ..CategoryRow::default()
        }]
    );
}

#[test]
fn import_matches_headers_case_insensitively() {
    let store = Arc::new(MemoryStore::new());
    let service = TableService::new(store.clone());

    service
        .import_categories_csv("PRODUCT,TOTAL ORDERS,Failure\nWidget,10,2\n")
        .expect("import should succeed");

    let stored: Vec<CategoryRow> = load_rows(store.as_ref(), CATEGORIES_KEY, &[]);
    assert_eq!(stored[0].product, "Widget");
    assert_eq!(stored[0].total_orders, 10.0);
    assert_eq!(stored[0].failure, 2.0);
}

#[test]
fn import_ignores_unrecognized_headers() {
    let store = Arc::new(MemoryStore::new());
    let service = TableService::new(store.clone());

    service
        .import_categories_csv("product,comment,totalOrders\nWidget,ignore me,10\n")
        .expect("import should succeed");

    let stored: Vec<CategoryRow> = load_rows(store.as_ref(), CATEGORIES_KEY, &[]);
    assert_eq!(stored[0].product, "Widget");
    assert_eq!(stored[0].total_orders, 10.0);
}

#[test]
fn user_import_accepts_transaction_attempts_label() {
    let store = Arc::new(MemoryStore::new());
    let service = TableService::new(store.clone());

    service
        .import_users_csv("User,Transaction Attempts\n27821234567,15\n")
        .expect("import should succeed");

    let stored: Vec<UserRow> = load_rows(store.as_ref(), USERS_KEY, &[]);
    assert_eq!(
        stored,
        vec![UserRow {
            user: "27821234567".to_string(),
            attempts: 15.0,
        }]
    );
}

#[test]
fn export_categories_uses_fixed_header_order() {
    let service = TableService::new(Arc::new(MemoryStore::new()));
    let rows = vec![CategoryRow {
        product: "Widget".to_string(),
        total_orders: 10.0,
        success: 8.0,
        initiated: 1.0,
        purchase_initiated: 1.0,
        failure: 0.0,
    }];

    let text = service.export_categories(&rows).expect("export should succeed");

    assert_eq!(
        text,
        "product,totalOrders,success,initiated,purchaseInitiated,failure\nWidget,10,8,1,1,0\n"
    );
}

#[test]
fn export_users_uses_fixed_header_order() {
    let service = TableService::new(Arc::new(MemoryStore::new()));
    let rows = vec![UserRow {
        user: "27821234567".to_string(),
        attempts: 15.0,
    }];

    let text = service.export_users(&rows).expect("export should succeed");

    assert_eq!(text, "user,attempts\n27821234567,15\n");
}

#[test]
fn export_then_import_round_trips_quoted_product() {
    let store = Arc::new(MemoryStore::new());
    let service = TableService::new(store.clone());
    let rows = vec![CategoryRow {
        product: "A, \"B\"".to_string(),
        total_orders: 3.0,
        ..CategoryRow::default()
    }];

    let text = service.export_categories(&rows).expect("export should succeed");
    service
        .import_categories_csv(&text)
        .expect("import should succeed");

    let stored: Vec<CategoryRow> = load_rows(store.as_ref(), CATEGORIES_KEY, &[]);
    assert_eq!(stored, rows);
}

#[test]
fn save_category_drafts_coerces_cell_text() {
    let store = Arc::new(MemoryStore::new());
    let service = TableService::new(store.clone());
    let drafts = vec![vec![
        "Widget".to_string(),
        "1,200".to_string(),
        "3".to_string(),
        String::new(),
        "abc".to_string(),
        "7".to_string(),
    ]];

    service
        .save_category_drafts(&drafts)
        .expect("save should succeed");

    let stored: Vec<CategoryRow> = load_rows(store.as_ref(), CATEGORIES_KEY, &[]);
    assert_eq!(
        stored,
        vec![CategoryRow {
            product: "Widget".to_string(),
            total_orders: 1200.0,
            success: 3.0,
            initiated: 0.0,
            purchase_initiated: 0.0,
            failure: 7.0,
        }]
    );
}

#[test]
fn reset_overrides_clears_both_tables() {
    let store = Arc::new(MemoryStore::new());
    let service = TableService::new(store.clone());
    store_rows(store.as_ref(), CATEGORIES_KEY, &[CategoryRow::default()])
        .expect("store should succeed");
    store_rows(store.as_ref(), USERS_KEY, &[UserRow::default()])
        .expect("store should succeed");

    service.reset_overrides().expect("reset should succeed");

    assert_eq!(
        store.get_raw(CATEGORIES_KEY).expect("get should succeed"),
        None
    );
    assert_eq!(store.get_raw(USERS_KEY).expect("get should succeed"), None);
}

#[test]
fn format_number_with_commas_handles_decimals() {
    assert_eq!(format_number_with_commas(12345.678, 0), "12,346");
    assert_eq!(format_number_with_commas(12345.678, 2), "12,345.68");
    assert_eq!(format_number_with_commas(-1234.5, 2), "-1,234.50");
    assert_eq!(format_number_with_commas(0.0, 0), "0");
}

#[test]
fn fmt_money_prefers_currency_symbol() {
    let mut dataset = Dataset::fallback();
    dataset.currency = "ZAR".to_string();
    dataset.currency_symbol = "R".to_string();
    assert_eq!(fmt_money(1234.5, &dataset), "R 1,234.50");

    dataset.currency_symbol = String::new();
    assert_eq!(fmt_money(1234.5, &dataset), "ZAR 1,234.50");
}

#[test]
fn default_db_path_uses_dashboard_app_directory() {
    let path = default_db_path().expect("should resolve db path");
    assert_eq!(
        path.file_name().and_then(|name| name.to_str()),
        Some("overrides.sqlite")
    );
}
