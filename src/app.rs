use std::sync::Arc;

use anyhow::{anyhow, Context};
use dioxus::prelude::*;
use rfd::{FileDialog, MessageButtons, MessageDialog, MessageLevel};

use crate::infra::store::sqlite::SqliteStore;
use crate::platform::desktop::blocking::run_blocking;
use crate::ui::state::app_state::AppState;
use crate::usecase::ports::store::OverrideStore;
use crate::usecase::services::load_service::{parse_dataset, pretty_json, LoadService};
use crate::usecase::services::merge_service::MergeService;
use crate::usecase::services::table_service::TableService;
use crate::{default_data_path, default_db_path, fmt_int, fmt_money};

const CATEGORY_LABELS: [&str; 6] = [
    "Product Description",
    "Total Orders",
    "Success",
    "Initiated",
    "Purchase Initiated",
    "Failure",
];
const USER_LABELS: [&str; 2] = ["User", "Transaction Attempts"];

const CARD_STYLE: &str = "background: #fff; border: 1px solid #e1e4e8; border-radius: 10px; padding: 14px; box-shadow: 0 1px 3px rgba(0,0,0,0.06);";
const BUTTON_STYLE: &str = "border: 1px solid #bbb; background: #fff; padding: 5px 12px; border-radius: 6px; cursor: pointer; margin-right: 6px;";

#[derive(Clone, Debug, PartialEq)]
struct KpiTile {
    label: &'static str,
    value: String,
    note: String,
    tag: &'static str,
}

#[component]
fn BarChart(title: &'static str, entries: Vec<(String, f64)>) -> Element {
    let max = entries.iter().map(|(_, value)| *value).fold(0.0_f64, f64::max);

    rsx! {
        div {
            style: "{CARD_STYLE}",
            h3 { style: "margin: 0 0 10px 0; font-size: 15px;", "{title}" }
            if entries.is_empty() {
                p { style: "color: #888; margin: 0;", "No data" }
            }
            {entries.iter().map(|(label, value)| {
                let pct = if max > 0.0 { (value / max * 100.0).clamp(0.0, 100.0) } else { 0.0 };
                let value_label = fmt_int(*value);
                let label = label.clone();
                rsx!(
                    div {
                        style: "display: flex; align-items: center; gap: 8px; margin: 4px 0;",
                        span {
                            style: "flex: 0 0 180px; overflow: hidden; text-overflow: ellipsis; white-space: nowrap; font-size: 13px;",
                            title: "{label}",
                            "{label}"
                        }
                        div {
                            style: "flex: 1; background: #eef1f5; border-radius: 4px; height: 14px; overflow: hidden;",
                            div { style: "width: {pct}%; height: 100%; background: #4472c4;" }
                        }
                        span { style: "flex: 0 0 80px; text-align: right; font-size: 13px;", "{value_label}" }
                    }
                )
            })}
        }
    }
}

#[component]
fn ProportionList(title: &'static str, entries: Vec<(String, f64)>) -> Element {
    let total: f64 = entries.iter().map(|(_, value)| *value).sum();

    rsx! {
        div {
            style: "{CARD_STYLE}",
            h3 { style: "margin: 0 0 10px 0; font-size: 15px;", "{title}" }
            if entries.is_empty() {
                p { style: "color: #888; margin: 0;", "No data" }
            }
            {entries.iter().map(|(label, value)| {
                let pct = if total > 0.0 { value / total * 100.0 } else { 0.0 };
                let share = format!("{pct:.1}%");
                let value_label = fmt_int(*value);
                let label = label.clone();
                rsx!(
                    div {
                        style: "display: flex; align-items: center; gap: 8px; margin: 4px 0;",
                        span {
                            style: "flex: 0 0 160px; overflow: hidden; text-overflow: ellipsis; white-space: nowrap; font-size: 13px;",
                            "{label}"
                        }
                        div {
                            style: "flex: 1; background: #eef1f5; border-radius: 4px; height: 14px; overflow: hidden;",
                            div { style: "width: {pct}%; height: 100%; background: #70ad47;" }
                        }
                        span { style: "flex: 0 0 110px; text-align: right; font-size: 13px;", "{value_label} ({share})" }
                    }
                )
            })}
        }
    }
}

#[component]
fn EditableTable(labels: Vec<&'static str>, mut drafts: Signal<Vec<Vec<String>>>) -> Element {
    let rows_snapshot = drafts();

    rsx! {
        table {
            style: "border-collapse: collapse; width: 100%;",
            thead {
                tr {
                    {labels.iter().map(|label| rsx!(
                        th {
                            style: "border: 1px solid #ddd; padding: 6px; background: #f6f8fa; text-align: left; font-size: 13px;",
                            "{label}"
                        }
                    ))}
                }
            }
            tbody {
                {rows_snapshot.iter().enumerate().map(|(row_idx, cells)| rsx!(
                    tr {
                        {cells.iter().enumerate().map(|(col_idx, cell)| {
                            let cell_value = cell.clone();
                            rsx!(
                                td {
                                    style: "border: 1px solid #ddd; padding: 0;",
                                    input {
                                        style: "width: 100%; border: none; padding: 5px 6px; font-size: 13px; box-sizing: border-box;",
                                        value: "{cell_value}",
                                        oninput: move |event| {
                                            let mut grid = drafts.write();
                                            if let Some(row) = grid.get_mut(row_idx) {
                                                if let Some(slot) = row.get_mut(col_idx) {
                                                    *slot = event.value();
                                                }
                                            }
                                        },
                                    }
                                }
                            )
                        })}
                    }
                ))}
            }
        }
    }
}

#[component]
pub fn App() -> Element {
    let db_path = match default_db_path() {
        Ok(path) => path,
        Err(err) => {
            return rsx! {
                div {
                    p { "Cannot resolve local store path: {err}" }
                }
            };
        }
    };

    let AppState {
        mut base,
        mut json_editor,
        mut category_drafts,
        mut user_drafts,
        mut store_rev,
        mut busy,
        mut status,
        mut updated_at,
    } = AppState::new();

    let store = Arc::new(SqliteStore { db_path });
    let merge_service = Arc::new(MergeService::new(store.clone()));
    let table_service = Arc::new(TableService::new(store.clone()));
    let load_service = Arc::new(LoadService::new(default_data_path()));

    let store_for_init = store.clone();
    let load_service_for_init = load_service.clone();
    let load_service_for_reload = load_service.clone();
    let load_service_for_reset = load_service.clone();
    let merge_service_for_drafts = merge_service.clone();
    let merge_service_for_cats_export = merge_service.clone();
    let merge_service_for_users_export = merge_service.clone();
    let table_service_for_save = table_service.clone();
    let table_service_for_tables_reset = table_service.clone();
    let table_service_for_reset = table_service.clone();
    let table_service_for_cats_import = table_service.clone();
    let table_service_for_users_import = table_service.clone();
    let table_service_for_cats_export = table_service.clone();
    let table_service_for_users_export = table_service.clone();

    use_effect(move || {
        *busy.write() = true;
        if let Err(err) = run_blocking(|| {
            store_for_init
                .init()
                .map_err(|err| anyhow!(err.to_string()))
        }) {
            *status.write() = format!("Failed to initialise local store: {err}");
        }
        let dataset = run_blocking(|| load_service_for_init.load_base_or_fallback());
        json_editor.set(pretty_json(&dataset));
        base.set(dataset);
        *status.write() = "Dataset loaded".to_string();
        *busy.write() = false;
    });

    // Refresh table drafts from the effective dataset whenever the base is
    // replaced or the override store changes.
    use_effect(move || {
        let _ = store_rev();
        let snapshot = merge_service_for_drafts.effective(&base());
        category_drafts.set(snapshot.categories.iter().map(|row| row.to_cells()).collect());
        user_drafts.set(
            snapshot
                .users
                .attempts
                .iter()
                .map(|row| row.to_cells())
                .collect(),
        );
        updated_at.set(chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string());
    });

    let _ = store_rev();
    let effective = merge_service.effective(&base());
    let stats = effective.transaction_stats.clone();

    let kpis = vec![
        KpiTile {
            label: "Total Orders",
            value: fmt_int(stats.total_orders),
            note: "All attempts".to_string(),
            tag: "Volume",
        },
        KpiTile {
            label: "Total Order Value",
            value: fmt_money(stats.total_value_orders, &effective),
            note: "Gross value".to_string(),
            tag: "GMV",
        },
        KpiTile {
            label: "Successful Orders",
            value: fmt_int(stats.success_orders),
            note: format!("Success rate: {:.1}%", stats.success_rate()),
            tag: "Success",
        },
        KpiTile {
            label: "Successful Value",
            value: fmt_money(stats.success_value, &effective),
            note: "Value of successful orders".to_string(),
            tag: "Revenue",
        },
        KpiTile {
            label: "Avg Successful Order",
            value: fmt_money(stats.avg_success_value, &effective),
            note: "Average ticket".to_string(),
            tag: "AOV",
        },
        KpiTile {
            label: "Max Order Value",
            value: format!("{} {}", effective.currency_label(), fmt_int(stats.max_order_value)),
            note: "Highest single order".to_string(),
            tag: "Peak",
        },
        KpiTile {
            label: "Min Order Value",
            value: format!("{} {}", effective.currency_label(), fmt_int(stats.min_order_value)),
            note: "Lowest single order".to_string(),
            tag: "Low",
        },
        KpiTile {
            label: "Failure Orders",
            value: fmt_int(stats.failure_orders),
            note: format!("Failure rate: {:.1}%", stats.failure_rate()),
            tag: "Risk",
        },
    ];

    let payment_entries: Vec<(String, f64)> = effective
        .payment_status
        .iter()
        .map(|(status, count)| (status.clone(), *count))
        .collect();
    let txn_entries: Vec<(String, f64)> = effective
        .transaction_status
        .iter()
        .map(|(status, count)| (status.clone(), *count))
        .collect();
    let mut failure_entries: Vec<(String, f64)> = effective
        .failure_reasons
        .iter()
        .map(|entry| (entry.reason.clone(), entry.count))
        .collect();
    failure_entries.sort_by(|a, b| b.1.total_cmp(&a.1));
    let mut category_entries: Vec<(String, f64)> = effective
        .categories
        .iter()
        .map(|row| (row.product.clone(), row.total_orders))
        .collect();
    category_entries.sort_by(|a, b| b.1.total_cmp(&a.1));
    category_entries.truncate(10);
    let mut user_entries: Vec<(String, f64)> = effective
        .users
        .attempts
        .iter()
        .map(|row| (row.user.clone(), row.attempts))
        .collect();
    user_entries.sort_by(|a, b| b.1.total_cmp(&a.1));
    user_entries.truncate(10);

    let title = effective.title.clone();
    let period = effective.period.clone();
    let currency = effective.currency.clone();
    let updated_label = updated_at();
    let status_label = status();

    rsx! {
        div {
            style: "font-family: 'Segoe UI', sans-serif; background: #f3f5f8; min-height: 100vh; padding: 18px; color: #24292f;",

            div {
                style: "display: flex; justify-content: space-between; align-items: baseline; flex-wrap: wrap; gap: 8px; margin-bottom: 14px;",
                div {
                    h1 { style: "margin: 0; font-size: 22px;", "{title}" }
                    p { style: "margin: 4px 0 0 0; color: #57606a; font-size: 13px;",
                        "{period} · {currency}"
                    }
                }
                div {
                    style: "text-align: right; font-size: 12px; color: #57606a;",
                    p { style: "margin: 0;", "Updated: {updated_label}" }
                    p { style: "margin: 2px 0 0 0;",
                        "{status_label}"
                        if busy() {
                            span { " (working)" }
                        }
                    }
                }
            }

            div {
                style: "display: grid; grid-template-columns: repeat(auto-fill, minmax(210px, 1fr)); gap: 10px; margin-bottom: 16px;",
                {kpis.iter().map(|kpi| rsx!(
                    div {
                        style: "{CARD_STYLE}",
                        div { style: "color: #57606a; font-size: 12px;", "{kpi.label}" }
                        div { style: "font-size: 20px; font-weight: 600; margin: 4px 0;", "{kpi.value}" }
                        div { style: "color: #57606a; font-size: 12px;", "{kpi.note}" }
                        div { style: "display: inline-block; margin-top: 6px; padding: 1px 8px; border-radius: 10px; background: #eef4ff; color: #2d5fa8; font-size: 11px;", "{kpi.tag}" }
                    }
                ))}
            }

            div {
                style: "display: grid; grid-template-columns: repeat(auto-fit, minmax(340px, 1fr)); gap: 12px; margin-bottom: 16px;",
                ProportionList { title: "Payment Status", entries: payment_entries }
                BarChart { title: "Transaction Status", entries: txn_entries }
                BarChart { title: "Failure Reasons", entries: failure_entries }
                BarChart { title: "Top Categories by Total Orders", entries: category_entries }
                BarChart { title: "Top Users by Attempts", entries: user_entries }
            }

            div {
                style: "{CARD_STYLE} margin-bottom: 16px;",
                h3 { style: "margin: 0 0 10px 0; font-size: 15px;", "Base Dataset (JSON)" }
                textarea {
                    style: "width: 100%; min-height: 180px; font-family: monospace; font-size: 12px; border: 1px solid #ddd; border-radius: 6px; padding: 8px; box-sizing: border-box;",
                    value: "{json_editor}",
                    oninput: move |event| json_editor.set(event.value()),
                }
                div {
                    style: "margin-top: 8px;",
                    button {
                        style: "{BUTTON_STYLE}",
                        onclick: move |_| {
                            *busy.write() = true;
                            match run_blocking(|| load_service_for_reload.load_base()) {
                                Ok(dataset) => {
                                    json_editor.set(pretty_json(&dataset));
                                    base.set(dataset);
                                    *status.write() = "Reloaded base dataset".to_string();
                                }
                                Err(err) => {
                                    let _ = MessageDialog::new()
                                        .set_level(MessageLevel::Error)
                                        .set_title("Reload failed")
                                        .set_description(format!("{err:#}"))
                                        .set_buttons(MessageButtons::Ok)
                                        .show();
                                    *status.write() = "Could not reload the base dataset".to_string();
                                }
                            }
                            *busy.write() = false;
                        },
                        "Reload data.json"
                    }
                    button {
                        style: "{BUTTON_STYLE}",
                        onclick: move |_| {
                            match parse_dataset(&json_editor()) {
                                Ok(dataset) => {
                                    base.set(dataset);
                                    *status.write() = "Applied pasted JSON".to_string();
                                }
                                Err(err) => {
                                    let _ = MessageDialog::new()
                                        .set_level(MessageLevel::Error)
                                        .set_title("Invalid JSON")
                                        .set_description(format!("{err:#}"))
                                        .set_buttons(MessageButtons::Ok)
                                        .show();
                                }
                            }
                        },
                        "Apply JSON"
                    }
                    button {
                        style: "{BUTTON_STYLE}",
                        onclick: move |_| {
                            *busy.write() = true;
                            if let Err(err) = run_blocking(|| table_service_for_reset.reset_overrides()) {
                                *status.write() = format!("Reset failed: {err}");
                                *busy.write() = false;
                                return;
                            }
                            let dataset = run_blocking(|| load_service_for_reset.load_base_or_fallback());
                            json_editor.set(pretty_json(&dataset));
                            base.set(dataset);
                            *store_rev.write() += 1;
                            *status.write() = "Dashboard reset".to_string();
                            *busy.write() = false;
                        },
                        "Reset dashboard"
                    }
                }
            }

            div {
                style: "{CARD_STYLE} margin-bottom: 16px;",
                div {
                    style: "display: flex; justify-content: space-between; align-items: center; flex-wrap: wrap; gap: 8px; margin-bottom: 10px;",
                    h3 { style: "margin: 0; font-size: 15px;", "Categories" }
                    div {
                        button {
                            style: "{BUTTON_STYLE}",
                            onclick: move |_| {
                                let Some(file_path) = FileDialog::new()
                                    .add_filter("CSV", &["csv"])
                                    .pick_file()
                                else {
                                    return;
                                };
                                *busy.write() = true;
                                *status.write() = format!("Importing {}", file_path.display());
                                let import_result = run_blocking(|| {
                                    let text = std::fs::read_to_string(&file_path).with_context(|| {
                                        format!("failed to read csv: {}", file_path.display())
                                    })?;
                                    table_service_for_cats_import
                                        .import_categories_csv(&text)
                                        .map_err(|err| anyhow!(err.to_string()))
                                });
                                match import_result {
                                    Ok(count) => {
                                        *store_rev.write() += 1;
                                        *status.write() = format!("Imported {count} category rows");
                                    }
                                    Err(err) => {
                                        *status.write() = format!("Import failed: {err:#}");
                                    }
                                }
                                *busy.write() = false;
                            },
                            "Import CSV"
                        }
                        button {
                            style: "{BUTTON_STYLE}",
                            onclick: move |_| {
                                let Some(file_path) = FileDialog::new()
                                    .add_filter("CSV", &["csv"])
                                    .set_file_name("categories.csv")
                                    .save_file()
                                else {
                                    return;
                                };
                                let rows = merge_service_for_cats_export.effective(&base()).categories;
                                let export_result = run_blocking(|| {
                                    let text = table_service_for_cats_export.export_categories(&rows)?;
                                    std::fs::write(&file_path, text).with_context(|| {
                                        format!("failed to write csv: {}", file_path.display())
                                    })
                                });
                                match export_result {
                                    Ok(()) => {
                                        *status.write() = format!("Exported {}", file_path.display());
                                    }
                                    Err(err) => {
                                        *status.write() = format!("Export failed: {err:#}");
                                    }
                                }
                            },
                            "Export CSV"
                        }
                    }
                }
                EditableTable { labels: CATEGORY_LABELS.to_vec(), drafts: category_drafts }
            }

            div {
                style: "{CARD_STYLE} margin-bottom: 16px;",
                div {
                    style: "display: flex; justify-content: space-between; align-items: center; flex-wrap: wrap; gap: 8px; margin-bottom: 10px;",
                    h3 { style: "margin: 0; font-size: 15px;", "User Attempts" }
                    div {
                        button {
                            style: "{BUTTON_STYLE}",
                            onclick: move |_| {
                                let Some(file_path) = FileDialog::new()
                                    .add_filter("CSV", &["csv"])
                                    .pick_file()
                                else {
                                    return;
                                };
                                *busy.write() = true;
                                *status.write() = format!("Importing {}", file_path.display());
                                let import_result = run_blocking(|| {
                                    let text = std::fs::read_to_string(&file_path).with_context(|| {
                                        format!("failed to read csv: {}", file_path.display())
                                    })?;
                                    table_service_for_users_import
                                        .import_users_csv(&text)
                                        .map_err(|err| anyhow!(err.to_string()))
                                });
                                match import_result {
                                    Ok(count) => {
                                        *store_rev.write() += 1;
                                        *status.write() = format!("Imported {count} user rows");
                                    }
                                    Err(err) => {
                                        *status.write() = format!("Import failed: {err:#}");
                                    }
                                }
                                *busy.write() = false;
                            },
                            "Import CSV"
                        }
                        button {
                            style: "{BUTTON_STYLE}",
                            onclick: move |_| {
                                let Some(file_path) = FileDialog::new()
                                    .add_filter("CSV", &["csv"])
                                    .set_file_name("users.csv")
                                    .save_file()
                                else {
                                    return;
                                };
                                let rows = merge_service_for_users_export.effective(&base()).users.attempts;
                                let export_result = run_blocking(|| {
                                    let text = table_service_for_users_export.export_users(&rows)?;
                                    std::fs::write(&file_path, text).with_context(|| {
                                        format!("failed to write csv: {}", file_path.display())
                                    })
                                });
                                match export_result {
                                    Ok(()) => {
                                        *status.write() = format!("Exported {}", file_path.display());
                                    }
                                    Err(err) => {
                                        *status.write() = format!("Export failed: {err:#}");
                                    }
                                }
                            },
                            "Export CSV"
                        }
                    }
                }
                EditableTable { labels: USER_LABELS.to_vec(), drafts: user_drafts }
            }

            div {
                style: "margin-bottom: 24px;",
                button {
                    style: "{BUTTON_STYLE}",
                    onclick: move |_| {
                        let saved = run_blocking(|| {
                            table_service_for_save
                                .save_category_drafts(&category_drafts())
                                .and_then(|_| table_service_for_save.save_user_drafts(&user_drafts()))
                        });
                        match saved {
                            Ok(()) => {
                                *store_rev.write() += 1;
                                *status.write() = "Saved table edits to this profile".to_string();
                            }
                            Err(err) => {
                                *status.write() = format!("Save failed: {err}");
                            }
                        }
                    },
                    "Save table edits"
                }
                button {
                    style: "{BUTTON_STYLE}",
                    onclick: move |_| {
                        match run_blocking(|| table_service_for_tables_reset.reset_overrides()) {
                            Ok(()) => {
                                *store_rev.write() += 1;
                                *status.write() = "Cleared saved table edits".to_string();
                            }
                            Err(err) => {
                                *status.write() = format!("Reset failed: {err}");
                            }
                        }
                    },
                    "Reset table edits"
                }
            }
        }
    }
}
