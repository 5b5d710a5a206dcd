use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use directories::ProjectDirs;

mod app;
mod domain;
mod infra;
mod platform;
mod ui;
mod usecase;

#[cfg(test)]
mod tests;

use crate::app::App;
use crate::domain::entities::dataset::Dataset;

const DATA_FILE: &str = "data.json";

fn main() {
    env_logger::init();

    let webview_data_dir =
        default_webview_data_dir().expect("should resolve and create WebView2 data directory");

    dioxus::LaunchBuilder::desktop()
        .with_cfg(
            dioxus::desktop::Config::new()
                .with_window(
                    dioxus::desktop::WindowBuilder::new()
                        .with_title("Selfcare Performance Dashboard"),
                )
                .with_data_directory(webview_data_dir),
        )
        .launch(App);
}

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("com", "selfcare", "dashboard")
        .ok_or_else(|| anyhow!("unable to resolve data directory"))
}

pub fn default_db_path() -> Result<PathBuf> {
    Ok(project_dirs()?.data_local_dir().join("overrides.sqlite"))
}

pub fn default_data_path() -> PathBuf {
    PathBuf::from(DATA_FILE)
}

fn ensure_webview_data_dir(base_data_dir: &Path) -> Result<PathBuf> {
    let webview_data_dir = base_data_dir.join("webview2");
    std::fs::create_dir_all(&webview_data_dir).with_context(|| {
        format!(
            "failed to create webview dir: {}",
            webview_data_dir.display()
        )
    })?;
    Ok(webview_data_dir)
}

fn default_webview_data_dir() -> Result<PathBuf> {
    ensure_webview_data_dir(project_dirs()?.data_local_dir())
}

pub fn format_number_with_commas(value: f64, decimals: usize) -> String {
    let formatted = format!("{value:.decimals$}");
    let (sign, rest) = match formatted.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", formatted.as_str()),
    };
    let (int_part, frac_part) = match rest.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (rest, None),
    };

    let mut grouped = String::new();
    let digit_count = int_part.len();
    for (idx, ch) in int_part.chars().enumerate() {
        if idx > 0 && (digit_count - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    match frac_part {
        Some(frac_part) => format!("{sign}{grouped}.{frac_part}"),
        None => format!("{sign}{grouped}"),
    }
}

pub fn fmt_int(value: f64) -> String {
    format_number_with_commas(value, 0)
}

pub fn fmt_money(value: f64, dataset: &Dataset) -> String {
    format!(
        "{} {}",
        dataset.currency_label(),
        format_number_with_commas(value, 2)
    )
}
