use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::domain::entities::dataset::Dataset;

/// Loads the base dataset document from disk and parses pasted JSON.
pub struct LoadService {
    data_path: PathBuf,
}

impl LoadService {
    pub fn new(data_path: PathBuf) -> Self {
        Self { data_path }
    }

    pub fn load_base(&self) -> Result<Dataset> {
        let text = std::fs::read_to_string(&self.data_path)
            .with_context(|| format!("failed to read dataset: {}", self.data_path.display()))?;
        parse_dataset(&text)
    }

    /// Retrieval failure is never fatal: a minimal built-in dataset stands in
    /// when the document is missing or malformed.
    pub fn load_base_or_fallback(&self) -> Dataset {
        match self.load_base() {
            Ok(dataset) => {
                log::info!("loaded base dataset from {}", self.data_path.display());
                dataset
            }
            Err(err) => {
                log::warn!("using built-in fallback dataset: {err:#}");
                Dataset::fallback()
            }
        }
    }
}

pub fn parse_dataset(text: &str) -> Result<Dataset> {
    serde_json::from_str(text).context("invalid dataset JSON")
}

pub fn pretty_json(dataset: &Dataset) -> String {
    serde_json::to_string_pretty(dataset).unwrap_or_default()
}
