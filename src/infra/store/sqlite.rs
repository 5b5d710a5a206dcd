use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};

use crate::usecase::ports::store::{OverrideStore, StoreError};

pub struct SqliteStore {
    pub db_path: PathBuf,
}

fn open_connection(db_path: &Path) -> Result<Connection> {
    let conn = Connection::open(db_path)
        .with_context(|| format!("failed to open db: {}", db_path.display()))?;
    Ok(conn)
}

fn init_db(db_path: &Path) -> Result<()> {
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create parent dir: {}", parent.display()))?;
    }

    let conn = open_connection(db_path)?;

    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS override_blob (
            key       TEXT PRIMARY KEY,
            value     TEXT NOT NULL,
            saved_at  TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        );
        ",
    )
    .context("failed to initialize schema")?;

    Ok(())
}

fn get_value(db_path: &Path, key: &str) -> Result<Option<String>> {
    let conn = open_connection(db_path)?;
    conn.query_row(
        "SELECT value FROM override_blob WHERE key = ?1",
        params![key],
        |row| row.get(0),
    )
    .optional()
    .with_context(|| format!("failed to read override: {key}"))
}

fn set_value(db_path: &Path, key: &str, value: &str) -> Result<()> {
    let conn = open_connection(db_path)?;
    let saved_at = chrono::Local::now().to_rfc3339();
    conn.execute(
        "INSERT INTO override_blob(key, value, saved_at) VALUES (?1, ?2, ?3)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value, saved_at = excluded.saved_at",
        params![key, value, saved_at],
    )
    .with_context(|| format!("failed to store override: {key}"))?;
    Ok(())
}

fn clear_value(db_path: &Path, key: &str) -> Result<()> {
    let conn = open_connection(db_path)?;
    conn.execute("DELETE FROM override_blob WHERE key = ?1", params![key])
        .with_context(|| format!("failed to clear override: {key}"))?;
    Ok(())
}

impl OverrideStore for SqliteStore {
    fn init(&self) -> Result<(), StoreError> {
        init_db(&self.db_path).map_err(|err| StoreError::Message(err.to_string()))
    }

    fn get_raw(&self, key: &str) -> Result<Option<String>, StoreError> {
        get_value(&self.db_path, key).map_err(|err| StoreError::Message(err.to_string()))
    }

    fn set_raw(&self, key: &str, value: &str) -> Result<(), StoreError> {
        set_value(&self.db_path, key, value).map_err(|err| StoreError::Message(err.to_string()))
    }

    fn clear(&self, key: &str) -> Result<(), StoreError> {
        clear_value(&self.db_path, key).map_err(|err| StoreError::Message(err.to_string()))
    }
}
