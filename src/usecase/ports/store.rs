use serde::de::DeserializeOwned;
use serde::Serialize;

/// Fixed storage keys per table; the suffix encodes the blob schema version.
pub const CATEGORIES_KEY: &str = "selfcare.repo.categories.v1";
pub const USERS_KEY: &str = "selfcare.repo.users.v1";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    Message(String),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Message(message) => write!(f, "{message}"),
        }
    }
}

impl std::error::Error for StoreError {}

/// Key-value persistence for locally edited table rows. The desktop build
/// uses the SQLite implementation; tests swap in the in-memory one.
pub trait OverrideStore: Send + Sync {
    fn init(&self) -> Result<(), StoreError>;

    fn get_raw(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set_raw(&self, key: &str, value: &str) -> Result<(), StoreError>;
    fn clear(&self, key: &str) -> Result<(), StoreError>;
}

/// Returns the stored rows for `key`, or a copy of `fallback` when the key is
/// absent, unreadable, or holds a blob that no longer parses. Read failures
/// never surface to the caller.
pub fn load_rows<T>(store: &dyn OverrideStore, key: &str, fallback: &[T]) -> Vec<T>
where
    T: Clone + DeserializeOwned,
{
    match store.get_raw(key) {
        Ok(Some(blob)) => match serde_json::from_str(&blob) {
            Ok(rows) => rows,
            Err(err) => {
                log::warn!("discarding unparseable override for {key}: {err}");
                fallback.to_vec()
            }
        },
        Ok(None) => fallback.to_vec(),
        Err(err) => {
            log::warn!("override store read failed for {key}: {err}");
            fallback.to_vec()
        }
    }
}

/// Serializes `rows` and fully replaces any prior value under `key`.
pub fn store_rows<T>(store: &dyn OverrideStore, key: &str, rows: &[T]) -> Result<(), StoreError>
where
    T: Serialize,
{
    let blob =
        serde_json::to_string(rows).map_err(|err| StoreError::Message(err.to_string()))?;
    store.set_raw(key, &blob)
}
