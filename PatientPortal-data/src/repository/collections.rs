use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use super::backend::KeyValueBackend;
use super::errors::RepositoryError;

/// Result of reading a persisted collection
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedCollection<T> {
    /// Records that decoded successfully, in stored order
    pub items: Vec<T>,
    /// Number of array entries that could not be decoded
    pub skipped: usize,
}

impl<T> Default for LoadedCollection<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            skipped: 0,
        }
    }
}

/// Reads and writes whole collections as JSON arrays through a backend
#[derive(Debug, Clone)]
pub struct CollectionRepository<B> {
    backend: B,
}

impl<B: KeyValueBackend> CollectionRepository<B> {
    /// Wrap a backend
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// The underlying backend
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Load the collection stored under `key`.
    ///
    /// A missing document is an empty collection. A document that is not a
    /// JSON array is an error. Array entries that do not decode as `T` are
    /// skipped and counted.
    pub async fn load_collection<T: DeserializeOwned>(
        &self,
        key: &str,
    ) -> Result<LoadedCollection<T>, RepositoryError> {
        let raw = match self.backend.load(key).await? {
            Some(raw) => raw,
            None => {
                debug!("No persisted '{}' collection", key);
                return Ok(LoadedCollection::default());
            }
        };

        let entries = match serde_json::from_str::<Value>(&raw)? {
            Value::Array(entries) => entries,
            other => {
                return Err(RepositoryError::Malformed {
                    key: key.to_string(),
                    reason: format!("expected a JSON array, found {}", json_kind(&other)),
                })
            }
        };

        let mut loaded = LoadedCollection::default();
        for (index, entry) in entries.into_iter().enumerate() {
            match serde_json::from_value::<T>(entry) {
                Ok(item) => loaded.items.push(item),
                Err(e) => {
                    warn!("Skipping entry {} of '{}': {}", index, key, e);
                    loaded.skipped += 1;
                }
            }
        }

        debug!("Loaded {} records from '{}'", loaded.items.len(), key);
        Ok(loaded)
    }

    /// Overwrite the collection stored under `key`
    pub async fn save_collection<T: Serialize + Sync>(
        &self,
        key: &str,
        items: &[T],
    ) -> Result<(), RepositoryError> {
        let raw = serde_json::to_string(items)?;
        self.backend.save(key, &raw).await?;
        debug!("Saved {} records to '{}'", items.len(), key);
        Ok(())
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
