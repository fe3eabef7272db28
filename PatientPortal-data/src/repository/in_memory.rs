use std::sync::{Arc, Mutex};
use std::collections::HashMap;
use async_trait::async_trait;
use tracing::debug;

use super::backend::KeyValueBackend;
use super::errors::RepositoryError;

/// In-memory storage backend
#[derive(Debug, Clone)]
pub struct InMemoryBackend {
    /// Stored documents by key
    documents: Arc<Mutex<HashMap<String, String>>>,
}

impl Default for InMemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryBackend {
    /// Create a new, empty in-memory backend
    pub fn new() -> Self {
        Self {
            documents: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Create a backend pre-seeded with a document, e.g. legacy or corrupted state
    pub fn with_document(self, key: &str, value: &str) -> Self {
        if let Ok(mut documents) = self.documents.lock() {
            documents.insert(key.to_string(), value.to_string());
        }
        self
    }

    /// Number of stored documents
    pub fn len(&self) -> usize {
        self.documents.lock().map(|d| d.len()).unwrap_or(0)
    }

    /// Whether nothing has been stored yet
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl KeyValueBackend for InMemoryBackend {
    async fn load(&self, key: &str) -> Result<Option<String>, RepositoryError> {
        let documents = self.documents.lock()?;
        Ok(documents.get(key).cloned())
    }

    async fn save(&self, key: &str, value: &str) -> Result<(), RepositoryError> {
        debug!("Saving {} bytes under '{}' in memory", value.len(), key);
        let mut documents = self.documents.lock()?;
        documents.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
