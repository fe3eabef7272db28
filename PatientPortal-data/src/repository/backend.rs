use std::sync::Arc;
use async_trait::async_trait;
use tracing::info;

use crate::database::{BackendConfig, BackendType};
use super::errors::RepositoryError;
use super::file::FileBackend;
use super::in_memory::InMemoryBackend;

/// Key of the persisted reading collection
pub const READINGS_KEY: &str = "readings";

/// Key of the persisted appointment collection
pub const APPOINTMENTS_KEY: &str = "appointments";

/// Durable key-value storage for whole JSON documents.
///
/// `save` overwrites the previous value for the key entirely; there is no
/// append or diff operation.
#[async_trait]
pub trait KeyValueBackend: Send + Sync {
    /// Read the document stored under `key`, `None` if nothing was ever saved
    async fn load(&self, key: &str) -> Result<Option<String>, RepositoryError>;

    /// Replace the document stored under `key`
    async fn save(&self, key: &str, value: &str) -> Result<(), RepositoryError>;
}

#[async_trait]
impl<T: KeyValueBackend + ?Sized> KeyValueBackend for Arc<T> {
    async fn load(&self, key: &str) -> Result<Option<String>, RepositoryError> {
        (**self).load(key).await
    }

    async fn save(&self, key: &str, value: &str) -> Result<(), RepositoryError> {
        (**self).save(key, value).await
    }
}

#[async_trait]
impl<T: KeyValueBackend + ?Sized> KeyValueBackend for Box<T> {
    async fn load(&self, key: &str) -> Result<Option<String>, RepositoryError> {
        (**self).load(key).await
    }

    async fn save(&self, key: &str, value: &str) -> Result<(), RepositoryError> {
        (**self).save(key, value).await
    }
}

/// Shared handle to whichever backend the configuration selected
pub type SharedBackend = Arc<dyn KeyValueBackend>;

/// Open the backend described by `config`
pub fn open_backend(config: &BackendConfig) -> Result<SharedBackend, RepositoryError> {
    match config.backend_type {
        BackendType::Memory => {
            info!("Using in-memory storage; state is discarded on exit");
            Ok(Arc::new(InMemoryBackend::new()))
        }
        BackendType::File => {
            info!("Using JSON file storage in {}", config.data_dir.display());
            Ok(Arc::new(FileBackend::new(&config.data_dir)))
        }
        #[cfg(feature = "sqlite")]
        BackendType::Sqlite => {
            info!("Using SQLite storage at {}", config.sqlite_path.display());
            let backend = super::storage::SqliteBackend::open(&config.sqlite_path, config.pool_size)?;
            Ok(Arc::new(backend))
        }
    }
}

/// Reject keys that could escape a directory or table namespace
pub(crate) fn check_key(key: &str) -> Result<(), RepositoryError> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(RepositoryError::InvalidKey(key.to_string()))
    }
}
