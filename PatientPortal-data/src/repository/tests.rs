//! Test doubles for the storage backends

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use async_trait::async_trait;

use super::backend::KeyValueBackend;
use super::errors::RepositoryError;
use super::in_memory::InMemoryBackend;

/// In-memory backend whose writes can be switched to fail
#[derive(Debug, Default)]
pub struct FailingBackend {
    inner: InMemoryBackend,
    fail_loads: AtomicBool,
    fail_saves: AtomicBool,
    save_attempts: AtomicUsize,
}

impl FailingBackend {
    /// A backend that starts out healthy
    pub fn new() -> Self {
        Self::default()
    }

    /// A backend whose every save fails
    pub fn failing_saves() -> Self {
        let backend = Self::new();
        backend.set_fail_saves(true);
        backend
    }

    /// A backend whose every load fails
    pub fn failing_loads() -> Self {
        let backend = Self::new();
        backend.fail_loads.store(true, Ordering::SeqCst);
        backend
    }

    /// Toggle save failures
    pub fn set_fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    /// Number of save calls, successful or not
    pub fn save_attempts(&self) -> usize {
        self.save_attempts.load(Ordering::SeqCst)
    }

    /// Documents that actually reached storage
    pub fn inner(&self) -> &InMemoryBackend {
        &self.inner
    }
}

#[async_trait]
impl KeyValueBackend for FailingBackend {
    async fn load(&self, key: &str) -> Result<Option<String>, RepositoryError> {
        if self.fail_loads.load(Ordering::SeqCst) {
            return Err(RepositoryError::Unavailable(format!("load of '{}' refused", key)));
        }
        self.inner.load(key).await
    }

    async fn save(&self, key: &str, value: &str) -> Result<(), RepositoryError> {
        self.save_attempts.fetch_add(1, Ordering::SeqCst);
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(RepositoryError::Unavailable(format!("save of '{}' refused", key)));
        }
        self.inner.save(key, value).await
    }
}
