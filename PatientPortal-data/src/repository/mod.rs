// Repository module structure
pub mod errors;
mod backend;
mod collections;
mod file;
mod in_memory;
#[cfg(feature = "sqlite")]
mod storage;

// Re-export commonly used types
pub use errors::RepositoryError;
pub use backend::{open_backend, KeyValueBackend, SharedBackend, APPOINTMENTS_KEY, READINGS_KEY};
pub use collections::{CollectionRepository, LoadedCollection};
pub use file::FileBackend;
pub use in_memory::InMemoryBackend;
#[cfg(feature = "sqlite")]
pub use storage::SqliteBackend;

// Test doubles, available to this crate's tests and to downstream crates with the mock feature
#[cfg(any(test, feature = "mock"))]
pub mod tests;
