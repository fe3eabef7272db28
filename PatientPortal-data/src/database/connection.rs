//! Backend configuration and SQLite connection management
//!
//! The local state can live in one of three places:
//! - memory (lost on exit, used by tests and demo sessions)
//! - JSON files in a data directory (default)
//! - a SQLite key-value table (optional `sqlite` feature)

use std::env;
use std::path::PathBuf;
#[cfg(feature = "sqlite")]
use std::sync::Arc;
use tracing::info;

use super::DatabaseError;

/// Default directory for JSON state files
pub const DEFAULT_DATA_DIR: &str = "./data";

/// Default SQLite file name inside the data directory
pub const DEFAULT_SQLITE_FILE: &str = "portal.db";

/// Default SQLite connection pool size
pub const DEFAULT_POOL_SIZE: u32 = 4;

/// Supported storage backends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendType {
    /// Process memory only
    Memory,
    /// One JSON file per collection
    File,
    /// SQLite key-value table
    #[cfg(feature = "sqlite")]
    Sqlite,
}

impl BackendType {
    /// Convert from string to backend type
    pub fn parse(s: &str) -> Result<Self, DatabaseError> {
        match s.trim().to_lowercase().as_str() {
            "memory" | "in-memory" => Ok(BackendType::Memory),
            "file" | "json" => Ok(BackendType::File),
            #[cfg(feature = "sqlite")]
            "sqlite" => Ok(BackendType::Sqlite),
            _ => Err(DatabaseError::UnsupportedBackend(s.to_string())),
        }
    }
}

/// Storage backend configuration
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Which backend to open
    pub backend_type: BackendType,
    /// Directory holding the JSON state files
    pub data_dir: PathBuf,
    /// Path to the SQLite database file
    pub sqlite_path: PathBuf,
    /// SQLite connection pool size
    pub pool_size: u32,
}

impl Default for BackendConfig {
    fn default() -> Self {
        let data_dir = PathBuf::from(DEFAULT_DATA_DIR);
        Self {
            backend_type: BackendType::File,
            sqlite_path: data_dir.join(DEFAULT_SQLITE_FILE),
            data_dir,
            pool_size: DEFAULT_POOL_SIZE,
        }
    }
}

impl BackendConfig {
    /// Create a configuration from `PORTAL_*` environment variables
    pub fn from_env() -> Result<Self, DatabaseError> {
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Create a configuration from an arbitrary variable lookup
    pub fn from_vars<F>(lookup: F) -> Result<Self, DatabaseError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let backend_type = match lookup("PORTAL_STORE_BACKEND") {
            Some(value) => BackendType::parse(&value)?,
            None => BackendType::File,
        };

        let data_dir = lookup("PORTAL_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));

        let sqlite_path = lookup("PORTAL_SQLITE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| data_dir.join(DEFAULT_SQLITE_FILE));

        let pool_size = lookup("PORTAL_POOL_SIZE")
            .and_then(|s| s.parse::<u32>().ok())
            .filter(|size| *size > 0)
            .unwrap_or(DEFAULT_POOL_SIZE);

        info!(
            "Storage configuration: backend={:?}, data_dir={}, pool_size={}",
            backend_type,
            data_dir.display(),
            pool_size
        );

        Ok(BackendConfig {
            backend_type,
            data_dir,
            sqlite_path,
            pool_size,
        })
    }
}

/// Shared SQLite connection pool
#[cfg(feature = "sqlite")]
pub type SqlitePool = Arc<r2d2::Pool<r2d2_sqlite::SqliteConnectionManager>>;

/// Create a SQLite connection pool for a database file and run migrations
#[cfg(feature = "sqlite")]
pub fn create_sqlite_pool(path: &std::path::Path, pool_size: u32) -> Result<SqlitePool, DatabaseError> {
    use rusqlite::OpenFlags;

    info!("Initializing SQLite database at: {}", path.display());

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            info!("Creating parent directory: {:?}", parent);
            std::fs::create_dir_all(parent)
                .map_err(|e| DatabaseError::ConnectionError(format!("cannot create {:?}: {}", parent, e)))?;
        }
    }

    let manager = r2d2_sqlite::SqliteConnectionManager::file(path)
        .with_flags(OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE);

    let pool = r2d2::Pool::builder()
        .max_size(pool_size)
        .connection_timeout(std::time::Duration::from_secs(30))
        .build(manager)
        .map_err(|e| DatabaseError::ConnectionError(e.to_string()))?;

    migrate(&pool)?;
    info!("SQLite connection pool created successfully");
    Ok(Arc::new(pool))
}

/// Create a single-connection in-memory SQLite pool
///
/// Every in-memory connection is a separate database, so the pool is capped at one.
#[cfg(feature = "sqlite")]
pub fn create_in_memory_sqlite_pool() -> Result<SqlitePool, DatabaseError> {
    info!("Initializing in-memory SQLite database");

    let manager = r2d2_sqlite::SqliteConnectionManager::memory();
    let pool = r2d2::Pool::builder()
        .max_size(1)
        .build(manager)
        .map_err(|e| DatabaseError::ConnectionError(e.to_string()))?;

    migrate(&pool)?;
    Ok(Arc::new(pool))
}

#[cfg(feature = "sqlite")]
fn migrate(pool: &r2d2::Pool<r2d2_sqlite::SqliteConnectionManager>) -> Result<(), DatabaseError> {
    let conn = pool
        .get()
        .map_err(|e| DatabaseError::ConnectionError(e.to_string()))?;
    super::migrations::run_sqlite_migrations(&conn).map_err(DatabaseError::MigrationError)
}
