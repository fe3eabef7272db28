//! Application configuration read from `PORTAL_*` environment variables

use std::env;

use patient_portal_data::database::{BackendConfig, DatabaseError};
use patient_portal_domain::services::DEFAULT_SERIES_WINDOW;

/// Default number of upcoming appointments shown
pub const DEFAULT_UPCOMING_LIMIT: usize = 3;

/// Everything a session needs to start
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Where the local state lives
    pub backend: BackendConfig,
    /// Points charted by `series` and `stats`
    pub series_window: usize,
    /// Appointments listed by `upcoming` and `summary`
    pub upcoming_limit: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            backend: BackendConfig::default(),
            series_window: DEFAULT_SERIES_WINDOW,
            upcoming_limit: DEFAULT_UPCOMING_LIMIT,
        }
    }
}

impl AppConfig {
    /// Read the configuration from the process environment
    pub fn from_env() -> Result<Self, DatabaseError> {
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Read the configuration from an arbitrary variable lookup.
    /// Unparsable numbers fall back to the defaults.
    pub fn from_vars<F>(lookup: F) -> Result<Self, DatabaseError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let backend = BackendConfig::from_vars(&lookup)?;

        let series_window = lookup("PORTAL_SERIES_WINDOW")
            .and_then(|s| s.trim().parse::<usize>().ok())
            .unwrap_or(DEFAULT_SERIES_WINDOW);

        let upcoming_limit = lookup("PORTAL_UPCOMING_LIMIT")
            .and_then(|s| s.trim().parse::<usize>().ok())
            .unwrap_or(DEFAULT_UPCOMING_LIMIT);

        Ok(Self {
            backend,
            series_window,
            upcoming_limit,
        })
    }
}
