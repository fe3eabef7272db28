//! One user session: the store opened on the configured backend, and the
//! dispatch of CLI commands onto it

use anyhow::Context;
use chrono::Utc;
use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{info, instrument};

use patient_portal_data::repository::{open_backend, SharedBackend};
use patient_portal_domain::entities::{
    ClassificationResult, ReadingForm, ReadingKind, ScheduleAppointmentRequest,
};
use patient_portal_domain::services::{classify_reading, classify_weight_change, ReadingStore, StoreError};

use crate::cli::Command;
use crate::config::AppConfig;

/// Errors a command can end with
#[derive(Debug, Error)]
pub enum CommandError {
    /// The store refused or only partly applied the change
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Output could not be rendered
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CommandError {
    /// Machine-readable error code
    pub fn code(&self) -> &'static str {
        match self {
            CommandError::Store(StoreError::Validation(_)) => "validation_error",
            CommandError::Store(StoreError::NotFound(_)) => "not_found",
            CommandError::Store(StoreError::InvalidTransition { .. }) => "invalid_transition",
            CommandError::Store(StoreError::NotPersisted { .. }) => "not_persisted",
            CommandError::Store(StoreError::Persistence(_)) => "persistence_error",
            CommandError::Serialization(_) => "internal_error",
        }
    }

    /// Process exit status for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CommandError::Store(StoreError::Validation(_)) => 2,
            CommandError::Store(StoreError::NotFound(_)) => 3,
            CommandError::Store(StoreError::InvalidTransition { .. }) => 4,
            _ => 1,
        }
    }
}

/// Error body printed on stdout when a command fails
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error code, see [`CommandError::code`]
    pub error: String,

    /// Human-readable message
    pub message: String,

    /// Extra detail, e.g. the id of a change kept in memory only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl From<&CommandError> for ErrorResponse {
    fn from(err: &CommandError) -> Self {
        let details = match err {
            CommandError::Store(StoreError::NotPersisted { id, .. }) => Some(json!({ "id": id, "applied": true })),
            _ => None,
        };
        Self {
            error: err.code().to_string(),
            message: err.to_string(),
            details,
        }
    }
}

#[derive(Serialize)]
struct ClassifiedReading<'a> {
    reading: &'a patient_portal_domain::entities::Reading,
    classification: ClassificationResult,
}

/// A store bound to the configured backend
pub struct Session {
    config: AppConfig,
    store: ReadingStore<SharedBackend>,
}

impl Session {
    /// Open the configured backend and load the stored state
    pub async fn open(config: AppConfig) -> anyhow::Result<Self> {
        let backend = open_backend(&config.backend).context("Failed to open the storage backend")?;
        Ok(Self::with_backend(config, backend).await)
    }

    /// Load the stored state from an already opened backend
    pub async fn with_backend(config: AppConfig, backend: SharedBackend) -> Self {
        let store = ReadingStore::load(backend).await;
        info!("Session ready with {} readings", store.readings().len());
        Self { config, store }
    }

    /// The session's store
    pub fn store(&self) -> &ReadingStore<SharedBackend> {
        &self.store
    }

    /// Run one command and return its JSON output
    #[instrument(skip(self))]
    pub async fn run(&mut self, command: Command) -> Result<Value, CommandError> {
        let output = match command {
            Command::AddBp {
                systolic,
                diastolic,
                at,
                note,
            } => {
                let form = ReadingForm {
                    systolic: Some(systolic),
                    diastolic: Some(diastolic),
                    timestamp: at,
                    note,
                    ..ReadingForm::new(ReadingKind::BloodPressure)
                };
                self.add(form).await?
            }
            Command::AddGlucose { value, unit, at, note } => {
                let form = ReadingForm {
                    value: Some(value),
                    unit,
                    timestamp: at,
                    note,
                    ..ReadingForm::new(ReadingKind::Glucose)
                };
                self.add(form).await?
            }
            Command::AddWeight { value, unit, at, note } => {
                let form = ReadingForm {
                    value: Some(value),
                    unit,
                    timestamp: at,
                    note,
                    ..ReadingForm::new(ReadingKind::Weight)
                };
                self.add(form).await?
            }
            Command::Remove { id } => {
                let removed = self.store.remove(id).await?;
                json!({ "removed": removed })
            }
            Command::List { kind, page, size } => match page {
                Some(page) => serde_json::to_value(self.store.page(kind, page, size))?,
                None => serde_json::to_value(self.store.list(kind))?,
            },
            Command::Latest { kind } => match self.store.latest(kind) {
                Some(reading) => serde_json::to_value(ClassifiedReading {
                    reading,
                    classification: classify_reading(reading),
                })?,
                None => json!({ "reading": null, "classification": ClassificationResult::no_data() }),
            },
            Command::Delta { kind } => {
                let delta = self.store.trends().delta_of(kind);
                let classification = match kind {
                    ReadingKind::Weight => Some(classify_weight_change(delta)),
                    _ => None,
                };
                json!({
                    "kind": kind,
                    "unit": kind.canonical_unit(),
                    "delta": delta,
                    "classification": classification,
                })
            }
            Command::Series { kind, window } => {
                let window = window.unwrap_or(self.config.series_window);
                serde_json::to_value(self.store.trends().series_for(kind, window))?
            }
            Command::Stats { kind, window } => {
                let window = window.unwrap_or(self.config.series_window);
                serde_json::to_value(self.store.trends().statistics(kind, window))?
            }
            Command::Book {
                doctor,
                specialty,
                date,
                time,
                modality,
                notes,
            } => {
                let appointment = self
                    .store
                    .schedule(ScheduleAppointmentRequest {
                        doctor_name: doctor,
                        specialty,
                        date,
                        time,
                        modality,
                        notes,
                    })
                    .await?;
                serde_json::to_value(appointment)?
            }
            Command::Complete { id } => serde_json::to_value(self.store.complete(id).await?)?,
            Command::Cancel { id } => serde_json::to_value(self.store.cancel(id).await?)?,
            Command::Upcoming { limit, today } => {
                let limit = limit.unwrap_or(self.config.upcoming_limit);
                let today = today.unwrap_or_else(|| Utc::now().date_naive());
                serde_json::to_value(self.store.trends().upcoming_appointments(limit, today))?
            }
            Command::Summary { now } => {
                let now = now.unwrap_or_else(Utc::now);
                serde_json::to_value(self.store.summary(now, self.config.upcoming_limit))?
            }
        };

        Ok(output)
    }

    async fn add(&mut self, form: ReadingForm) -> Result<Value, CommandError> {
        let reading = self.store.append_form(&form).await?;
        Ok(serde_json::to_value(ClassifiedReading {
            classification: classify_reading(&reading),
            reading: &reading,
        })?)
    }
}
