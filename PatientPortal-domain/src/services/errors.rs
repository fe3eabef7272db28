use patient_portal_data::repository::RepositoryError;
use thiserror::Error;
use uuid::Uuid;

use crate::entities::appointment::AppointmentStatus;

/// Reading store errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// Missing, non-numeric or out-of-range input; nothing was changed
    #[error("Validation error: {0}")]
    Validation(String),

    /// No reading or appointment with this id
    #[error("Not found: {0}")]
    NotFound(String),

    /// Appointment status change that is not scheduled -> completed/cancelled
    #[error("Cannot move appointment {id} from {from} to {to}")]
    InvalidTransition {
        id: Uuid,
        from: AppointmentStatus,
        to: AppointmentStatus,
    },

    /// The change to `id` is kept in memory but could not be written
    #[error("Change to {id} was applied but not persisted: {source}")]
    NotPersisted {
        id: Uuid,
        #[source]
        source: RepositoryError,
    },

    /// Writing the collections failed
    #[error("Persistence error: {0}")]
    Persistence(#[from] RepositoryError),
}

impl StoreError {
    /// Whether the in-memory state was changed despite the error
    pub fn is_applied(&self) -> bool {
        matches!(self, StoreError::NotPersisted { .. })
    }
}
