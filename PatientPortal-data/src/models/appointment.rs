use serde::{Deserialize, Serialize};

/// Storage model for an appointment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredAppointment {
    /// Unique identifier for the appointment
    pub id: String,

    /// Name of the doctor
    pub doctor_name: String,

    /// Doctor's specialty
    pub specialty: String,

    /// Appointment date (YYYY-MM-DD)
    pub date: String,

    /// Appointment time (HH:MM)
    pub time: String,

    /// in_person or video
    pub modality: String,

    /// Optional notes for the visit
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    /// scheduled, completed or cancelled
    pub status: String,
}
