// Domain entities and value objects
pub mod appointment;
pub mod classification;
pub mod conversions;
pub mod page;
pub mod reading;

// Re-export common types for easier imports
pub use appointment::{Appointment, AppointmentStatus, Modality, ScheduleAppointmentRequest};
pub use classification::{ClassificationResult, Severity, StatusColor};
pub use page::Page;
pub use reading::{
    CreateBloodPressureRequest, CreateGlucoseRequest, CreateReadingRequest, CreateWeightRequest, GlucoseUnit,
    Measurement, NewMeasurement, Reading, ReadingForm, ReadingKind, WeightUnit,
};
