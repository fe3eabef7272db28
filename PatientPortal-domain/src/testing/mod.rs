// Testing utilities and fixtures for the domain layer
// This module is only available when the "mock" feature is enabled

// Re-export the failing backend from the data layer
pub use patient_portal_data::repository::tests::FailingBackend;

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use uuid::Uuid;

use crate::entities::appointment::{Appointment, AppointmentStatus, Modality, ScheduleAppointmentRequest};
use crate::entities::reading::{GlucoseUnit, Measurement, Reading};

/// A blood pressure reading taken at `timestamp`
pub fn blood_pressure_at(systolic: u16, diastolic: u16, timestamp: DateTime<Utc>) -> Reading {
    reading_at(Measurement::BloodPressure { systolic, diastolic }, timestamp)
}

/// A glucose reading in mmol/L taken at `timestamp`
pub fn glucose_at(value: f64, timestamp: DateTime<Utc>) -> Reading {
    reading_at(
        Measurement::Glucose {
            value,
            unit: GlucoseUnit::MmolL,
        },
        timestamp,
    )
}

/// A weight reading in kilograms taken at `timestamp`
pub fn weight_at(kg: f64, timestamp: DateTime<Utc>) -> Reading {
    reading_at(Measurement::Weight { kg }, timestamp)
}

fn reading_at(measurement: Measurement, timestamp: DateTime<Utc>) -> Reading {
    Reading {
        id: Uuid::new_v4(),
        timestamp,
        note: None,
        measurement,
    }
}

/// A booking request for 09:00 in person on `date`
pub fn booking_on(doctor_name: &str, date: NaiveDate) -> ScheduleAppointmentRequest {
    ScheduleAppointmentRequest {
        doctor_name: doctor_name.to_string(),
        specialty: "General Practice".to_string(),
        date,
        time: nine_am(),
        modality: Modality::InPerson,
        notes: None,
    }
}

/// A scheduled appointment on `date`
pub fn appointment_on(doctor_name: &str, date: NaiveDate) -> Appointment {
    Appointment {
        id: Uuid::new_v4(),
        doctor_name: doctor_name.to_string(),
        specialty: "General Practice".to_string(),
        date,
        time: nine_am(),
        modality: Modality::InPerson,
        notes: None,
        status: AppointmentStatus::Scheduled,
    }
}

fn nine_am() -> NaiveTime {
    NaiveTime::from_hms_opt(9, 0, 0).expect("09:00 is a valid time")
}

/// A week of mixed readings ending at `now`, one of each type per day
pub fn sample_week(now: DateTime<Utc>) -> Vec<Reading> {
    (0..7)
        .rev()
        .flat_map(|days_ago| {
            let timestamp = now - Duration::days(days_ago);
            let step = days_ago as f64;
            [
                blood_pressure_at(118 + days_ago as u16, 76, timestamp),
                glucose_at(5.2 + step / 10.0, timestamp),
                weight_at(72.0 + step / 2.0, timestamp),
            ]
        })
        .collect()
}
