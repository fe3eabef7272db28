use chrono::{DateTime, NaiveDate, NaiveTime, Timelike, Utc};
use patient_portal_data::models::{StoredAppointment, StoredReading};
use uuid::Uuid;

use crate::entities::appointment::{Appointment, AppointmentStatus, Modality};
use crate::entities::reading::{GlucoseUnit, Measurement, Reading, ReadingKind, WeightUnit};

// Conversion functions between domain entities and data models.
// They follow the pattern convert_to_[target_layer]_[model_name].

/// Parse a string ID to a UUID
pub fn parse_string_to_uuid(id: &str) -> Result<Uuid, String> {
    Uuid::parse_str(id).map_err(|_| format!("Invalid UUID format: {}", id))
}

/// Convert a stored record into a domain reading.
///
/// Fails when the type tag is unknown, a field the type needs is missing,
/// or the id or timestamp does not parse.
pub fn convert_to_domain_reading(stored: StoredReading) -> Result<Reading, String> {
    let id = parse_string_to_uuid(&stored.id)?;
    let timestamp = DateTime::parse_from_rfc3339(&stored.timestamp)
        .map_err(|_| format!("Invalid timestamp: {}", stored.timestamp))?
        .with_timezone(&Utc);

    let kind = ReadingKind::parse(&stored.reading_type)
        .ok_or_else(|| format!("Unknown reading type: {}", stored.reading_type))?;

    let measurement = match kind {
        ReadingKind::BloodPressure => match (stored.systolic, stored.diastolic) {
            (Some(systolic), Some(diastolic)) => Measurement::BloodPressure { systolic, diastolic },
            _ => return Err("Blood pressure reading without systolic and diastolic".to_string()),
        },
        ReadingKind::Glucose => {
            let value = finite_value(stored.value, "Glucose")?;
            let unit = match stored.unit.as_deref() {
                Some(label) => GlucoseUnit::parse(label).ok_or_else(|| format!("Unknown glucose unit: {}", label))?,
                None => GlucoseUnit::MmolL,
            };
            Measurement::Glucose { value, unit }
        }
        ReadingKind::Weight => {
            let value = finite_value(stored.value, "Weight")?;
            let unit = match stored.unit.as_deref() {
                Some(label) => WeightUnit::parse(label).ok_or_else(|| format!("Unknown weight unit: {}", label))?,
                None => WeightUnit::Kg,
            };
            Measurement::Weight { kg: unit.to_kg(value) }
        }
    };

    Ok(Reading {
        id,
        timestamp,
        note: stored.note,
        measurement,
    })
}

fn finite_value(value: Option<f64>, what: &str) -> Result<f64, String> {
    match value {
        Some(v) if v.is_finite() => Ok(v),
        Some(v) => Err(format!("{} reading with non-finite value {}", what, v)),
        None => Err(format!("{} reading without a value", what)),
    }
}

/// Convert a domain reading into its stored record
pub fn convert_to_data_reading(reading: &Reading) -> StoredReading {
    let (systolic, diastolic, value, unit) = match reading.measurement {
        Measurement::BloodPressure { systolic, diastolic } => (Some(systolic), Some(diastolic), None, None),
        Measurement::Glucose { value, unit } => (None, None, Some(value), Some(unit.label().to_string())),
        Measurement::Weight { kg } => (None, None, Some(kg), Some("kg".to_string())),
    };

    StoredReading {
        id: reading.id.to_string(),
        reading_type: reading.kind().as_str().to_string(),
        systolic,
        diastolic,
        value,
        unit,
        timestamp: reading.timestamp.to_rfc3339(),
        note: reading.note.clone(),
    }
}

/// Convert a stored record into a domain appointment
pub fn convert_to_domain_appointment(stored: StoredAppointment) -> Result<Appointment, String> {
    let id = parse_string_to_uuid(&stored.id)?;
    let date = NaiveDate::parse_from_str(&stored.date, "%Y-%m-%d")
        .map_err(|_| format!("Invalid appointment date: {}", stored.date))?;
    let time = NaiveTime::parse_from_str(&stored.time, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(&stored.time, "%H:%M:%S"))
        .map_err(|_| format!("Invalid appointment time: {}", stored.time))?;
    let modality =
        Modality::parse(&stored.modality).ok_or_else(|| format!("Unknown modality: {}", stored.modality))?;
    let status = AppointmentStatus::parse(&stored.status)
        .ok_or_else(|| format!("Unknown appointment status: {}", stored.status))?;

    Ok(Appointment {
        id,
        doctor_name: stored.doctor_name,
        specialty: stored.specialty,
        date,
        time,
        modality,
        notes: stored.notes,
        status,
    })
}

/// Convert a domain appointment into its stored record
pub fn convert_to_data_appointment(appointment: &Appointment) -> StoredAppointment {
    StoredAppointment {
        id: appointment.id.to_string(),
        doctor_name: appointment.doctor_name.clone(),
        specialty: appointment.specialty.clone(),
        date: appointment.date.format("%Y-%m-%d").to_string(),
        time: format_time(appointment.time),
        modality: appointment.modality.as_str().to_string(),
        notes: appointment.notes.clone(),
        status: appointment.status.as_str().to_string(),
    }
}

/// HH:MM, with seconds only when they are set
fn format_time(time: NaiveTime) -> String {
    if time.second() == 0 && time.nanosecond() == 0 {
        time.format("%H:%M").to_string()
    } else {
        time.format("%H:%M:%S").to_string()
    }
}
