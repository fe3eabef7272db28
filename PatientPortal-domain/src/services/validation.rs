use validator::{Validate, ValidationErrors};

use crate::entities::appointment::ScheduleAppointmentRequest;
use crate::entities::reading::{CreateGlucoseRequest, CreateReadingRequest, GlucoseUnit, NewMeasurement};
use crate::services::errors::StoreError;

/// Accepted glucose range in mg/dL
pub const GLUCOSE_MG_DL_RANGE: (f64, f64) = (20.0, 600.0);

/// Accepted glucose range in mmol/L
pub const GLUCOSE_MMOL_L_RANGE: (f64, f64) = (1.1, 33.3);

/// Validate a new reading before it touches the store
pub fn validate_reading_request(request: &CreateReadingRequest) -> Result<(), StoreError> {
    request.validate().map_err(to_store_error)?;

    match &request.measurement {
        NewMeasurement::BloodPressure(bp) => {
            bp.validate().map_err(to_store_error)?;
            if bp.systolic <= bp.diastolic {
                return Err(StoreError::Validation(
                    "Systolic pressure must be greater than diastolic pressure".to_string(),
                ));
            }
        }
        NewMeasurement::Glucose(glucose) => validate_glucose(glucose)?,
        NewMeasurement::Weight(weight) => {
            // NaN passes range checks
            if !weight.value.is_finite() {
                return Err(StoreError::Validation("value: weight must be a finite number".to_string()));
            }
            weight.validate().map_err(to_store_error)?;
        }
    }

    Ok(())
}

fn validate_glucose(glucose: &CreateGlucoseRequest) -> Result<(), StoreError> {
    if !glucose.value.is_finite() {
        return Err(StoreError::Validation("value: glucose must be a finite number".to_string()));
    }

    let (min, max) = match glucose.unit {
        GlucoseUnit::MgDl => GLUCOSE_MG_DL_RANGE,
        GlucoseUnit::MmolL => GLUCOSE_MMOL_L_RANGE,
    };
    if glucose.value < min || glucose.value > max {
        return Err(StoreError::Validation(format!(
            "value: Glucose must be between {} and {} {}",
            min,
            max,
            glucose.unit.label()
        )));
    }

    Ok(())
}

/// Validate an appointment booking
pub fn validate_appointment_request(request: &ScheduleAppointmentRequest) -> Result<(), StoreError> {
    request.validate().map_err(to_store_error)?;

    if request.doctor_name.trim().is_empty() {
        return Err(StoreError::Validation("doctor_name: Doctor name cannot be blank".to_string()));
    }
    if request.specialty.trim().is_empty() {
        return Err(StoreError::Validation("specialty: Specialty cannot be blank".to_string()));
    }

    Ok(())
}

/// Flatten validator errors into one message, `field: msg, msg; field: msg`
fn to_store_error(validation_errors: ValidationErrors) -> StoreError {
    let mut fields: Vec<String> = validation_errors
        .field_errors()
        .iter()
        .map(|(field, errors)| {
            let error_msgs: Vec<String> = errors
                .iter()
                .map(|err| match &err.message {
                    Some(msg) => msg.to_string(),
                    None => format!("Invalid {}", field),
                })
                .collect();
            format!("{}: {}", field, error_msgs.join(", "))
        })
        .collect();
    // HashMap order is unstable
    fields.sort();

    StoreError::Validation(fields.join("; "))
}
