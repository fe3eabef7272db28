use crate::entities::classification::{ClassificationResult, Severity, StatusColor};
use crate::entities::reading::{GlucoseUnit, Measurement, Reading};

/// Healthy blood pressure target
pub const BLOOD_PRESSURE_TARGET: &str = "< 120/80 mmHg";

/// Healthy fasting glucose target
pub const GLUCOSE_TARGET: &str = "4.0-5.9 mmol/L";

/// A guideline band: a value qualifies when it is below every upper bound
struct Band {
    systolic_below: u16,
    diastolic_below: u16,
    label: &'static str,
    severity: Severity,
    color: StatusColor,
    description: &'static str,
}

// Checked in order, most benign first
const BLOOD_PRESSURE_BANDS: [Band; 4] = [
    Band {
        systolic_below: 120,
        diastolic_below: 80,
        label: "Normal",
        severity: Severity::Normal,
        color: StatusColor::Green,
        description: "Your blood pressure is in the healthy range.",
    },
    Band {
        systolic_below: 135,
        diastolic_below: 85,
        label: "High-Normal",
        severity: Severity::Elevated,
        color: StatusColor::Yellow,
        description: "Slightly above optimal. Keep an eye on salt, exercise and stress.",
    },
    Band {
        systolic_below: 150,
        diastolic_below: 95,
        label: "Stage 1",
        severity: Severity::High,
        color: StatusColor::Orange,
        description: "Stage 1 hypertension. Discuss lifestyle changes with your doctor.",
    },
    Band {
        systolic_below: 180,
        diastolic_below: 110,
        label: "Stage 2",
        severity: Severity::VeryHigh,
        color: StatusColor::Red,
        description: "Stage 2 hypertension. Contact your doctor about treatment.",
    },
];

/// Classify a blood pressure pair. Either value missing gives "No data".
pub fn classify_blood_pressure(systolic: Option<u16>, diastolic: Option<u16>) -> ClassificationResult {
    let (systolic, diastolic) = match (systolic, diastolic) {
        (Some(s), Some(d)) => (s, d),
        _ => return ClassificationResult::no_data(),
    };

    let matched = BLOOD_PRESSURE_BANDS
        .iter()
        .find(|band| systolic < band.systolic_below && diastolic < band.diastolic_below);

    match matched {
        Some(band) => ClassificationResult {
            label: band.label.to_string(),
            severity: Some(band.severity),
            color: band.color,
            description: Some(band.description.to_string()),
            target_range: Some(BLOOD_PRESSURE_TARGET.to_string()),
            urgent: false,
        },
        None => ClassificationResult {
            label: "Stage 3 (severe)".to_string(),
            severity: Some(Severity::Critical),
            color: StatusColor::DarkRed,
            description: Some("Severe hypertension. Seek medical attention promptly.".to_string()),
            target_range: Some(BLOOD_PRESSURE_TARGET.to_string()),
            urgent: true,
        },
    }
}

/// Classify a glucose value given in `unit`. Values are converted to
/// mmol/L before banding. Missing, negative or non-finite values give
/// "No data".
pub fn classify_glucose(value: Option<f64>, unit: GlucoseUnit) -> ClassificationResult {
    let mmol = match value {
        Some(v) if v.is_finite() && v >= 0.0 => unit.to_mmol(v),
        _ => return ClassificationResult::no_data(),
    };

    let (label, severity, color, description, urgent) = if mmol < 4.0 {
        (
            "Low (hypoglycemia)",
            Severity::Critical,
            StatusColor::DarkRed,
            "Blood sugar is low. Take fast-acting carbohydrates and recheck.",
            true,
        )
    } else if mmol < 6.0 {
        (
            "Normal",
            Severity::Normal,
            StatusColor::Green,
            "Your blood sugar is in the healthy range.",
            false,
        )
    } else if mmol < 7.0 {
        (
            "Pre-diabetes",
            Severity::Elevated,
            StatusColor::Yellow,
            "Above the normal fasting range. Talk to your doctor about screening.",
            false,
        )
    } else if mmol < 11.1 {
        (
            "High",
            Severity::High,
            StatusColor::Orange,
            "Blood sugar is high. Follow your care plan and recheck later.",
            false,
        )
    } else {
        (
            "Very High",
            Severity::VeryHigh,
            StatusColor::Red,
            "Blood sugar is very high. Contact your doctor.",
            true,
        )
    };

    ClassificationResult {
        label: label.to_string(),
        severity: Some(severity),
        color,
        description: Some(description.to_string()),
        target_range: Some(GLUCOSE_TARGET.to_string()),
        urgent,
    }
}

/// Classify a weight change in kilograms. There is no absolute weight band.
pub fn classify_weight_change(delta_kg: Option<f64>) -> ClassificationResult {
    let delta = match delta_kg {
        Some(d) if d.is_finite() => d,
        _ => return ClassificationResult::no_data(),
    };

    let (label, color) = if delta < 0.0 {
        ("Down", StatusColor::Green)
    } else if delta > 0.0 {
        ("Up", StatusColor::Orange)
    } else {
        ("No change", StatusColor::Gray)
    };

    ClassificationResult {
        label: label.to_string(),
        severity: None,
        color,
        description: Some(format!("{:+.1} kg since the previous reading", delta)),
        target_range: None,
        urgent: false,
    }
}

/// Classify a stored reading by its own measurement. Weight readings have
/// no band of their own and classify as "No data".
pub fn classify_reading(reading: &Reading) -> ClassificationResult {
    match reading.measurement {
        Measurement::BloodPressure { systolic, diastolic } => classify_blood_pressure(Some(systolic), Some(diastolic)),
        Measurement::Glucose { value, unit } => classify_glucose(Some(value), unit),
        Measurement::Weight { .. } => ClassificationResult::no_data(),
    }
}
