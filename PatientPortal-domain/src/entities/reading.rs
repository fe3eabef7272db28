use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Milligrams per decilitre in one millimole per litre of glucose
pub const MG_DL_PER_MMOL_L: f64 = 18.0;

/// Kilograms in one pound
pub const KG_PER_LB: f64 = 0.453_592_37;

/// The measurement types the portal tracks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadingKind {
    BloodPressure,
    Glucose,
    Weight,
}

impl ReadingKind {
    /// All kinds, in dashboard order
    pub const ALL: [ReadingKind; 3] = [ReadingKind::BloodPressure, ReadingKind::Glucose, ReadingKind::Weight];

    /// Storage tag
    pub fn as_str(self) -> &'static str {
        match self {
            ReadingKind::BloodPressure => "blood_pressure",
            ReadingKind::Glucose => "glucose",
            ReadingKind::Weight => "weight",
        }
    }

    /// Parse a storage tag or a common spelling of it
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "blood_pressure" | "bp" => Some(ReadingKind::BloodPressure),
            "glucose" | "blood_glucose" => Some(ReadingKind::Glucose),
            "weight" => Some(ReadingKind::Weight),
            _ => None,
        }
    }

    /// Human-readable name
    pub fn display_name(self) -> &'static str {
        match self {
            ReadingKind::BloodPressure => "Blood Pressure",
            ReadingKind::Glucose => "Blood Glucose",
            ReadingKind::Weight => "Weight",
        }
    }

    /// Unit of the value returned by [`Reading::primary_value`]
    pub fn canonical_unit(self) -> &'static str {
        match self {
            ReadingKind::BloodPressure => "mmHg",
            ReadingKind::Glucose => GlucoseUnit::MmolL.label(),
            ReadingKind::Weight => "kg",
        }
    }
}

impl fmt::Display for ReadingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unit a glucose value was entered in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GlucoseUnit {
    #[serde(rename = "mmol/L")]
    MmolL,
    #[serde(rename = "mg/dL")]
    MgDl,
}

impl GlucoseUnit {
    /// Unit label
    pub fn label(self) -> &'static str {
        match self {
            GlucoseUnit::MmolL => "mmol/L",
            GlucoseUnit::MgDl => "mg/dL",
        }
    }

    /// Parse a unit label, case-insensitively
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "mmol/l" | "mmol" => Some(GlucoseUnit::MmolL),
            "mg/dl" | "mg" => Some(GlucoseUnit::MgDl),
            _ => None,
        }
    }

    /// Convert a value in this unit to mmol/L
    pub fn to_mmol(self, value: f64) -> f64 {
        match self {
            GlucoseUnit::MmolL => value,
            GlucoseUnit::MgDl => value / MG_DL_PER_MMOL_L,
        }
    }
}

/// Unit a weight was entered in; weights are always stored in kilograms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeightUnit {
    Kg,
    Lb,
}

impl WeightUnit {
    /// Parse a unit label, case-insensitively
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "kg" | "kgs" => Some(WeightUnit::Kg),
            "lb" | "lbs" => Some(WeightUnit::Lb),
            _ => None,
        }
    }

    /// Convert a value in this unit to kilograms, rounded to 2 decimals for pounds
    pub fn to_kg(self, value: f64) -> f64 {
        match self {
            WeightUnit::Kg => value,
            WeightUnit::Lb => (value * KG_PER_LB * 100.0).round() / 100.0,
        }
    }
}

/// What was measured. Each variant carries only its own fields.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Measurement {
    BloodPressure { systolic: u16, diastolic: u16 },
    Glucose { value: f64, unit: GlucoseUnit },
    Weight { kg: f64 },
}

impl Measurement {
    /// Which kind of measurement this is
    pub fn kind(&self) -> ReadingKind {
        match self {
            Measurement::BloodPressure { .. } => ReadingKind::BloodPressure,
            Measurement::Glucose { .. } => ReadingKind::Glucose,
            Measurement::Weight { .. } => ReadingKind::Weight,
        }
    }

    /// The value trends and deltas are computed on, in the kind's canonical unit:
    /// systolic mmHg, glucose mmol/L, weight kg
    pub fn primary_value(&self) -> f64 {
        match *self {
            Measurement::BloodPressure { systolic, .. } => f64::from(systolic),
            Measurement::Glucose { value, unit } => unit.to_mmol(value),
            Measurement::Weight { kg } => kg,
        }
    }

    /// Diastolic pressure for blood pressure, `None` otherwise
    pub fn secondary_value(&self) -> Option<f64> {
        match *self {
            Measurement::BloodPressure { diastolic, .. } => Some(f64::from(diastolic)),
            _ => None,
        }
    }
}

/// A single timestamped health measurement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    /// Unique identifier, fixed at creation
    pub id: Uuid,

    /// When the reading was taken; may be back-dated
    pub timestamp: DateTime<Utc>,

    /// Optional free-text note
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,

    /// The measured values
    #[serde(flatten)]
    pub measurement: Measurement,
}

impl Reading {
    /// Kind of the underlying measurement
    pub fn kind(&self) -> ReadingKind {
        self.measurement.kind()
    }

    /// See [`Measurement::primary_value`]
    pub fn primary_value(&self) -> f64 {
        self.measurement.primary_value()
    }
}

/// Blood pressure values for a new reading
#[derive(Debug, Clone, Copy, PartialEq, Validate)]
pub struct CreateBloodPressureRequest {
    /// Systolic blood pressure (the higher number)
    #[validate(range(min = 60, max = 250, message = "Systolic must be between 60 and 250 mmHg"))]
    pub systolic: u16,

    /// Diastolic blood pressure (the lower number)
    #[validate(range(min = 40, max = 150, message = "Diastolic must be between 40 and 150 mmHg"))]
    pub diastolic: u16,
}

/// Glucose value for a new reading; the valid range depends on the unit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CreateGlucoseRequest {
    pub value: f64,
    pub unit: GlucoseUnit,
}

/// Weight value for a new reading
#[derive(Debug, Clone, Copy, PartialEq, Validate)]
pub struct CreateWeightRequest {
    /// Weight in `unit`
    #[validate(range(min = 20.0, max = 500.0, message = "Weight must be between 20 and 500"))]
    pub value: f64,

    /// Unit the weight was entered in
    pub unit: WeightUnit,
}

/// The measurement half of a new reading
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NewMeasurement {
    BloodPressure(CreateBloodPressureRequest),
    Glucose(CreateGlucoseRequest),
    Weight(CreateWeightRequest),
}

impl NewMeasurement {
    /// Kind of reading this request creates
    pub fn kind(&self) -> ReadingKind {
        match self {
            NewMeasurement::BloodPressure(_) => ReadingKind::BloodPressure,
            NewMeasurement::Glucose(_) => ReadingKind::Glucose,
            NewMeasurement::Weight(_) => ReadingKind::Weight,
        }
    }

    /// The measurement as stored, with weights converted to kilograms
    pub fn into_measurement(self) -> Measurement {
        match self {
            NewMeasurement::BloodPressure(bp) => Measurement::BloodPressure {
                systolic: bp.systolic,
                diastolic: bp.diastolic,
            },
            NewMeasurement::Glucose(g) => Measurement::Glucose {
                value: g.value,
                unit: g.unit,
            },
            NewMeasurement::Weight(w) => Measurement::Weight {
                kg: w.unit.to_kg(w.value),
            },
        }
    }
}

/// Request payload for creating a new reading
#[derive(Debug, Clone, PartialEq, Validate)]
pub struct CreateReadingRequest {
    /// The measured values
    pub measurement: NewMeasurement,

    /// When the reading was taken. Defaults to the creation time.
    pub timestamp: Option<DateTime<Utc>>,

    /// Optional note
    #[validate(length(max = 500, message = "Notes cannot exceed 500 characters"))]
    pub note: Option<String>,
}

impl CreateReadingRequest {
    /// A blood pressure request taken now
    pub fn blood_pressure(systolic: u16, diastolic: u16) -> Self {
        Self::from_measurement(NewMeasurement::BloodPressure(CreateBloodPressureRequest { systolic, diastolic }))
    }

    /// A glucose request taken now
    pub fn glucose(value: f64, unit: GlucoseUnit) -> Self {
        Self::from_measurement(NewMeasurement::Glucose(CreateGlucoseRequest { value, unit }))
    }

    /// A weight request in kilograms taken now
    pub fn weight_kg(value: f64) -> Self {
        Self::from_measurement(NewMeasurement::Weight(CreateWeightRequest { value, unit: WeightUnit::Kg }))
    }

    fn from_measurement(measurement: NewMeasurement) -> Self {
        Self {
            measurement,
            timestamp: None,
            note: None,
        }
    }

    /// Set the time the reading was taken
    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Attach a note
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

/// Raw text fields of a reading as a form or command line delivers them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadingForm {
    pub kind: ReadingKind,
    #[serde(default)]
    pub systolic: Option<String>,
    #[serde(default)]
    pub diastolic: Option<String>,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
}

impl ReadingForm {
    /// An empty form for `kind`
    pub fn new(kind: ReadingKind) -> Self {
        Self {
            kind,
            systolic: None,
            diastolic: None,
            value: None,
            unit: None,
            timestamp: None,
            note: None,
        }
    }

    /// Turn the text fields into a typed request.
    ///
    /// Fails with a message naming the field when a required number is
    /// missing or not numeric, a unit is unknown, or the timestamp is not
    /// RFC 3339. Range checks happen later, at validation.
    pub fn parse(&self) -> Result<CreateReadingRequest, String> {
        let measurement = match self.kind {
            ReadingKind::BloodPressure => NewMeasurement::BloodPressure(CreateBloodPressureRequest {
                systolic: parse_whole("systolic", self.systolic.as_deref())?,
                diastolic: parse_whole("diastolic", self.diastolic.as_deref())?,
            }),
            ReadingKind::Glucose => {
                let value = parse_decimal("value", self.value.as_deref())?;
                let unit = match non_blank(self.unit.as_deref()) {
                    Some(unit) => GlucoseUnit::parse(unit)
                        .ok_or_else(|| format!("unit: '{}' is not a glucose unit (mmol/L or mg/dL)", unit))?,
                    None => return Err("unit: glucose unit is required (mmol/L or mg/dL)".to_string()),
                };
                NewMeasurement::Glucose(CreateGlucoseRequest { value, unit })
            }
            ReadingKind::Weight => {
                let value = parse_decimal("value", self.value.as_deref())?;
                let unit = match non_blank(self.unit.as_deref()) {
                    Some(unit) => WeightUnit::parse(unit)
                        .ok_or_else(|| format!("unit: '{}' is not a weight unit (kg or lb)", unit))?,
                    None => WeightUnit::Kg,
                };
                NewMeasurement::Weight(CreateWeightRequest { value, unit })
            }
        };

        let timestamp = match non_blank(self.timestamp.as_deref()) {
            Some(raw) => Some(
                DateTime::parse_from_rfc3339(raw)
                    .map_err(|_| format!("timestamp: '{}' is not an RFC 3339 date-time", raw))?
                    .with_timezone(&Utc),
            ),
            None => None,
        };

        Ok(CreateReadingRequest {
            measurement,
            timestamp,
            note: non_blank(self.note.as_deref()).map(str::to_string),
        })
    }
}

fn non_blank(field: Option<&str>) -> Option<&str> {
    field.map(str::trim).filter(|s| !s.is_empty())
}

fn parse_decimal(name: &str, field: Option<&str>) -> Result<f64, String> {
    let raw = non_blank(field).ok_or_else(|| format!("{}: is required", name))?;
    let value: f64 = raw
        .parse()
        .map_err(|_| format!("{}: '{}' is not a number", name, raw))?;
    if !value.is_finite() {
        return Err(format!("{}: '{}' is not a finite number", name, raw));
    }
    Ok(value)
}

fn parse_whole(name: &str, field: Option<&str>) -> Result<u16, String> {
    let value = parse_decimal(name, field)?;
    if value.fract() != 0.0 || value < 0.0 || value > f64::from(u16::MAX) {
        return Err(format!("{}: {} is not a whole number of mmHg", name, value));
    }
    Ok(value as u16)
}
