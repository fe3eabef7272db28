use serde::{Deserialize, Serialize};

/// Storage model for a health reading.
///
/// One flat record shape covers every measurement type; which optional
/// fields are populated depends on `reading_type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredReading {
    /// Unique identifier for the reading
    pub id: String,

    /// Measurement type: blood_pressure, glucose or weight
    #[serde(rename = "type")]
    pub reading_type: String,

    /// Systolic pressure in mmHg (blood pressure only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub systolic: Option<u16>,

    /// Diastolic pressure in mmHg (blood pressure only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diastolic: Option<u16>,

    /// Measured value (glucose or weight)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,

    /// Unit of `value`, e.g. mmol/L, mg/dL or kg
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,

    /// When the reading was taken (RFC 3339)
    pub timestamp: String,

    /// Optional free-text note
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_field_is_renamed() {
        let reading = StoredReading {
            id: "r1".to_string(),
            reading_type: "weight".to_string(),
            systolic: None,
            diastolic: None,
            value: Some(72.53),
            unit: Some("kg".to_string()),
            timestamp: "2024-03-01T08:00:00+00:00".to_string(),
            note: None,
        };
        let json = serde_json::to_value(&reading).unwrap();
        assert_eq!(json["type"], "weight");
        assert!(json.get("systolic").is_none());
        assert!(json.get("note").is_none());
    }

    #[test]
    fn test_missing_optional_fields_deserialize() {
        let json = r#"{"id":"r2","type":"blood_pressure","systolic":128,"diastolic":82,"timestamp":"2024-03-01T08:00:00Z"}"#;
        let reading: StoredReading = serde_json::from_str(json).unwrap();
        assert_eq!(reading.systolic, Some(128));
        assert_eq!(reading.value, None);
    }
}
