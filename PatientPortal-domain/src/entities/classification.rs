use serde::{Deserialize, Serialize};

/// Ordered clinical severity of a classified reading
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Within the healthy range
    Normal,
    /// High-normal blood pressure or pre-diabetic glucose
    Elevated,
    /// Stage 1 hypertension or high glucose
    High,
    /// Stage 2 hypertension or very high glucose
    VeryHigh,
    /// Severe hypertension or hypoglycemia
    Critical,
}

/// Display color tag of a status badge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusColor {
    Green,
    Yellow,
    Orange,
    Red,
    DarkRed,
    Gray,
}

impl StatusColor {
    /// Text color class used by the web dashboard
    pub fn css_class(self) -> &'static str {
        match self {
            StatusColor::Green => "text-green-600",
            StatusColor::Yellow => "text-yellow-600",
            StatusColor::Orange => "text-orange-600",
            StatusColor::Red => "text-red-600",
            StatusColor::DarkRed => "text-red-700",
            StatusColor::Gray => "text-gray-500",
        }
    }
}

/// A renderable status badge for a reading or a change between readings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    /// Short label, e.g. "Stage 1"
    pub label: String,

    /// Severity band; `None` when there was nothing to classify or the
    /// result describes a direction of change rather than a band
    pub severity: Option<Severity>,

    /// Badge color
    pub color: StatusColor,

    /// Longer explanation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Healthy target, e.g. "< 120/80 mmHg"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_range: Option<String>,

    /// Whether the band calls for prompt medical attention
    #[serde(default)]
    pub urgent: bool,
}

impl ClassificationResult {
    /// Label used when a value is absent or unusable
    pub const NO_DATA_LABEL: &'static str = "No data";

    /// The placeholder result for absent or invalid input
    pub fn no_data() -> Self {
        Self {
            label: Self::NO_DATA_LABEL.to_string(),
            severity: None,
            color: StatusColor::Gray,
            description: None,
            target_range: None,
            urgent: false,
        }
    }

    /// Whether this is the placeholder result
    pub fn is_no_data(&self) -> bool {
        self.severity.is_none() && self.label == Self::NO_DATA_LABEL
    }

    /// Whether the band calls for prompt medical attention
    pub fn is_urgent(&self) -> bool {
        self.urgent
    }
}
