use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::entities::appointment::Appointment;
use crate::entities::classification::ClassificationResult;
use crate::entities::reading::{Reading, ReadingKind};
use crate::services::classifier::{classify_reading, classify_weight_change};
use crate::services::trends::Trends;

/// A reading type counts as overdue after this many days without a reading
pub const MEASUREMENT_INTERVAL_DAYS: i64 = 7;

/// Latest reading of one type with its badge
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LatestReading {
    pub kind: ReadingKind,
    pub reading: Reading,
    pub classification: ClassificationResult,
}

/// Change between the two latest weights
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeightChange {
    pub delta_kg: Option<f64>,
    pub classification: ClassificationResult,
}

/// A latest reading in an urgent band
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthAlert {
    pub kind: ReadingKind,
    pub reading_id: Uuid,
    pub label: String,
    pub message: String,
}

/// Dashboard overview
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthSummary {
    pub generated_at: DateTime<Utc>,
    pub latest: Vec<LatestReading>,
    pub weight_change: WeightChange,
    pub upcoming_appointments: Vec<Appointment>,
    pub alerts: Vec<HealthAlert>,
    pub next_recommended_measurements: Vec<ReadingKind>,
}

/// Build the dashboard overview as of `now`
pub fn build_summary(trends: &Trends<'_>, now: DateTime<Utc>, upcoming_limit: usize) -> HealthSummary {
    let mut latest = Vec::new();
    let mut alerts = Vec::new();
    let mut next_recommended_measurements = Vec::new();
    let recent_since = now - Duration::days(MEASUREMENT_INTERVAL_DAYS);

    for kind in ReadingKind::ALL {
        let reading = match trends.latest_of(kind) {
            Some(reading) => reading,
            None => {
                next_recommended_measurements.push(kind);
                continue;
            }
        };

        if reading.timestamp < recent_since {
            next_recommended_measurements.push(kind);
        }

        let classification = classify_reading(reading);
        if classification.is_urgent() {
            alerts.push(HealthAlert {
                kind,
                reading_id: reading.id,
                label: classification.label.clone(),
                message: classification
                    .description
                    .clone()
                    .unwrap_or_else(|| format!("{} needs attention", kind.display_name())),
            });
        }

        latest.push(LatestReading {
            kind,
            reading: reading.clone(),
            classification,
        });
    }

    let delta_kg = trends.delta_of(ReadingKind::Weight);

    HealthSummary {
        generated_at: now,
        latest,
        weight_change: WeightChange {
            delta_kg,
            classification: classify_weight_change(delta_kg),
        },
        upcoming_appointments: trends
            .upcoming_appointments(upcoming_limit, now.date_naive())
            .into_iter()
            .cloned()
            .collect(),
        alerts,
        next_recommended_measurements,
    }
}
