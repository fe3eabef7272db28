use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::entities::appointment::{Appointment, AppointmentStatus};
use crate::entities::reading::{Reading, ReadingKind};

/// Number of points charted by default
pub const DEFAULT_SERIES_WINDOW: usize = 14;

/// One chart point. `value` is in the kind's canonical unit; `secondary`
/// carries diastolic pressure for blood pressure.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secondary: Option<f64>,
}

/// Direction of a charted series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Improving,
    Declining,
    Stable,
}

/// Summary statistics over a charted series
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendStatistics {
    pub kind: ReadingKind,
    pub unit: &'static str,
    pub points: usize,
    pub average: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub direction: TrendDirection,
}

/// Change below which a series counts as stable, in the kind's canonical unit
pub fn trend_tolerance(kind: ReadingKind) -> f64 {
    match kind {
        ReadingKind::BloodPressure => 5.0,
        ReadingKind::Glucose => 0.5,
        ReadingKind::Weight => 0.5,
    }
}

/// The reading of `kind` with the latest timestamp. Among equal
/// timestamps the one appended last wins.
pub fn latest_of_kind(readings: &[Reading], kind: ReadingKind) -> Option<&Reading> {
    readings
        .iter()
        .enumerate()
        .filter(|(_, r)| r.kind() == kind)
        .max_by_key(|(index, r)| (r.timestamp, *index))
        .map(|(_, r)| r)
}

/// Read-only calculations over a snapshot of the store
#[derive(Debug, Clone, Copy)]
pub struct Trends<'a> {
    readings: &'a [Reading],
    appointments: &'a [Appointment],
}

impl<'a> Trends<'a> {
    pub fn new(readings: &'a [Reading], appointments: &'a [Appointment]) -> Self {
        Self { readings, appointments }
    }

    /// Latest reading of `kind`, `None` when there is none
    pub fn latest_of(&self, kind: ReadingKind) -> Option<&'a Reading> {
        latest_of_kind(self.readings, kind)
    }

    /// Readings of `kind`, newest first. Among equal timestamps the one
    /// appended last comes first.
    pub fn newest_first(&self, kind: Option<ReadingKind>) -> Vec<&'a Reading> {
        let mut indexed: Vec<(usize, &'a Reading)> = self
            .readings
            .iter()
            .enumerate()
            .filter(|(_, r)| kind.map_or(true, |k| r.kind() == k))
            .collect();
        indexed.sort_by(|(ia, a), (ib, b)| (b.timestamp, ib).cmp(&(a.timestamp, ia)));
        indexed.into_iter().map(|(_, r)| r).collect()
    }

    /// Latest value minus the one before it, `None` with fewer than two readings
    pub fn delta_of(&self, kind: ReadingKind) -> Option<f64> {
        let ordered = self.newest_first(Some(kind));
        match ordered.as_slice() {
            [latest, previous, ..] => Some(latest.primary_value() - previous.primary_value()),
            _ => None,
        }
    }

    /// The last `window` readings of `kind` in ascending time order.
    /// Equal timestamps keep insertion order.
    pub fn series_for(&self, kind: ReadingKind, window: usize) -> Vec<SeriesPoint> {
        let mut matching: Vec<&Reading> = self.readings.iter().filter(|r| r.kind() == kind).collect();
        matching.sort_by_key(|r| r.timestamp);

        let skip = matching.len().saturating_sub(window);
        matching
            .into_iter()
            .skip(skip)
            .map(|r| SeriesPoint {
                timestamp: r.timestamp,
                value: r.primary_value(),
                secondary: r.measurement.secondary_value(),
            })
            .collect()
    }

    /// Statistics over the same points `series_for` would chart
    pub fn statistics(&self, kind: ReadingKind, window: usize) -> TrendStatistics {
        let series = self.series_for(kind, window);
        let values: Vec<f64> = series.iter().map(|p| p.value).collect();

        let (average, min, max) = if values.is_empty() {
            (None, None, None)
        } else {
            let sum: f64 = values.iter().sum();
            (
                Some(sum / values.len() as f64),
                values.iter().copied().reduce(f64::min),
                values.iter().copied().reduce(f64::max),
            )
        };

        let direction = match (values.first(), values.last()) {
            (Some(first), Some(last)) if values.len() >= 2 => {
                let change = last - first;
                let tolerance = trend_tolerance(kind);
                if change < -tolerance {
                    TrendDirection::Improving
                } else if change > tolerance {
                    TrendDirection::Declining
                } else {
                    TrendDirection::Stable
                }
            }
            _ => TrendDirection::Stable,
        };

        TrendStatistics {
            kind,
            unit: kind.canonical_unit(),
            points: values.len(),
            average,
            min,
            max,
            direction,
        }
    }

    /// Scheduled appointments on or after `today`, soonest first, at most `limit`
    pub fn upcoming_appointments(&self, limit: usize, today: NaiveDate) -> Vec<&'a Appointment> {
        let mut upcoming: Vec<&'a Appointment> = self
            .appointments
            .iter()
            .filter(|a| a.status == AppointmentStatus::Scheduled && a.date >= today)
            .collect();
        upcoming.sort_by_key(|a| (a.date, a.time));
        upcoming.truncate(limit);
        upcoming
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveTime, TimeZone};
    use uuid::Uuid;

    use crate::entities::appointment::Modality;
    use crate::entities::reading::{GlucoseUnit, Measurement};

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, hour, 0, 0).unwrap()
    }

    fn weight(kg: f64, timestamp: DateTime<Utc>) -> Reading {
        Reading {
            id: Uuid::new_v4(),
            timestamp,
            note: None,
            measurement: Measurement::Weight { kg },
        }
    }

    fn bp(systolic: u16, diastolic: u16, timestamp: DateTime<Utc>) -> Reading {
        Reading {
            id: Uuid::new_v4(),
            timestamp,
            note: None,
            measurement: Measurement::BloodPressure { systolic, diastolic },
        }
    }

    fn appointment(date: NaiveDate, status: AppointmentStatus) -> Appointment {
        Appointment {
            id: Uuid::new_v4(),
            doctor_name: "Dr. Osei".to_string(),
            specialty: "Cardiology".to_string(),
            date,
            time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            modality: Modality::InPerson,
            notes: None,
            status,
        }
    }

    #[test]
    fn test_latest_on_empty_is_none() {
        let trends = Trends::new(&[], &[]);
        assert!(trends.latest_of(ReadingKind::Glucose).is_none());
        assert!(trends.delta_of(ReadingKind::Weight).is_none());
    }

    #[test]
    fn test_latest_ignores_insertion_order() {
        // Back-dated entry appended last
        let readings = vec![weight(70.0, at(10)), weight(71.0, at(8))];
        let trends = Trends::new(&readings, &[]);
        assert_eq!(trends.latest_of(ReadingKind::Weight), Some(&readings[0]));
    }

    #[test]
    fn test_latest_tie_goes_to_last_appended() {
        let readings = vec![weight(70.0, at(9)), weight(71.0, at(9)), bp(120, 80, at(9))];
        let trends = Trends::new(&readings, &[]);
        assert_eq!(trends.latest_of(ReadingKind::Weight), Some(&readings[1]));
        assert_eq!(trends.delta_of(ReadingKind::Weight), Some(1.0));
    }

    #[test]
    fn test_weight_delta() {
        let one = vec![weight(70.0, at(8))];
        assert_eq!(Trends::new(&one, &[]).delta_of(ReadingKind::Weight), None);

        let two = vec![weight(70.0, at(8)), weight(68.5, at(9))];
        assert_eq!(Trends::new(&two, &[]).delta_of(ReadingKind::Weight), Some(-1.5));
    }

    #[test]
    fn test_glucose_delta_uses_mmol() {
        let readings = vec![
            Reading {
                id: Uuid::new_v4(),
                timestamp: at(8),
                note: None,
                measurement: Measurement::Glucose { value: 90.0, unit: GlucoseUnit::MgDl },
            },
            Reading {
                id: Uuid::new_v4(),
                timestamp: at(9),
                note: None,
                measurement: Measurement::Glucose { value: 6.0, unit: GlucoseUnit::MmolL },
            },
        ];
        assert_eq!(Trends::new(&readings, &[]).delta_of(ReadingKind::Glucose), Some(1.0));
    }

    #[test]
    fn test_series_window_and_order() {
        let readings: Vec<Reading> = (0..20)
            .rev()
            .map(|i| weight(60.0 + i as f64, at(0) + Duration::hours(i)))
            .collect();
        let trends = Trends::new(&readings, &[]);

        let series = trends.series_for(ReadingKind::Weight, DEFAULT_SERIES_WINDOW);
        assert_eq!(series.len(), 14);
        assert_eq!(series.first().map(|p| p.value), Some(66.0));
        assert_eq!(series.last().map(|p| p.value), Some(79.0));
        assert!(series.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));

        assert!(trends.series_for(ReadingKind::Weight, 0).is_empty());
        assert!(trends.series_for(ReadingKind::Glucose, 14).is_empty());
    }

    #[test]
    fn test_series_does_not_touch_readings() {
        let readings = vec![weight(71.0, at(9)), weight(70.0, at(8))];
        let before = readings.clone();
        let _ = Trends::new(&readings, &[]).series_for(ReadingKind::Weight, 14);
        assert_eq!(readings, before);
    }

    #[test]
    fn test_blood_pressure_series_has_diastolic() {
        let readings = vec![bp(128, 82, at(8))];
        let series = Trends::new(&readings, &[]).series_for(ReadingKind::BloodPressure, 14);
        assert_eq!(series[0].value, 128.0);
        assert_eq!(series[0].secondary, Some(82.0));
    }

    #[test]
    fn test_statistics() {
        let readings = vec![weight(80.0, at(8)), weight(79.0, at(9)), weight(78.0, at(10))];
        let stats = Trends::new(&readings, &[]).statistics(ReadingKind::Weight, 14);
        assert_eq!(stats.points, 3);
        assert_eq!(stats.average, Some(79.0));
        assert_eq!(stats.min, Some(78.0));
        assert_eq!(stats.max, Some(80.0));
        assert_eq!(stats.unit, "kg");
        assert_eq!(stats.direction, TrendDirection::Improving);

        let rising = vec![bp(120, 80, at(8)), bp(140, 90, at(9))];
        let stats = Trends::new(&rising, &[]).statistics(ReadingKind::BloodPressure, 14);
        assert_eq!(stats.direction, TrendDirection::Declining);

        let steady = vec![bp(120, 80, at(8)), bp(124, 80, at(9))];
        let stats = Trends::new(&steady, &[]).statistics(ReadingKind::BloodPressure, 14);
        assert_eq!(stats.direction, TrendDirection::Stable);
    }

    #[test]
    fn test_statistics_on_empty_series() {
        let stats = Trends::new(&[], &[]).statistics(ReadingKind::Glucose, 14);
        assert_eq!(stats.points, 0);
        assert_eq!(stats.average, None);
        assert_eq!(stats.direction, TrendDirection::Stable);
    }

    #[test]
    fn test_upcoming_appointments() {
        let today = NaiveDate::from_ymd_opt(2024, 5, 10).unwrap();
        let appointments = vec![
            appointment(today + Duration::days(20), AppointmentStatus::Scheduled),
            appointment(today - Duration::days(1), AppointmentStatus::Scheduled),
            appointment(today + Duration::days(3), AppointmentStatus::Scheduled),
            appointment(today + Duration::days(7), AppointmentStatus::Scheduled),
        ];
        let trends = Trends::new(&[], &appointments);

        let upcoming = trends.upcoming_appointments(2, today);
        assert_eq!(upcoming.len(), 2);
        assert_eq!(upcoming[0].id, appointments[2].id);
        assert_eq!(upcoming[1].id, appointments[3].id);
    }

    #[test]
    fn test_upcoming_skips_cancelled_and_includes_today() {
        let today = NaiveDate::from_ymd_opt(2024, 5, 10).unwrap();
        let appointments = vec![
            appointment(today, AppointmentStatus::Cancelled),
            appointment(today, AppointmentStatus::Scheduled),
            appointment(today + Duration::days(1), AppointmentStatus::Completed),
        ];
        let upcoming = Trends::new(&[], &appointments).upcoming_appointments(5, today);
        assert_eq!(upcoming.len(), 1);
        assert_eq!(upcoming[0].id, appointments[1].id);
    }
}
