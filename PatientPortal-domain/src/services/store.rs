use std::collections::HashSet;

use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use patient_portal_data::models::{StoredAppointment, StoredReading};
use patient_portal_data::repository::{
    CollectionRepository, KeyValueBackend, RepositoryError, APPOINTMENTS_KEY, READINGS_KEY,
};

use crate::entities::appointment::{Appointment, AppointmentStatus, ScheduleAppointmentRequest};
use crate::entities::conversions;
use crate::entities::page::Page;
use crate::entities::reading::{CreateReadingRequest, Reading, ReadingForm, ReadingKind};
use crate::services::errors::StoreError;
use crate::services::summary::{build_summary, HealthSummary};
use crate::services::trends::{latest_of_kind, Trends};
use crate::services::validation::{validate_appointment_request, validate_reading_request};

/// Owns the readings and appointments of one session and writes them
/// back through a backend after every change.
///
/// Changes are applied in memory first. When the write that follows fails
/// the change stays applied and the caller gets [`StoreError::NotPersisted`].
#[derive(Debug)]
pub struct ReadingStore<B> {
    repository: CollectionRepository<B>,
    readings: Vec<Reading>,
    appointments: Vec<Appointment>,
}

impl<B: KeyValueBackend> ReadingStore<B> {
    /// An empty store that has not read anything from `backend`
    pub fn new(backend: B) -> Self {
        Self {
            repository: CollectionRepository::new(backend),
            readings: Vec::new(),
            appointments: Vec::new(),
        }
    }

    /// Read both collections from `backend`.
    ///
    /// Never fails: a missing, unreadable or malformed collection loads as
    /// empty, and records that do not convert are dropped. Only the first
    /// record with a given id is kept.
    pub async fn load(backend: B) -> Self {
        let mut store = Self::new(backend);

        let stored_readings: Vec<StoredReading> = store.load_or_empty(READINGS_KEY).await;
        store.readings = convert_all(
            READINGS_KEY,
            stored_readings,
            conversions::convert_to_domain_reading,
            |r| r.id,
        );

        let stored_appointments: Vec<StoredAppointment> = store.load_or_empty(APPOINTMENTS_KEY).await;
        store.appointments = convert_all(
            APPOINTMENTS_KEY,
            stored_appointments,
            conversions::convert_to_domain_appointment,
            |a| a.id,
        );

        info!(
            "Loaded {} readings and {} appointments",
            store.readings.len(),
            store.appointments.len()
        );
        store
    }

    async fn load_or_empty<T: serde::de::DeserializeOwned>(&self, key: &str) -> Vec<T> {
        match self.repository.load_collection::<T>(key).await {
            Ok(loaded) => loaded.items,
            Err(e) => {
                warn!("Could not load '{}', starting empty: {}", key, e);
                Vec::new()
            }
        }
    }

    /// The backend this store writes to
    pub fn backend(&self) -> &B {
        self.repository.backend()
    }

    /// All readings in insertion order
    pub fn readings(&self) -> &[Reading] {
        &self.readings
    }

    /// Readings in insertion order, optionally of one kind only
    pub fn list(&self, kind: Option<ReadingKind>) -> Vec<&Reading> {
        self.readings
            .iter()
            .filter(|r| kind.map_or(true, |k| r.kind() == k))
            .collect()
    }

    /// Look a reading up by id
    pub fn get(&self, id: Uuid) -> Option<&Reading> {
        self.readings.iter().find(|r| r.id == id)
    }

    /// Reading of `kind` with the latest timestamp; ties go to the one appended last
    pub fn latest(&self, kind: ReadingKind) -> Option<&Reading> {
        latest_of_kind(&self.readings, kind)
    }

    /// Readings newest first, one page at a time
    pub fn page(&self, kind: Option<ReadingKind>, page: usize, size: usize) -> Page<Reading> {
        let ordered: Vec<Reading> = self.trends().newest_first(kind).into_iter().cloned().collect();
        Page::from_slice(&ordered, page, size)
    }

    /// All appointments in insertion order
    pub fn appointments(&self) -> &[Appointment] {
        &self.appointments
    }

    /// Derived values over the current contents
    pub fn trends(&self) -> Trends<'_> {
        Trends::new(&self.readings, &self.appointments)
    }

    /// Dashboard overview as of `now`
    pub fn summary(&self, now: DateTime<Utc>, upcoming_limit: usize) -> HealthSummary {
        build_summary(&self.trends(), now, upcoming_limit)
    }

    /// Validate and add a reading with a fresh id, then persist.
    ///
    /// A validation failure leaves the store untouched. A persistence
    /// failure keeps the reading and returns [`StoreError::NotPersisted`].
    #[instrument(skip(self, request), fields(kind = %request.measurement.kind()))]
    pub async fn append(&mut self, request: CreateReadingRequest) -> Result<Reading, StoreError> {
        validate_reading_request(&request)?;

        let reading = Reading {
            id: Uuid::new_v4(),
            timestamp: request.timestamp.unwrap_or_else(Utc::now),
            note: request.note,
            measurement: request.measurement.into_measurement(),
        };
        self.readings.push(reading.clone());
        debug!("Appended reading {}", reading.id);

        self.persist_readings()
            .await
            .map_err(|source| not_persisted(reading.id, source))?;
        Ok(reading)
    }

    /// Parse raw form fields and append the result
    pub async fn append_form(&mut self, form: &ReadingForm) -> Result<Reading, StoreError> {
        let request = form.parse().map_err(StoreError::Validation)?;
        self.append(request).await
    }

    /// Delete a reading by id, then persist
    #[instrument(skip(self))]
    pub async fn remove(&mut self, id: Uuid) -> Result<Reading, StoreError> {
        let index = self
            .readings
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| StoreError::NotFound(format!("Reading {}", id)))?;
        let removed = self.readings.remove(index);

        self.persist_readings().await.map_err(|source| not_persisted(id, source))?;
        Ok(removed)
    }

    /// Validate and book an appointment as scheduled, then persist
    #[instrument(skip(self, request))]
    pub async fn schedule(&mut self, request: ScheduleAppointmentRequest) -> Result<Appointment, StoreError> {
        validate_appointment_request(&request)?;

        let appointment = Appointment {
            id: Uuid::new_v4(),
            doctor_name: request.doctor_name.trim().to_string(),
            specialty: request.specialty.trim().to_string(),
            date: request.date,
            time: request.time,
            modality: request.modality,
            notes: request.notes,
            status: AppointmentStatus::Scheduled,
        };
        self.appointments.push(appointment.clone());

        self.persist_appointments()
            .await
            .map_err(|source| not_persisted(appointment.id, source))?;
        Ok(appointment)
    }

    /// Mark a scheduled appointment as completed
    pub async fn complete(&mut self, id: Uuid) -> Result<Appointment, StoreError> {
        self.transition(id, AppointmentStatus::Completed).await
    }

    /// Cancel a scheduled appointment
    pub async fn cancel(&mut self, id: Uuid) -> Result<Appointment, StoreError> {
        self.transition(id, AppointmentStatus::Cancelled).await
    }

    #[instrument(skip(self))]
    async fn transition(&mut self, id: Uuid, to: AppointmentStatus) -> Result<Appointment, StoreError> {
        let appointment = self
            .appointments
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| StoreError::NotFound(format!("Appointment {}", id)))?;

        if !appointment.status.can_transition_to(to) {
            return Err(StoreError::InvalidTransition {
                id,
                from: appointment.status,
                to,
            });
        }
        appointment.status = to;
        let updated = appointment.clone();

        self.persist_appointments()
            .await
            .map_err(|source| not_persisted(id, source))?;
        Ok(updated)
    }

    /// Overwrite both persisted collections with the current contents
    pub async fn persist(&self) -> Result<(), StoreError> {
        self.persist_readings().await?;
        self.persist_appointments().await?;
        Ok(())
    }

    async fn persist_readings(&self) -> Result<(), RepositoryError> {
        let stored: Vec<StoredReading> = self.readings.iter().map(conversions::convert_to_data_reading).collect();
        self.repository.save_collection(READINGS_KEY, &stored).await
    }

    async fn persist_appointments(&self) -> Result<(), RepositoryError> {
        let stored: Vec<StoredAppointment> = self
            .appointments
            .iter()
            .map(conversions::convert_to_data_appointment)
            .collect();
        self.repository.save_collection(APPOINTMENTS_KEY, &stored).await
    }
}

fn not_persisted(id: Uuid, source: RepositoryError) -> StoreError {
    warn!("Change to {} kept in memory but not persisted: {}", id, source);
    StoreError::NotPersisted { id, source }
}

fn convert_all<S, T>(
    key: &str,
    stored: Vec<S>,
    convert: fn(S) -> Result<T, String>,
    id_of: fn(&T) -> Uuid,
) -> Vec<T> {
    let mut seen = HashSet::new();
    stored
        .into_iter()
        .enumerate()
        .filter_map(|(index, record)| match convert(record) {
            Ok(item) if seen.insert(id_of(&item)) => Some(item),
            Ok(item) => {
                warn!("Dropping record {} of '{}': duplicate id {}", index, key, id_of(&item));
                None
            }
            Err(reason) => {
                warn!("Dropping record {} of '{}': {}", index, key, reason);
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use async_trait::async_trait;
    use chrono::{NaiveDate, NaiveTime, TimeZone};
    use mockall::mock;
    use mockall::predicate::eq;
    use patient_portal_data::repository::tests::FailingBackend;
    use patient_portal_data::repository::InMemoryBackend;

    use crate::entities::appointment::Modality;
    use crate::entities::reading::{GlucoseUnit, Measurement};

    mock! {
        pub Backend {}

        #[async_trait]
        impl KeyValueBackend for Backend {
            async fn load(&self, key: &str) -> Result<Option<String>, RepositoryError>;
            async fn save(&self, key: &str, value: &str) -> Result<(), RepositoryError>;
        }
    }

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, day, hour, 0, 0).unwrap()
    }

    fn booking(doctor: &str, date: NaiveDate) -> ScheduleAppointmentRequest {
        ScheduleAppointmentRequest {
            doctor_name: doctor.to_string(),
            specialty: "General Practice".to_string(),
            date,
            time: NaiveTime::from_hms_opt(10, 30, 0).unwrap(),
            modality: Modality::Video,
            notes: None,
        }
    }

    #[tokio::test]
    async fn test_append_assigns_unique_ids_and_persists() {
        let backend = InMemoryBackend::new();
        let mut store = ReadingStore::new(backend.clone());

        let first = store.append(CreateReadingRequest::blood_pressure(128, 82)).await.unwrap();
        let second = store.append(CreateReadingRequest::blood_pressure(128, 82)).await.unwrap();

        assert_ne!(first.id, second.id);
        assert_eq!(store.readings().len(), 2);
        assert!(backend.load(READINGS_KEY).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_append_defaults_timestamp_to_now() {
        let mut store = ReadingStore::new(InMemoryBackend::new());
        let before = Utc::now();
        let reading = store.append(CreateReadingRequest::weight_kg(70.0)).await.unwrap();
        assert!(reading.timestamp >= before);
        assert!(reading.timestamp <= Utc::now());
    }

    #[tokio::test]
    async fn test_invalid_append_leaves_store_untouched() {
        let backend = FailingBackend::new();
        let mut store = ReadingStore::new(backend);

        let result = store.append(CreateReadingRequest::blood_pressure(80, 120)).await;
        assert!(matches!(result, Err(StoreError::Validation(_))));
        assert!(store.readings().is_empty());
        assert_eq!(store.backend().save_attempts(), 0);
    }

    #[tokio::test]
    async fn test_append_form_reports_missing_field() {
        let mut store = ReadingStore::new(InMemoryBackend::new());
        let form = ReadingForm {
            systolic: Some("120".to_string()),
            ..ReadingForm::new(ReadingKind::BloodPressure)
        };

        match store.append_form(&form).await {
            Err(StoreError::Validation(msg)) => assert!(msg.starts_with("diastolic")),
            other => panic!("expected validation error, got {:?}", other),
        }
        assert!(store.readings().is_empty());
    }

    #[tokio::test]
    async fn test_failed_persist_keeps_reading_and_is_surfaced() {
        let backend = Arc::new(FailingBackend::failing_saves());
        let mut store = ReadingStore::new(Arc::clone(&backend));

        let err = store
            .append(CreateReadingRequest::weight_kg(72.53).at(at(1, 8)))
            .await
            .unwrap_err();

        let id = match err {
            StoreError::NotPersisted { id, .. } => id,
            other => panic!("expected NotPersisted, got {:?}", other),
        };
        assert_eq!(store.readings().len(), 1);
        assert_eq!(store.readings()[0].id, id);
        assert_eq!(backend.save_attempts(), 1);
        assert!(backend.inner().is_empty());

        // The next successful write carries the kept reading too
        backend.set_fail_saves(false);
        store.persist().await.unwrap();
        let reloaded = ReadingStore::load(Arc::clone(&backend)).await;
        assert_eq!(reloaded.readings(), store.readings());
    }

    #[tokio::test]
    async fn test_mocked_save_failure() {
        let mut backend = MockBackend::new();
        backend
            .expect_save()
            .with(eq(READINGS_KEY), mockall::predicate::always())
            .times(1)
            .returning(|_, _| Err(RepositoryError::Unavailable("quota exceeded".to_string())));

        let mut store = ReadingStore::new(backend);
        let result = store
            .append(CreateReadingRequest::glucose(5.4, GlucoseUnit::MmolL))
            .await;

        assert!(matches!(result, Err(StoreError::NotPersisted { .. })));
        assert_eq!(store.list(Some(ReadingKind::Glucose)).len(), 1);
    }

    #[tokio::test]
    async fn test_load_fails_soft() {
        let mut backend = MockBackend::new();
        backend
            .expect_load()
            .with(eq(READINGS_KEY))
            .returning(|_| Ok(Some("{\"not\": \"an array\"}".to_string())));
        backend
            .expect_load()
            .with(eq(APPOINTMENTS_KEY))
            .returning(|_| Err(RepositoryError::Unavailable("locked".to_string())));

        let store = ReadingStore::load(backend).await;
        assert!(store.readings().is_empty());
        assert!(store.appointments().is_empty());
    }

    #[tokio::test]
    async fn test_load_drops_records_that_do_not_convert() {
        let good = serde_json::json!({
            "id": "123e4567-e89b-12d3-a456-426614174000",
            "type": "weight",
            "value": 70.0,
            "unit": "kg",
            "timestamp": "2024-03-01T08:00:00+00:00"
        });
        let unknown_type = serde_json::json!({
            "id": "123e4567-e89b-12d3-a456-426614174001",
            "type": "temperature",
            "value": 37.0,
            "timestamp": "2024-03-01T08:00:00+00:00"
        });
        let raw = serde_json::json!([good, unknown_type, "junk"]).to_string();
        let backend = InMemoryBackend::new().with_document(READINGS_KEY, &raw);

        let store = ReadingStore::load(backend).await;
        assert_eq!(store.readings().len(), 1);
        assert_eq!(store.readings()[0].measurement, Measurement::Weight { kg: 70.0 });
    }

    #[tokio::test]
    async fn test_load_keeps_first_record_of_duplicate_id() {
        let first = serde_json::json!({
            "id": "123e4567-e89b-12d3-a456-426614174000",
            "type": "weight",
            "value": 70.0,
            "unit": "kg",
            "timestamp": "2024-03-01T08:00:00+00:00"
        });
        let duplicate = serde_json::json!({
            "id": "123e4567-e89b-12d3-a456-426614174000",
            "type": "weight",
            "value": 68.0,
            "unit": "kg",
            "timestamp": "2024-03-02T08:00:00+00:00"
        });
        let booking = serde_json::json!({
            "id": "123e4567-e89b-12d3-a456-426614174009",
            "doctor_name": "Dr. Osei",
            "specialty": "Cardiology",
            "date": "2024-05-02",
            "time": "09:15",
            "modality": "video",
            "status": "scheduled"
        });
        let readings = serde_json::json!([first, duplicate]).to_string();
        let appointments = serde_json::json!([booking.clone(), booking]).to_string();
        let backend = InMemoryBackend::new()
            .with_document(READINGS_KEY, &readings)
            .with_document(APPOINTMENTS_KEY, &appointments);

        let store = ReadingStore::load(backend).await;
        assert_eq!(store.readings().len(), 1);
        assert_eq!(store.readings()[0].measurement, Measurement::Weight { kg: 70.0 });
        assert_eq!(store.trends().delta_of(ReadingKind::Weight), None);
        assert_eq!(store.appointments().len(), 1);
    }

    #[tokio::test]
    async fn test_list_keeps_insertion_order() {
        let mut store = ReadingStore::new(InMemoryBackend::new());
        store.append(CreateReadingRequest::weight_kg(70.0).at(at(5, 8))).await.unwrap();
        store.append(CreateReadingRequest::blood_pressure(120, 80).at(at(1, 8))).await.unwrap();
        store.append(CreateReadingRequest::weight_kg(71.0).at(at(2, 8))).await.unwrap();

        let weights: Vec<f64> = store
            .list(Some(ReadingKind::Weight))
            .iter()
            .map(|r| r.primary_value())
            .collect();
        assert_eq!(weights, vec![70.0, 71.0]);
        assert_eq!(store.list(None).len(), 3);
        assert_eq!(store.latest(ReadingKind::Weight).map(|r| r.primary_value()), Some(70.0));
    }

    #[tokio::test]
    async fn test_latest_tie_is_last_appended() {
        let mut store = ReadingStore::new(InMemoryBackend::new());
        store.append(CreateReadingRequest::weight_kg(70.0).at(at(1, 8))).await.unwrap();
        let second = store.append(CreateReadingRequest::weight_kg(69.0).at(at(1, 8))).await.unwrap();

        assert_eq!(store.latest(ReadingKind::Weight).map(|r| r.id), Some(second.id));
        assert!(store.latest(ReadingKind::Glucose).is_none());
    }

    #[tokio::test]
    async fn test_remove() {
        let mut store = ReadingStore::new(InMemoryBackend::new());
        let reading = store.append(CreateReadingRequest::weight_kg(70.0)).await.unwrap();

        let removed = store.remove(reading.id).await.unwrap();
        assert_eq!(removed.id, reading.id);
        assert!(store.readings().is_empty());
        assert!(matches!(store.remove(reading.id).await, Err(StoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_page_newest_first() {
        let mut store = ReadingStore::new(InMemoryBackend::new());
        for day in 1..=5 {
            store
                .append(CreateReadingRequest::weight_kg(70.0 + f64::from(day)).at(at(day, 8)))
                .await
                .unwrap();
        }

        let page = store.page(Some(ReadingKind::Weight), 1, 2);
        assert_eq!(page.total, 5);
        assert_eq!(page.pages, 3);
        let values: Vec<f64> = page.items.iter().map(|r| r.primary_value()).collect();
        assert_eq!(values, vec![75.0, 74.0]);

        assert_eq!(store.page(None, 3, 2).items.len(), 1);
    }

    #[tokio::test]
    async fn test_appointment_lifecycle() {
        let mut store = ReadingStore::new(InMemoryBackend::new());
        let date = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();

        let booked = store.schedule(booking("  Dr. Osei ", date)).await.unwrap();
        assert_eq!(booked.status, AppointmentStatus::Scheduled);
        assert_eq!(booked.doctor_name, "Dr. Osei");

        let completed = store.complete(booked.id).await.unwrap();
        assert_eq!(completed.status, AppointmentStatus::Completed);

        match store.cancel(booked.id).await {
            Err(StoreError::InvalidTransition { from, to, .. }) => {
                assert_eq!(from, AppointmentStatus::Completed);
                assert_eq!(to, AppointmentStatus::Cancelled);
            }
            other => panic!("expected InvalidTransition, got {:?}", other),
        }
        assert_eq!(store.appointments()[0].status, AppointmentStatus::Completed);

        assert!(matches!(store.complete(Uuid::new_v4()).await, Err(StoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_cancelled_cannot_be_completed() {
        let mut store = ReadingStore::new(InMemoryBackend::new());
        let date = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();
        let booked = store.schedule(booking("Dr. Lind", date)).await.unwrap();

        store.cancel(booked.id).await.unwrap();
        assert!(matches!(
            store.complete(booked.id).await,
            Err(StoreError::InvalidTransition { .. })
        ));
    }

    #[tokio::test]
    async fn test_invalid_booking_is_rejected() {
        let mut store = ReadingStore::new(InMemoryBackend::new());
        let date = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();
        let result = store.schedule(booking("", date)).await;
        assert!(matches!(result, Err(StoreError::Validation(_))));
        assert!(store.appointments().is_empty());
    }

    #[tokio::test]
    async fn test_round_trip_through_backend() {
        let backend = InMemoryBackend::new();
        let mut store = ReadingStore::new(backend.clone());
        store.append(CreateReadingRequest::weight_kg(72.53).at(at(1, 8))).await.unwrap();
        store
            .append(CreateReadingRequest::glucose(98.0, GlucoseUnit::MgDl).with_note("fasting"))
            .await
            .unwrap();
        store
            .schedule(booking("Dr. Osei", NaiveDate::from_ymd_opt(2024, 6, 3).unwrap()))
            .await
            .unwrap();

        let reloaded = ReadingStore::load(backend).await;
        assert_eq!(reloaded.readings(), store.readings());
        assert_eq!(reloaded.appointments(), store.appointments());
        assert_eq!(reloaded.readings()[0].measurement, Measurement::Weight { kg: 72.53 });
    }
}
