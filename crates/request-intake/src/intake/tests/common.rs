use std::collections::HashSet;
use std::sync::mpsc::Receiver;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::response::Response;
use chrono::{NaiveDate, NaiveDateTime};
use serde_json::Value;

use crate::intake::domain::{
    CategorySelection, DateRange, PhoneInput, RequestRecord, RosterRecord, Submitter,
    VolunteerRole,
};
use crate::intake::repository::{RequestStore, RosterSource, StoreError};
use crate::intake::service::{IntakeSession, IntakeSettings};
use crate::intake::templates::MessageTemplates;

pub(super) fn roster_record(
    email: &str,
    phone: &str,
    name: &str,
    role: VolunteerRole,
) -> RosterRecord {
    RosterRecord {
        email: email.to_string(),
        phone: phone.to_string(),
        name: name.to_string(),
        role,
        gender: "Female".to_string(),
    }
}

pub(super) fn roster() -> Vec<RosterRecord> {
    vec![
        roster_record("a@x.com", "9876543210", "Anu", VolunteerRole::LongTermSupport),
        roster_record("b@x.com", "+91 98123 45678", "Bala", VolunteerRole::AshramVolunteer),
        roster_record("c@x.com", "9000000001", "Chitra", VolunteerRole::ShortTermSupport),
        roster_record("d@x.com", "", "Dev", VolunteerRole::Other),
    ]
}

pub(super) fn submitter(email: &str) -> Submitter {
    let record = roster()
        .into_iter()
        .find(|record| record.email == email)
        .expect("fixture email on roster");
    Submitter::via_email(record)
}

pub(super) fn phone(region: &str, number: &str) -> PhoneInput {
    PhoneInput {
        region: region.to_string(),
        number: number.to_string(),
    }
}

pub(super) fn date(month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, month, day).expect("valid date")
}

pub(super) fn now() -> NaiveDateTime {
    date(4, 20).and_hms_opt(9, 15, 0).expect("valid time")
}

pub(super) fn selection(top: &str, sub: Option<&str>) -> CategorySelection {
    CategorySelection::new(top, sub)
}

pub(super) fn no_dates() -> DateRange {
    DateRange::default()
}

pub(super) fn open_session<S: RequestStore + 'static>(store: Arc<S>) -> IntakeSession<S> {
    IntakeSession::open(
        &MemoryRoster(roster()),
        store,
        MessageTemplates::builtin(),
        IntakeSettings::default(),
    )
    .expect("session opens")
}

pub(super) struct MemoryRoster(pub(super) Vec<RosterRecord>);

impl RosterSource for MemoryRoster {
    fn load_roster(&self) -> Result<Vec<RosterRecord>, StoreError> {
        Ok(self.0.clone())
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryRequestLog {
    seeded: HashSet<String>,
    rows: Arc<Mutex<Vec<RequestRecord>>>,
}

impl MemoryRequestLog {
    pub(super) fn seeded(ids: &[&str]) -> Self {
        Self {
            seeded: ids.iter().map(|id| id.to_string()).collect(),
            rows: Arc::default(),
        }
    }

    pub(super) fn rows(&self) -> Vec<RequestRecord> {
        self.rows.lock().expect("log mutex poisoned").clone()
    }
}

impl RequestStore for MemoryRequestLog {
    fn existing_ids(&self) -> Result<HashSet<String>, StoreError> {
        let mut ids = self.seeded.clone();
        ids.extend(
            self.rows
                .lock()
                .expect("log mutex poisoned")
                .iter()
                .map(|row| row.id.0.clone()),
        );
        Ok(ids)
    }

    fn append(&self, record: &RequestRecord) -> Result<(), StoreError> {
        self.rows
            .lock()
            .expect("log mutex poisoned")
            .push(record.clone());
        Ok(())
    }
}

/// Opens fine, then refuses every write.
pub(super) struct ReadOnlyLog;

impl RequestStore for ReadOnlyLog {
    fn existing_ids(&self) -> Result<HashSet<String>, StoreError> {
        Ok(HashSet::new())
    }

    fn append(&self, _record: &RequestRecord) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("sheet is read only".to_string()))
    }
}

pub(super) struct UnavailableLog;

impl RequestStore for UnavailableLog {
    fn existing_ids(&self) -> Result<HashSet<String>, StoreError> {
        Err(StoreError::Unavailable("sheet offline".to_string()))
    }

    fn append(&self, _record: &RequestRecord) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("sheet offline".to_string()))
    }
}

/// Holds every append until the paired sender releases it; gives up after five seconds.
pub(super) struct GatedLog {
    gate: Mutex<Receiver<()>>,
    rows: MemoryRequestLog,
}

impl GatedLog {
    pub(super) fn new(gate: Receiver<()>) -> Self {
        Self {
            gate: Mutex::new(gate),
            rows: MemoryRequestLog::default(),
        }
    }

    pub(super) fn rows(&self) -> Vec<RequestRecord> {
        self.rows.rows()
    }
}

impl RequestStore for GatedLog {
    fn existing_ids(&self) -> Result<HashSet<String>, StoreError> {
        self.rows.existing_ids()
    }

    fn append(&self, record: &RequestRecord) -> Result<(), StoreError> {
        self.gate
            .lock()
            .expect("gate mutex poisoned")
            .recv_timeout(Duration::from_secs(5))
            .map_err(|_| StoreError::Unavailable("append was never released".to_string()))?;
        self.rows.append(record)
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 4096)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
