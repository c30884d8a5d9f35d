use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use request_intake::config::IntakeConfig;
use request_intake::error::AppError;
use request_intake::intake::{
    CsvRequestLog, CsvRoster, IntakeError, IntakeSession, IntakeSettings, MessageTemplates,
    RequestRecord, RequestStore, RosterRecord, RosterSource, StoreError, VolunteerRole,
};
use std::collections::HashSet;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Session over the configured roster export and request log.
pub(crate) fn open_csv_session(
    config: &IntakeConfig,
) -> Result<IntakeSession<CsvRequestLog>, AppError> {
    let templates = load_templates(config)?;
    let roster = CsvRoster::new(&config.roster_csv);
    let log = Arc::new(CsvRequestLog::new(&config.requests_csv));
    let session = IntakeSession::open(&roster, log, templates, IntakeSettings::from(config))?;
    Ok(session)
}

pub(crate) fn load_templates(config: &IntakeConfig) -> Result<MessageTemplates, AppError> {
    match &config.templates_json {
        Some(path) => MessageTemplates::from_path(path)
            .map_err(|err| AppError::Intake(IntakeError::from(err))),
        None => Ok(MessageTemplates::builtin()),
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryRoster {
    records: Vec<RosterRecord>,
}

impl InMemoryRoster {
    pub(crate) fn new(records: Vec<RosterRecord>) -> Self {
        Self { records }
    }
}

impl RosterSource for InMemoryRoster {
    fn load_roster(&self) -> Result<Vec<RosterRecord>, StoreError> {
        Ok(self.records.clone())
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryRequestLog {
    rows: Arc<Mutex<Vec<RequestRecord>>>,
}

impl InMemoryRequestLog {
    pub(crate) fn rows(&self) -> Result<Vec<RequestRecord>, StoreError> {
        let guard = self
            .rows
            .lock()
            .map_err(|_| StoreError::Unavailable("request log mutex poisoned".to_string()))?;
        Ok(guard.clone())
    }
}

impl RequestStore for InMemoryRequestLog {
    fn existing_ids(&self) -> Result<HashSet<String>, StoreError> {
        Ok(self.rows()?.into_iter().map(|row| row.id.0).collect())
    }

    fn append(&self, record: &RequestRecord) -> Result<(), StoreError> {
        let mut guard = self
            .rows
            .lock()
            .map_err(|_| StoreError::Unavailable("request log mutex poisoned".to_string()))?;
        guard.push(record.clone());
        Ok(())
    }
}

/// Accepts `YYYY-MM-DD` or the day-first `DD/MM/YYYY` used in the request log.
pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    let trimmed = raw.trim();
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(trimmed, "%d/%m/%Y"))
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD or DD/MM/YYYY ({err})"))
}

/// Accepts the snake_case role name or the roster label.
pub(crate) fn parse_role(raw: &str) -> Result<VolunteerRole, String> {
    let trimmed = raw.trim();
    VolunteerRole::ordered()
        .into_iter()
        .find(|role| {
            role.label().eq_ignore_ascii_case(trimmed)
                || role_key(*role).eq_ignore_ascii_case(trimmed)
        })
        .ok_or_else(|| {
            format!(
                "unknown volunteer role '{raw}' (expected one of ashram_volunteer, \
                 short_term_support, long_term_support, other)"
            )
        })
}

fn role_key(role: VolunteerRole) -> &'static str {
    match role {
        VolunteerRole::AshramVolunteer => "ashram_volunteer",
        VolunteerRole::ShortTermSupport => "short_term_support",
        VolunteerRole::LongTermSupport => "long_term_support",
        VolunteerRole::Other => "other",
    }
}
