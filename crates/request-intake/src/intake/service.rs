use std::sync::{Arc, Mutex};

use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::allocator::{AllocationKind, RequestIdAllocator, DEFAULT_RANDOM_ATTEMPTS};
use super::categories::CategoryRuleEngine;
use super::domain::{
    CategorySelection, DateRange, PhoneInput, RequestId, RequestRecord, Submitter, VolunteerRole,
};
use super::form::FormState;
use super::identity::{IdentityResolver, ResolutionResult};
use super::repository::{RequestStore, RosterSource, StoreError};
use super::templates::{MessageTemplates, TemplateError};
use super::validation::{Rejection, SubmissionValidator};
use crate::config::IntakeConfig;

/// Knobs of a single intake session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntakeSettings {
    pub default_region: String,
    pub random_id_attempts: u32,
    pub default_extension_start: bool,
}

impl Default for IntakeSettings {
    fn default() -> Self {
        Self {
            default_region: "IN".to_string(),
            random_id_attempts: DEFAULT_RANDOM_ATTEMPTS,
            default_extension_start: true,
        }
    }
}

impl From<&IntakeConfig> for IntakeSettings {
    fn from(config: &IntakeConfig) -> Self {
        Self {
            default_region: config.default_region.clone(),
            random_id_attempts: config.random_id_attempts,
            default_extension_start: config.default_extension_start,
        }
    }
}

/// Everything a submitter typed, before identity resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestDraft {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<PhoneInput>,
    #[serde(flatten)]
    pub selection: CategorySelection,
    #[serde(default)]
    pub dates: DateRange,
    #[serde(default)]
    pub description: String,
}

/// Confirmation handed back after a request is stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmissionReceipt {
    pub request_id: RequestId,
    pub message: String,
    /// Set when the id is the exhaustion sentinel and may collide.
    pub degraded: bool,
    #[serde(skip)]
    pub record: RequestRecord,
}

/// Error raised by an intake session.
#[derive(Debug, thiserror::Error)]
pub enum IntakeError {
    #[error(transparent)]
    Rejected(#[from] Rejection),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Templates(#[from] TemplateError),
}

/// One roster and id snapshot plus the submissions served from it.
///
/// Ids are unique against the snapshot and this session's own submissions only. Another
/// session writing to the same store after the snapshot can be issued the same id.
pub struct IntakeSession<S> {
    resolver: IdentityResolver,
    rules: CategoryRuleEngine,
    validator: SubmissionValidator,
    templates: MessageTemplates,
    store: Arc<S>,
    allocator: Mutex<RequestIdAllocator>,
    settings: IntakeSettings,
}

impl<S> IntakeSession<S>
where
    S: RequestStore + 'static,
{
    /// Snapshot the roster and existing ids. Any store failure here ends the session
    /// before a form is offered.
    pub fn open<R>(
        roster: &R,
        store: Arc<S>,
        templates: MessageTemplates,
        settings: IntakeSettings,
    ) -> Result<Self, IntakeError>
    where
        R: RosterSource + ?Sized,
    {
        let records = roster.load_roster()?;
        let existing = store.existing_ids()?;

        info!(
            roster_size = records.len(),
            existing_ids = existing.len(),
            "intake session opened"
        );

        let resolver = IdentityResolver::new(records, &settings.default_region);
        let allocator =
            RequestIdAllocator::new(existing).with_random_attempts(settings.random_id_attempts);
        let rules = CategoryRuleEngine;

        Ok(Self {
            resolver,
            rules,
            validator: SubmissionValidator::new(rules),
            templates,
            store,
            allocator: Mutex::new(allocator),
            settings,
        })
    }

    pub fn settings(&self) -> &IntakeSettings {
        &self.settings
    }

    pub fn rules(&self) -> &CategoryRuleEngine {
        &self.rules
    }

    pub fn templates(&self) -> &MessageTemplates {
        &self.templates
    }

    pub fn roster_size(&self) -> usize {
        self.resolver.len()
    }

    pub fn resolve(&self, email: Option<&str>, phone: Option<&PhoneInput>) -> ResolutionResult {
        self.resolver.resolve(email, phone)
    }

    pub fn resolve_submitter(&self, email: Option<&str>, phone: Option<&PhoneInput>) -> Submitter {
        self.resolver.resolve_submitter(email, phone)
    }

    /// Empty form for a submitter.
    pub fn form_for(&self, submitter: &Submitter) -> FormState {
        FormState::new(submitter.role())
    }

    /// Rendered informational notice for a sub-category, if it has one.
    pub fn notice_for(&self, sub_category: &str) -> Option<&str> {
        self.rules
            .notice_for(sub_category)
            .map(|key| self.templates.get(key))
    }

    /// Resolve the draft's identity, then validate and store it.
    pub fn submit_draft(&self, draft: RequestDraft) -> Result<SubmissionReceipt, IntakeError> {
        let submitter = self.resolve_submitter(draft.email.as_deref(), draft.phone.as_ref());
        self.submit(&submitter, &draft.selection, draft.dates, &draft.description)
    }

    pub fn submit_form(
        &self,
        submitter: &Submitter,
        form: &FormState,
    ) -> Result<SubmissionReceipt, IntakeError> {
        self.submit(submitter, &form.selection, form.dates, &form.description)
    }

    pub fn submit(
        &self,
        submitter: &Submitter,
        selection: &CategorySelection,
        dates: DateRange,
        description: &str,
    ) -> Result<SubmissionReceipt, IntakeError> {
        self.submit_at(
            submitter,
            selection,
            dates,
            description,
            Local::now().naive_local(),
        )
    }

    /// Validate, allocate an id, and append one row. Nothing is written on rejection.
    pub fn submit_at(
        &self,
        submitter: &Submitter,
        selection: &CategorySelection,
        dates: DateRange,
        description: &str,
        now: NaiveDateTime,
    ) -> Result<SubmissionReceipt, IntakeError> {
        let sub_category = selection.chosen_sub_category();
        let dates = match sub_category {
            Some(sub)
                if self.settings.default_extension_start
                    && self.rules.defaults_start_to_today(sub) =>
            {
                dates.with_default_from(now.date())
            }
            _ => dates,
        };

        if let Err(rejection) = self
            .validator
            .validate(submitter, selection, &dates, description)
        {
            info!(reason = rejection.code(), "submission rejected");
            return Err(rejection.into());
        }

        let Some(roster_record) = submitter.record() else {
            return Err(Rejection::Unverified.into());
        };

        let keep_dates = sub_category.is_some_and(|sub| self.rules.requires_date_range(sub));

        let mut allocator = self
            .allocator
            .lock()
            .map_err(|_| StoreError::Unavailable("id allocator lock poisoned".to_string()))?;
        let allocation = allocator.allocate(roster_record.role);

        let record = RequestRecord {
            id: allocation.id.clone(),
            name: roster_record.name.clone(),
            gender: roster_record.gender.clone(),
            email: roster_record.email.clone(),
            phone: submitter
                .contact_phone()
                .unwrap_or(roster_record.phone.as_str())
                .to_string(),
            role: roster_record.role,
            top_category: selection.top_category.trim().to_string(),
            sub_category: sub_category.map(str::to_string),
            from_date: dates.from.filter(|_| keep_dates),
            to_date: dates.to.filter(|_| keep_dates),
            description: description.trim().to_string(),
            submitted_at: now,
        };

        self.store.append(&record)?;
        allocator.reserve(&record.id);
        drop(allocator);

        let degraded = allocation.kind == AllocationKind::Exhausted;
        if degraded {
            warn!(request_id = %record.id, "stored request under sentinel id");
        }

        info!(
            request_id = %record.id,
            role = record.role.label(),
            top_category = %record.top_category,
            via = ?submitter.verified_via(),
            "request stored"
        );

        let message = self.templates.render(
            MessageTemplates::confirmation_key(record.sub_category.as_deref()),
            &record.id,
        );

        Ok(SubmissionReceipt {
            request_id: record.id.clone(),
            message,
            degraded,
            record,
        })
    }

    /// Top-level and dependent options for a role.
    pub fn options_for(
        &self,
        role: VolunteerRole,
        top_category: &str,
    ) -> (Vec<&'static str>, Vec<&'static str>) {
        (
            self.rules.top_categories(role),
            self.rules.sub_categories_for(role, top_category),
        )
    }
}
