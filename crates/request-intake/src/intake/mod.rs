//! Volunteer request intake.
//!
//! A session snapshots the roster and the request log, resolves who is submitting, walks
//! them through the role-dependent category form, and appends one row per accepted
//! request under a freshly allocated, role-prefixed id.

pub mod allocator;
pub mod categories;
pub mod csv_store;
pub mod domain;
pub mod form;
pub mod identity;
pub mod phone;
pub mod repository;
pub mod router;
pub mod service;
pub mod templates;
pub mod validation;

#[cfg(test)]
mod tests;

pub use allocator::{prefix_for, Allocation, AllocationKind, RequestIdAllocator};
pub use categories::CategoryRuleEngine;
pub use csv_store::{read_roster, CsvRequestLog, CsvRoster};
pub use domain::{
    CategorySelection, DateRange, PhoneInput, RequestId, RequestRecord, RosterRecord, Submitter,
    VerifiedVia, VolunteerRole,
};
pub use form::{apply_selection, FormEvent, FormState, FormView};
pub use identity::{IdentityResolver, ResolutionResult};
pub use phone::{normalize, CanonicalPhone, PhoneError, RegionHint};
pub use repository::{RequestStore, RosterSource, StoreError};
pub use router::request_router;
pub use service::{IntakeError, IntakeSession, IntakeSettings, RequestDraft, SubmissionReceipt};
pub use templates::{MessageTemplates, TemplateError};
pub use validation::{Rejection, SubmissionValidator};
