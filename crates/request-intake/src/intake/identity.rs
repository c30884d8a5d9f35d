use std::collections::HashMap;

use serde::Serialize;
use tracing::debug;

use super::domain::{PhoneInput, RosterRecord, Submitter, VerifiedVia};
use super::phone::{self, CanonicalPhone};

/// Outcome of a roster lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolutionResult {
    pub found: bool,
    pub record: Option<RosterRecord>,
    pub verified_via: VerifiedVia,
    /// Canonical form of the number the submitter typed, when matched by phone.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_phone: Option<String>,
}

impl ResolutionResult {
    fn not_found() -> Self {
        Self {
            found: false,
            record: None,
            verified_via: VerifiedVia::None,
            matched_phone: None,
        }
    }

    pub fn into_submitter(self) -> Submitter {
        match (self.record, self.verified_via, self.matched_phone) {
            (Some(record), VerifiedVia::Email, _) => Submitter::via_email(record),
            (Some(record), VerifiedVia::Phone, Some(phone)) => Submitter::via_phone(record, phone),
            (Some(record), VerifiedVia::Phone, None) => {
                let phone = record.phone.clone();
                Submitter::via_phone(record, phone)
            }
            _ => Submitter::unverified(),
        }
    }
}

/// Roster snapshot indexed by email and canonical phone.
///
/// Roster phones are normalized once here; rows whose phone does not normalize are
/// only reachable by email.
#[derive(Debug, Clone)]
pub struct IdentityResolver {
    records: Vec<RosterRecord>,
    by_email: HashMap<String, usize>,
    by_phone: HashMap<CanonicalPhone, usize>,
}

impl IdentityResolver {
    pub fn new(records: Vec<RosterRecord>, default_region: &str) -> Self {
        let mut by_email = HashMap::with_capacity(records.len());
        let mut by_phone = HashMap::with_capacity(records.len());

        for (index, record) in records.iter().enumerate() {
            by_email.entry(record.email.clone()).or_insert(index);

            match phone::normalize(&record.phone, default_region) {
                Ok(canonical) => {
                    by_phone.entry(canonical).or_insert(index);
                }
                Err(error) => {
                    debug!(row = index, %error, "roster phone excluded from phone lookup");
                }
            }
        }

        Self {
            records,
            by_email,
            by_phone,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Email first; the phone path is only tried when the email is empty or unknown.
    pub fn resolve(&self, email: Option<&str>, phone_input: Option<&PhoneInput>) -> ResolutionResult {
        if let Some(email) = email.map(str::trim).filter(|value| !value.is_empty()) {
            if let Some(&index) = self.by_email.get(email) {
                debug!(via = "email", "submitter resolved");
                return ResolutionResult {
                    found: true,
                    record: Some(self.records[index].clone()),
                    verified_via: VerifiedVia::Email,
                    matched_phone: None,
                };
            }
        }

        let Some(input) = phone_input else {
            debug!("submitter not found");
            return ResolutionResult::not_found();
        };

        match phone::normalize(&input.number, &input.region) {
            Ok(canonical) => match self.by_phone.get(&canonical) {
                Some(&index) => {
                    debug!(via = "phone", "submitter resolved");
                    ResolutionResult {
                        found: true,
                        record: Some(self.records[index].clone()),
                        verified_via: VerifiedVia::Phone,
                        matched_phone: Some(canonical.into_string()),
                    }
                }
                None => {
                    debug!("submitter phone not on roster");
                    ResolutionResult::not_found()
                }
            },
            Err(error) => {
                debug!(%error, "submitter phone did not normalize");
                ResolutionResult::not_found()
            }
        }
    }

    pub fn resolve_submitter(
        &self,
        email: Option<&str>,
        phone_input: Option<&PhoneInput>,
    ) -> Submitter {
        self.resolve(email, phone_input).into_submitter()
    }
}
