use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Placeholder written to the request log for optional columns that were not filled.
pub const EMPTY_CELL: &str = "None";

/// Day-first format used by the request log for date columns.
pub const DATE_CELL_FORMAT: &str = "%d/%m/%Y";

/// Timestamp format used by the request log's final column.
pub const TIMESTAMP_CELL_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// Volunteer category as recorded in the roster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VolunteerRole {
    AshramVolunteer,
    ShortTermSupport,
    LongTermSupport,
    Other,
}

impl VolunteerRole {
    pub const fn ordered() -> [Self; 4] {
        [
            Self::AshramVolunteer,
            Self::ShortTermSupport,
            Self::LongTermSupport,
            Self::Other,
        ]
    }

    /// Roster label for the role. `Other` has no canonical label.
    pub const fn label(self) -> &'static str {
        match self {
            Self::AshramVolunteer => "Ashram Volunteer",
            Self::ShortTermSupport => "Short Term Department Support",
            Self::LongTermSupport => "Long Term Department Support",
            Self::Other => "Other",
        }
    }

    pub fn from_label(value: &str) -> Self {
        match value.trim() {
            "Ashram Volunteer" => Self::AshramVolunteer,
            "Short Term Department Support" => Self::ShortTermSupport,
            "Long Term Department Support" => Self::LongTermSupport,
            _ => Self::Other,
        }
    }
}

impl fmt::Display for VolunteerRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A roster row. Owned by the roster; never modified here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterRecord {
    pub email: String,
    pub phone: String,
    pub name: String,
    pub role: VolunteerRole,
    pub gender: String,
}

/// How a submitter proved roster membership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerifiedVia {
    Email,
    Phone,
    None,
}

/// Phone lookup input: the region or calling code hint plus what the user typed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhoneInput {
    pub region: String,
    pub number: String,
}

/// The person filling the form, as far as the roster could tell.
///
/// A record is present exactly when `verified_via` is not `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Submitter {
    record: Option<RosterRecord>,
    verified_via: VerifiedVia,
    contact_phone: Option<String>,
}

impl Submitter {
    pub fn unverified() -> Self {
        Self {
            record: None,
            verified_via: VerifiedVia::None,
            contact_phone: None,
        }
    }

    pub fn via_email(record: RosterRecord) -> Self {
        Self {
            contact_phone: Some(record.phone.clone()),
            record: Some(record),
            verified_via: VerifiedVia::Email,
        }
    }

    /// `contact_phone` is the number the submitter entered, in canonical form.
    pub fn via_phone(record: RosterRecord, contact_phone: String) -> Self {
        Self {
            record: Some(record),
            verified_via: VerifiedVia::Phone,
            contact_phone: Some(contact_phone),
        }
    }

    pub fn record(&self) -> Option<&RosterRecord> {
        self.record.as_ref()
    }

    pub fn verified_via(&self) -> VerifiedVia {
        self.verified_via
    }

    pub fn is_verified(&self) -> bool {
        self.verified_via != VerifiedVia::None
    }

    pub fn role(&self) -> Option<VolunteerRole> {
        self.record.as_ref().map(|record| record.role)
    }

    pub fn contact_phone(&self) -> Option<&str> {
        self.contact_phone.as_deref()
    }
}

/// Optional from/to pair collected for sub-categories that need dates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl DateRange {
    pub fn between(from: NaiveDate, to: NaiveDate) -> Self {
        Self {
            from: Some(from),
            to: Some(to),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.from.is_some() && self.to.is_some()
    }

    pub fn is_inverted(&self) -> bool {
        matches!((self.from, self.to), (Some(from), Some(to)) if from > to)
    }

    /// Fill a missing start date, leaving a supplied one untouched.
    pub fn with_default_from(self, today: NaiveDate) -> Self {
        Self {
            from: self.from.or(Some(today)),
            to: self.to,
        }
    }
}

/// Category choice made on the form. An empty string means "not selected".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySelection {
    #[serde(default)]
    pub top_category: String,
    #[serde(default)]
    pub sub_category: Option<String>,
}

impl CategorySelection {
    pub fn new(top_category: impl Into<String>, sub_category: Option<&str>) -> Self {
        Self {
            top_category: top_category.into(),
            sub_category: sub_category.map(str::to_string),
        }
    }

    /// The sub-category if one was actually picked.
    pub fn chosen_sub_category(&self) -> Option<&str> {
        self.sub_category
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }
}

/// Role-prefixed identifier issued for a stored request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(pub String);

impl RequestId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One stored request. Appended once, never rewritten.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestRecord {
    pub id: RequestId,
    pub name: String,
    pub gender: String,
    pub email: String,
    pub phone: String,
    pub role: VolunteerRole,
    pub top_category: String,
    pub sub_category: Option<String>,
    pub from_date: Option<NaiveDate>,
    pub to_date: Option<NaiveDate>,
    pub description: String,
    pub submitted_at: NaiveDateTime,
}

impl RequestRecord {
    /// Cells in request log column order.
    pub fn to_row(&self) -> [String; 12] {
        [
            self.id.0.clone(),
            self.name.clone(),
            self.gender.clone(),
            self.email.clone(),
            self.phone.clone(),
            self.role.label().to_string(),
            self.top_category.clone(),
            self.sub_category
                .clone()
                .unwrap_or_else(|| EMPTY_CELL.to_string()),
            date_cell(self.from_date),
            date_cell(self.to_date),
            self.description.clone(),
            self.submitted_at.format(TIMESTAMP_CELL_FORMAT).to_string(),
        ]
    }
}

fn date_cell(date: Option<NaiveDate>) -> String {
    date.map(|value| value.format(DATE_CELL_FORMAT).to_string())
        .unwrap_or_else(|| EMPTY_CELL.to_string())
}
