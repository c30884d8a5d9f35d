use serde::Serialize;

use super::categories::CategoryRuleEngine;
use super::domain::{CategorySelection, DateRange, Submitter};

/// Why a submission was blocked. The `Display` text is the inline message shown to users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum Rejection {
    #[error("Please enter a valid Email ID or Phone Number.")]
    Unverified,
    #[error("Please select a Request Type.")]
    MissingTopCategory,
    #[error("'{top_category}' is not available for your volunteer category.")]
    UnknownTopCategory { top_category: String },
    #[error("Please select a Sub Category.")]
    MissingSubCategory,
    #[error("'{sub_category}' is not a valid Sub Category for '{top_category}'.")]
    UnknownSubCategory {
        top_category: String,
        sub_category: String,
    },
    #[error("Please select both the From and To dates.")]
    MissingDateRange,
    #[error("The To date cannot be before the From date.")]
    InvertedDateRange,
    #[error("Please enter a description.")]
    MissingDescription,
}

impl Rejection {
    pub const fn code(&self) -> &'static str {
        match self {
            Rejection::Unverified => "unverified",
            Rejection::MissingTopCategory => "missing_top_category",
            Rejection::UnknownTopCategory { .. } => "unknown_top_category",
            Rejection::MissingSubCategory => "missing_sub_category",
            Rejection::UnknownSubCategory { .. } => "unknown_sub_category",
            Rejection::MissingDateRange => "missing_date_range",
            Rejection::InvertedDateRange => "inverted_date_range",
            Rejection::MissingDescription => "missing_description",
        }
    }
}

/// Gate run before an id is allocated. Checks run in a fixed order and the first failure
/// is reported.
#[derive(Debug, Clone, Copy, Default)]
pub struct SubmissionValidator {
    rules: CategoryRuleEngine,
}

impl SubmissionValidator {
    pub fn new(rules: CategoryRuleEngine) -> Self {
        Self { rules }
    }

    pub fn validate(
        &self,
        submitter: &Submitter,
        selection: &CategorySelection,
        dates: &DateRange,
        description: &str,
    ) -> Result<(), Rejection> {
        let Some(role) = submitter.role().filter(|_| submitter.is_verified()) else {
            return Err(Rejection::Unverified);
        };

        let top_category = selection.top_category.trim();
        if top_category.is_empty() {
            return Err(Rejection::MissingTopCategory);
        }
        if !self.rules.top_categories(role).contains(&top_category) {
            return Err(Rejection::UnknownTopCategory {
                top_category: top_category.to_string(),
            });
        }

        let allowed = self.rules.sub_categories_for(role, top_category);
        let sub_category = selection.chosen_sub_category();
        match sub_category {
            None if !allowed.is_empty() => return Err(Rejection::MissingSubCategory),
            Some(sub) if !allowed.contains(&sub) => {
                return Err(Rejection::UnknownSubCategory {
                    top_category: top_category.to_string(),
                    sub_category: sub.to_string(),
                })
            }
            _ => {}
        }

        if sub_category.is_some_and(|sub| self.rules.requires_date_range(sub)) {
            if !dates.is_complete() {
                return Err(Rejection::MissingDateRange);
            }
            if dates.is_inverted() {
                return Err(Rejection::InvertedDateRange);
            }
        }

        if description.trim().is_empty() {
            return Err(Rejection::MissingDescription);
        }

        Ok(())
    }
}
