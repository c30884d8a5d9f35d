//! Dependent-field state for the intake form.
//!
//! Every interaction is an event folded into the state by [`apply_selection`]; what the
//! form shows is derived from the state by [`FormState::view`].

use chrono::NaiveDate;
use serde::Serialize;

use super::categories::CategoryRuleEngine;
use super::domain::{CategorySelection, DateRange, VolunteerRole};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormEvent {
    SelectTopCategory(String),
    SelectSubCategory(String),
    SetFromDate(Option<NaiveDate>),
    SetToDate(Option<NaiveDate>),
    SetDescription(String),
    Reset,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormState {
    role: Option<VolunteerRole>,
    pub selection: CategorySelection,
    pub dates: DateRange,
    pub description: String,
}

/// Derived presentation of a [`FormState`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormView {
    pub top_categories: Vec<&'static str>,
    pub sub_categories: Vec<&'static str>,
    pub show_sub_category: bool,
    pub show_date_range: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<&'static str>,
}

impl FormState {
    /// An empty form. Without a verified role the base option set is offered.
    pub fn new(role: Option<VolunteerRole>) -> Self {
        Self {
            role,
            selection: CategorySelection::default(),
            dates: DateRange::default(),
            description: String::new(),
        }
    }

    pub fn role(&self) -> Option<VolunteerRole> {
        self.role
    }

    fn effective_role(&self) -> VolunteerRole {
        self.role.unwrap_or(VolunteerRole::Other)
    }

    pub fn view(&self) -> FormView {
        let rules = CategoryRuleEngine;
        let role = self.effective_role();
        let sub_categories = rules.sub_categories_for(role, &self.selection.top_category);
        let chosen = self.selection.chosen_sub_category();

        FormView {
            top_categories: rules.top_categories(role),
            show_sub_category: !sub_categories.is_empty(),
            sub_categories,
            show_date_range: chosen.is_some_and(|sub| rules.requires_date_range(sub)),
            notice: chosen.and_then(|sub| rules.notice_for(sub)),
        }
    }
}

/// Fold one interaction into the form.
///
/// A new top category clears the sub-category and dates; a new sub-category clears the
/// dates. Re-selecting the current value changes nothing.
pub fn apply_selection(state: FormState, event: FormEvent) -> FormState {
    match event {
        FormEvent::SelectTopCategory(top) => {
            if top == state.selection.top_category {
                return state;
            }
            FormState {
                selection: CategorySelection {
                    top_category: top,
                    sub_category: None,
                },
                dates: DateRange::default(),
                ..state
            }
        }
        FormEvent::SelectSubCategory(sub) => {
            let sub = Some(sub).filter(|value| !value.trim().is_empty());
            if sub == state.selection.sub_category {
                return state;
            }
            FormState {
                selection: CategorySelection {
                    sub_category: sub,
                    ..state.selection
                },
                dates: DateRange::default(),
                ..state
            }
        }
        FormEvent::SetFromDate(from) => FormState {
            dates: DateRange {
                from,
                ..state.dates
            },
            ..state
        },
        FormEvent::SetToDate(to) => FormState {
            dates: DateRange { to, ..state.dates },
            ..state
        },
        FormEvent::SetDescription(description) => FormState {
            description,
            ..state
        },
        FormEvent::Reset => FormState::new(state.role),
    }
}
