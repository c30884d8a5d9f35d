use super::domain::VolunteerRole;

pub const SEVA_TEAM: &str = "Seva Team";
pub const HEALTH_TEAM: &str = "Health Team";
pub const ACCOMMODATION_TEAM: &str = "Accommodation Team";
pub const SAHAYA_TEAM: &str = "Sahaya (Support) Team";
pub const OTHERS: &str = "Others";

pub const MEET_SEVA_TEAM: &str = "Meet Seva Team";
pub const MEET_SAHAYA_TEAM: &str = "Meet Sahaya Team";
pub const STEP_OUT_OF_ASHRAM: &str = "Step out of Ashram";
pub const EXTENSION_REQUEST: &str = "Extension Request";

const BASE_TOP_CATEGORIES: [&str; 5] = ["", SEVA_TEAM, HEALTH_TEAM, SAHAYA_TEAM, OTHERS];

const SEVA_SUB_CATEGORIES: [&str; 7] = [
    "Seva Affecting Health",
    "Seva Change",
    "Linga Seva",
    "Devi Seva",
    "Prana Danam",
    "Adi Yogi Arpanam",
    OTHERS,
];

const SAHAYA_SUB_CATEGORIES: [&str; 5] = [
    MEET_SAHAYA_TEAM,
    STEP_OUT_OF_ASHRAM,
    "3 days Silence",
    EXTENSION_REQUEST,
    OTHERS,
];

const DATE_RANGE_SUB_CATEGORIES: [&str; 7] = [
    "Linga Seva",
    "Devi Seva",
    "Prana Danam",
    "Adi Yogi Arpanam",
    STEP_OUT_OF_ASHRAM,
    "3 days Silence",
    EXTENSION_REQUEST,
];

/// Template key of the notice shown once "Step out of Ashram" is picked.
pub const STEP_OUT_NOTICE: &str = "step_out_notice";

/// Fixed, role-conditional category table.
#[derive(Debug, Clone, Copy, Default)]
pub struct CategoryRuleEngine;

impl CategoryRuleEngine {
    /// Options for the first dropdown, starting with the unselected sentinel `""`.
    pub fn top_categories(&self, role: VolunteerRole) -> Vec<&'static str> {
        let mut options = BASE_TOP_CATEGORIES.to_vec();
        if role == VolunteerRole::LongTermSupport {
            options.insert(2, ACCOMMODATION_TEAM);
        }
        options
    }

    /// Second-level options. Empty means the sub-category step is skipped.
    pub fn sub_categories_for(&self, role: VolunteerRole, top_category: &str) -> Vec<&'static str> {
        match (top_category, role) {
            (SEVA_TEAM, VolunteerRole::LongTermSupport) => std::iter::once(MEET_SEVA_TEAM)
                .chain(SEVA_SUB_CATEGORIES)
                .collect(),
            (SEVA_TEAM, _) => SEVA_SUB_CATEGORIES.to_vec(),
            (SAHAYA_TEAM, VolunteerRole::LongTermSupport) => SAHAYA_SUB_CATEGORIES.to_vec(),
            _ => Vec::new(),
        }
    }

    pub fn requires_date_range(&self, sub_category: &str) -> bool {
        DATE_RANGE_SUB_CATEGORIES.contains(&sub_category)
    }

    /// Sub-categories whose start date may be filled with "today" by the caller.
    ///
    /// An extension only has a meaningful end date, but still travels as a from/to pair.
    pub fn defaults_start_to_today(&self, sub_category: &str) -> bool {
        sub_category == EXTENSION_REQUEST
    }

    pub fn notice_for(&self, sub_category: &str) -> Option<&'static str> {
        (sub_category == STEP_OUT_OF_ASHRAM).then_some(STEP_OUT_NOTICE)
    }
}
