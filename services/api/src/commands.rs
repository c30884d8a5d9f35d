use crate::infra::{open_csv_session, parse_date, parse_role};
use chrono::NaiveDate;
use clap::Args;
use request_intake::config::AppConfig;
use request_intake::error::AppError;
use request_intake::intake::{
    CategoryRuleEngine, CategorySelection, DateRange, PhoneInput, RequestDraft, VolunteerRole,
};
use request_intake::telemetry;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct CategoriesArgs {
    /// Volunteer role (ashram_volunteer, short_term_support, long_term_support, other)
    #[arg(long, value_parser = parse_role)]
    pub(crate) role: VolunteerRole,
    /// Show the sub-categories of this top-level category
    #[arg(long)]
    pub(crate) top_category: Option<String>,
}

#[derive(Args, Debug)]
pub(crate) struct SubmitArgs {
    /// Roster email of the submitter
    #[arg(long)]
    pub(crate) email: Option<String>,
    /// Phone number to verify with when the email is unknown
    #[arg(long)]
    pub(crate) phone: Option<String>,
    /// Region or calling code for --phone (defaults to INTAKE_DEFAULT_REGION)
    #[arg(long)]
    pub(crate) region: Option<String>,
    /// Top-level request category
    #[arg(long)]
    pub(crate) top_category: String,
    /// Sub-category, when the top-level category has one
    #[arg(long)]
    pub(crate) sub_category: Option<String>,
    /// First day of the requested period (YYYY-MM-DD or DD/MM/YYYY)
    #[arg(long, value_parser = parse_date)]
    pub(crate) from: Option<NaiveDate>,
    /// Last day of the requested period (YYYY-MM-DD or DD/MM/YYYY)
    #[arg(long, value_parser = parse_date)]
    pub(crate) to: Option<NaiveDate>,
    /// Free-text description of the request
    #[arg(long)]
    pub(crate) description: String,
    /// Override the configured roster CSV
    #[arg(long)]
    pub(crate) roster: Option<PathBuf>,
    /// Override the configured request log CSV
    #[arg(long)]
    pub(crate) requests: Option<PathBuf>,
}

pub(crate) fn run_categories(args: CategoriesArgs) -> Result<(), AppError> {
    let rules = CategoryRuleEngine;
    let CategoriesArgs { role, top_category } = args;

    println!("Request types for {role}");
    for top in rules.top_categories(role).into_iter().filter(|top| !top.is_empty()) {
        println!("- {top}");
    }

    if let Some(top) = top_category {
        let subs = rules.sub_categories_for(role, &top);
        if subs.is_empty() {
            println!("\n{top} has no sub-categories for {role}");
        } else {
            println!("\nSub-categories of {top}");
            for sub in subs {
                let marker = if rules.requires_date_range(sub) {
                    " (from/to dates required)"
                } else {
                    ""
                };
                println!("- {sub}{marker}");
            }
        }
    }

    Ok(())
}

pub(crate) fn run_submit(args: SubmitArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let SubmitArgs {
        email,
        phone,
        region,
        top_category,
        sub_category,
        from,
        to,
        description,
        roster,
        requests,
    } = args;

    if let Some(path) = roster {
        config.intake.roster_csv = path;
    }
    if let Some(path) = requests {
        config.intake.requests_csv = path;
    }

    let session = open_csv_session(&config.intake)?;
    let region = region.unwrap_or_else(|| config.intake.default_region.clone());
    let draft = RequestDraft {
        email,
        phone: phone.map(|number| PhoneInput { region, number }),
        selection: CategorySelection {
            top_category,
            sub_category,
        },
        dates: DateRange { from, to },
        description,
    };

    let receipt = session.submit_draft(draft)?;
    println!("{}", receipt.message);
    if receipt.degraded {
        eprintln!(
            "warning: request id {} is a fallback id and may not be unique",
            receipt.request_id
        );
    }
    Ok(())
}
