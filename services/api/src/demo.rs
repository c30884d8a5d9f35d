use crate::infra::{InMemoryRequestLog, InMemoryRoster};
use clap::Args;
use request_intake::error::AppError;
use request_intake::intake::{
    apply_selection, CategorySelection, DateRange, FormEvent, IntakeError, IntakeSession,
    IntakeSettings, MessageTemplates, PhoneInput, RequestRecord, RosterRecord, VolunteerRole,
};
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Print the stored request log rows at the end of the demo
    #[arg(long)]
    pub(crate) show_rows: bool,
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let log = Arc::new(InMemoryRequestLog::default());
    let session = IntakeSession::open(
        &InMemoryRoster::new(demo_roster()),
        log.clone(),
        MessageTemplates::builtin(),
        IntakeSettings::default(),
    )?;

    println!("Volunteer request intake demo");
    println!("Roster loaded with {} volunteers", session.roster_size());

    println!("\nRequest types by role");
    for role in VolunteerRole::ordered() {
        let tops: Vec<&str> = session
            .rules()
            .top_categories(role)
            .into_iter()
            .filter(|top| !top.is_empty())
            .collect();
        println!("- {role}: {}", tops.join(", "));
    }

    println!("\nIdentity checks");
    let by_email = session.resolve(Some("anu@example.org"), None);
    println!(
        "- anu@example.org -> found={} via {:?}",
        by_email.found, by_email.verified_via
    );
    let phone = PhoneInput {
        region: "IN".to_string(),
        number: "098123 45678".to_string(),
    };
    let by_phone = session.resolve(None, Some(&phone));
    println!(
        "- phone 098123 45678 (IN) -> found={} via {:?} as {}",
        by_phone.found,
        by_phone.verified_via,
        by_phone.matched_phone.as_deref().unwrap_or("-")
    );
    let stranger = session.resolve(Some("guest@example.org"), None);
    println!("- guest@example.org -> found={}", stranger.found);

    println!("\nStep out request from a long term volunteer");
    let anu = session.resolve_submitter(Some("anu@example.org"), None);
    let today = chrono::Local::now().date_naive();
    let form = [
        FormEvent::SelectTopCategory("Sahaya (Support) Team".to_string()),
        FormEvent::SelectSubCategory("Step out of Ashram".to_string()),
        FormEvent::SetFromDate(Some(today + chrono::Duration::days(4))),
        FormEvent::SetToDate(Some(today + chrono::Duration::days(6))),
        FormEvent::SetDescription("Attending a family wedding in Coimbatore".to_string()),
    ]
    .into_iter()
    .fold(session.form_for(&anu), apply_selection);
    let notice = form
        .selection
        .chosen_sub_category()
        .and_then(|sub| session.notice_for(sub));
    if let Some(notice) = notice {
        println!("Notice: {notice}");
    }
    let receipt = session.submit_form(&anu, &form)?;
    println!("{}", receipt.message);

    println!("\nExtension request without a start date");
    let receipt = session.submit(
        &anu,
        &CategorySelection::new("Sahaya (Support) Team", Some("Extension Request")),
        DateRange {
            from: None,
            to: Some(today + chrono::Duration::days(30)),
        },
        "Extending my stay by a month",
    )?;
    println!("{}", receipt.message);

    println!("\nIncomplete request");
    let bala = session.resolve_submitter(None, Some(&phone));
    match session.submit(
        &bala,
        &CategorySelection::new("Seva Team", None),
        DateRange::default(),
        "Would like a different seva",
    ) {
        Err(IntakeError::Rejected(rejection)) => {
            println!("Rejected ({}): {rejection}", rejection.code())
        }
        Ok(receipt) => println!("unexpectedly stored {}", receipt.request_id),
        Err(other) => return Err(other.into()),
    }

    let receipt = session.submit(
        &bala,
        &CategorySelection::new("Seva Team", Some("Seva Change")),
        DateRange::default(),
        "Would like a different seva",
    )?;
    println!("Resubmitted: {}", receipt.message);

    let rows = log.rows().map_err(IntakeError::from)?;
    println!("\nStored {} requests", rows.len());
    if args.show_rows {
        for row in &rows {
            print_row(row);
        }
    }

    Ok(())
}

fn print_row(row: &RequestRecord) {
    println!("  {}", row.to_row().join(" | "));
}

fn demo_roster() -> Vec<RosterRecord> {
    vec![
        RosterRecord {
            email: "anu@example.org".to_string(),
            phone: "98765 43210".to_string(),
            name: "Anu".to_string(),
            role: VolunteerRole::LongTermSupport,
            gender: "Female".to_string(),
        },
        RosterRecord {
            email: "bala@example.org".to_string(),
            phone: "+91 98123 45678".to_string(),
            name: "Bala".to_string(),
            role: VolunteerRole::AshramVolunteer,
            gender: "Male".to_string(),
        },
        RosterRecord {
            email: "chen@example.org".to_string(),
            phone: "+65 8123 4567".to_string(),
            name: "Chen".to_string(),
            role: VolunteerRole::ShortTermSupport,
            gender: "Male".to_string(),
        },
    ]
}
