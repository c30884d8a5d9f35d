//! Terminal rendition of the intake form.
//!
//! Each entry walks the same steps as the web form: identify, pick a request type, pick a
//! sub-category when the type has one, give dates when the sub-category needs them, describe
//! the request, submit. The form then pauses and resets for the next person.

use crate::infra::{open_csv_session, parse_date};
use chrono::NaiveDate;
use clap::Args;
use request_intake::config::AppConfig;
use request_intake::error::AppError;
use request_intake::intake::{
    apply_selection, FormEvent, FormState, IntakeError, IntakeSession, PhoneInput, Rejection,
    RequestId, RequestStore, SubmissionReceipt, Submitter,
};
use request_intake::telemetry;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

#[derive(Args, Debug, Default)]
pub(crate) struct ConsoleArgs {
    /// Stop after the first stored request
    #[arg(long)]
    pub(crate) once: bool,
    /// Reset the form immediately instead of waiting INTAKE_RESET_PAUSE_SECS
    #[arg(long)]
    pub(crate) no_pause: bool,
    /// Override the configured roster CSV
    #[arg(long)]
    pub(crate) roster: Option<PathBuf>,
    /// Override the configured request log CSV
    #[arg(long)]
    pub(crate) requests: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum EntryOutcome {
    Submitted(RequestId),
    /// The submitter could not be verified; the form starts over.
    Retry,
    /// Input ended.
    Closed,
}

/// One prompt group of the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    TopCategory,
    SubCategory,
    Dates,
    Description,
}

impl Field {
    const ORDER: [Field; 4] = [
        Field::TopCategory,
        Field::SubCategory,
        Field::Dates,
        Field::Description,
    ];

    /// Field to ask again after `rejection`; `None` when only a new identity helps.
    fn named_by(rejection: &Rejection) -> Option<Field> {
        match rejection {
            Rejection::Unverified => None,
            Rejection::MissingTopCategory | Rejection::UnknownTopCategory { .. } => {
                Some(Field::TopCategory)
            }
            Rejection::MissingSubCategory | Rejection::UnknownSubCategory { .. } => {
                Some(Field::SubCategory)
            }
            Rejection::MissingDateRange | Rejection::InvertedDateRange => Some(Field::Dates),
            Rejection::MissingDescription => Some(Field::Description),
        }
    }
}

pub(crate) fn run_console(args: ConsoleArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    if let Some(path) = args.roster {
        config.intake.roster_csv = path;
    }
    if let Some(path) = args.requests {
        config.intake.requests_csv = path;
    }

    let session = open_csv_session(&config.intake)?;
    let pause = if args.no_pause {
        Duration::ZERO
    } else {
        config.intake.reset_pause
    };

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    let mut console = Console {
        session: &session,
        input: stdin.lock(),
        output: stdout.lock(),
        default_region: config.intake.default_region.clone(),
        pause,
    };

    loop {
        match console.run_entry()? {
            EntryOutcome::Submitted(_) if args.once => break,
            EntryOutcome::Closed => break,
            EntryOutcome::Submitted(_) | EntryOutcome::Retry => {}
        }
    }
    Ok(())
}

pub(crate) struct Console<'a, S, R, W> {
    pub(crate) session: &'a IntakeSession<S>,
    pub(crate) input: R,
    pub(crate) output: W,
    pub(crate) default_region: String,
    pub(crate) pause: Duration,
}

impl<'a, S, R, W> Console<'a, S, R, W>
where
    S: RequestStore + 'static,
    R: BufRead,
    W: Write,
{
    pub(crate) fn run_entry(&mut self) -> Result<EntryOutcome, AppError> {
        writeln!(self.output, "\nVolunteer request form")?;

        let Some(submitter) = self.identify()? else {
            return Ok(EntryOutcome::Closed);
        };
        let Some(record) = submitter.record() else {
            writeln!(self.output, "{}", Rejection::Unverified)?;
            return Ok(EntryOutcome::Retry);
        };
        writeln!(self.output, "Welcome, {} ({})", record.name, record.role)?;

        let mut form = self.session.form_for(&submitter);
        for field in Field::ORDER {
            let Some(next) = self.ask(field, form)? else {
                return Ok(EntryOutcome::Closed);
            };
            form = next;
        }

        // Rejected entries keep the identity and answers; only the named field is asked again.
        loop {
            let rejection = match self.session.submit_form(&submitter, &form) {
                Ok(receipt) => return self.confirm(receipt),
                Err(IntakeError::Rejected(rejection)) => rejection,
                Err(other) => return Err(other.into()),
            };
            writeln!(self.output, "{rejection}")?;

            let Some(field) = Field::named_by(&rejection) else {
                return Ok(EntryOutcome::Retry);
            };
            let Some(next) = self.ask(field, form)? else {
                return Ok(EntryOutcome::Closed);
            };
            form = next;
        }
    }

    /// Email first, then the phone fallback when the email is blank or not on the roster.
    /// `None` once input is exhausted.
    fn identify(&mut self) -> Result<Option<Submitter>, AppError> {
        let Some(email) = self.prompt("Email ID (blank to use phone): ")? else {
            return Ok(None);
        };

        let submitter = self.session.resolve_submitter(Some(email.as_str()), None);
        if submitter.record().is_some() {
            return Ok(Some(submitter));
        }
        if !email.is_empty() {
            writeln!(
                self.output,
                "Email ID not found. Verify with your phone number instead."
            )?;
        }

        let label = format!("Phone region or calling code [{}]: ", self.default_region);
        let Some(region) = self.prompt(&label)? else {
            return Ok(None);
        };
        let Some(number) = self.prompt("Phone number: ")? else {
            return Ok(None);
        };
        let region = if region.is_empty() {
            self.default_region.clone()
        } else {
            region
        };

        let phone = PhoneInput { region, number };
        Ok(Some(
            self.session
                .resolve_submitter(Some(email.as_str()), Some(&phone)),
        ))
    }

    /// Fields hidden for the current selection pass the form through untouched.
    fn ask(&mut self, field: Field, form: FormState) -> Result<Option<FormState>, AppError> {
        let view = form.view();
        let form = match field {
            Field::TopCategory => {
                let Some(top) = self.choose("Request Type", &view.top_categories)? else {
                    return Ok(None);
                };
                apply_selection(form, FormEvent::SelectTopCategory(top.to_string()))
            }
            Field::SubCategory if view.show_sub_category => {
                let Some(sub) = self.choose("Sub Category", &view.sub_categories)? else {
                    return Ok(None);
                };
                if let Some(notice) = self.session.notice_for(sub) {
                    writeln!(self.output, "Note: {notice}")?;
                }
                apply_selection(form, FormEvent::SelectSubCategory(sub.to_string()))
            }
            Field::Dates if view.show_date_range => {
                let Some(from) = self.prompt_date("From date (YYYY-MM-DD or DD/MM/YYYY): ")? else {
                    return Ok(None);
                };
                let Some(to) = self.prompt_date("To date (YYYY-MM-DD or DD/MM/YYYY): ")? else {
                    return Ok(None);
                };
                let form = apply_selection(form, FormEvent::SetFromDate(from));
                apply_selection(form, FormEvent::SetToDate(to))
            }
            Field::Description => {
                let Some(description) = self.prompt("Description: ")? else {
                    return Ok(None);
                };
                apply_selection(form, FormEvent::SetDescription(description))
            }
            Field::SubCategory | Field::Dates => form,
        };
        Ok(Some(form))
    }

    fn confirm(&mut self, receipt: SubmissionReceipt) -> Result<EntryOutcome, AppError> {
        writeln!(self.output, "\n{}", receipt.message)?;
        if !self.pause.is_zero() {
            writeln!(
                self.output,
                "The form will reset in {} seconds.",
                self.pause.as_secs()
            )?;
            self.output.flush()?;
            std::thread::sleep(self.pause);
        }
        info!(request_id = %receipt.request_id, "console entry stored");
        Ok(EntryOutcome::Submitted(receipt.request_id))
    }

    /// One trimmed line, or `None` once input is exhausted.
    fn prompt(&mut self, label: &str) -> Result<Option<String>, AppError> {
        write!(self.output, "{label}")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    /// A blank answer leaves the date unset.
    fn prompt_date(&mut self, label: &str) -> Result<Option<Option<NaiveDate>>, AppError> {
        loop {
            let Some(raw) = self.prompt(label)? else {
                return Ok(None);
            };
            if raw.is_empty() {
                return Ok(Some(None));
            }
            match parse_date(&raw) {
                Ok(date) => return Ok(Some(Some(date))),
                Err(message) => writeln!(self.output, "{message}")?,
            }
        }
    }

    /// Accepts the option's number or its exact text.
    fn choose(
        &mut self,
        label: &str,
        options: &[&'static str],
    ) -> Result<Option<&'static str>, AppError> {
        let options: Vec<&'static str> = options
            .iter()
            .copied()
            .filter(|option| !option.is_empty())
            .collect();

        writeln!(self.output, "{label}:")?;
        for (index, option) in options.iter().enumerate() {
            writeln!(self.output, "  {}. {option}", index + 1)?;
        }

        loop {
            let Some(answer) = self.prompt("> ")? else {
                return Ok(None);
            };
            let picked = answer
                .parse::<usize>()
                .ok()
                .and_then(|number| number.checked_sub(1))
                .and_then(|index| options.get(index).copied())
                .or_else(|| options.iter().copied().find(|option| *option == answer));
            match picked {
                Some(option) => return Ok(Some(option)),
                None => writeln!(self.output, "Please pick one of the listed options.")?,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::{InMemoryRequestLog, InMemoryRoster};
    use request_intake::intake::{
        IntakeSettings, MessageTemplates, RosterRecord, VolunteerRole,
    };
    use std::io::Cursor;
    use std::sync::Arc;

    fn session(log: Arc<InMemoryRequestLog>) -> IntakeSession<InMemoryRequestLog> {
        let roster = InMemoryRoster::new(vec![RosterRecord {
            email: "a@x.com".to_string(),
            phone: "9876543210".to_string(),
            name: "Anu".to_string(),
            role: VolunteerRole::LongTermSupport,
            gender: "Female".to_string(),
        }]);
        IntakeSession::open(&roster, log, MessageTemplates::builtin(), IntakeSettings::default())
            .expect("session opens")
    }

    fn run(script: &str, log: Arc<InMemoryRequestLog>) -> (Vec<EntryOutcome>, String) {
        let session = session(log);
        let mut console = Console {
            session: &session,
            input: Cursor::new(script.as_bytes().to_vec()),
            output: Vec::new(),
            default_region: "IN".to_string(),
            pause: Duration::ZERO,
        };

        let mut outcomes = Vec::new();
        loop {
            let outcome = console.run_entry().expect("entry runs");
            let closed = outcome == EntryOutcome::Closed;
            outcomes.push(outcome);
            if closed {
                break;
            }
        }
        let output = String::from_utf8(console.output).expect("utf8 output");
        (outcomes, output)
    }

    #[test]
    fn step_out_entry_is_stored_with_notice_and_confirmation() {
        let log = Arc::new(InMemoryRequestLog::default());
        // Sahaya is the fourth listed type for long term support; Step out is its second sub.
        let script = "a@x.com\n4\nplease\n2\n01/05/2025\n2025-05-04\nVisiting family\n";
        let (outcomes, output) = run(script, log.clone());

        assert_eq!(
            outcomes,
            vec![
                EntryOutcome::Submitted(RequestId("REQ-LTV00001".to_string())),
                EntryOutcome::Closed,
            ]
        );
        assert!(output.contains("Welcome, Anu (Long Term Department Support)"));
        assert!(output.contains("Please pick one of the listed options."));
        assert!(output.contains("Note: Please raise the request at least 72 hrs"));
        assert!(output.contains("Your request ID: REQ-LTV00001"));

        let rows = log.rows().expect("rows");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].sub_category.as_deref(), Some("Step out of Ashram"));
    }

    #[test]
    fn unknown_email_falls_back_to_phone_prompt() {
        let log = Arc::new(InMemoryRequestLog::default());
        let script = "unknown@x.com\n\n9876543210\n4\n2\n01/05/2025\n2025-05-04\nVisiting family\n";
        let (outcomes, output) = run(script, log.clone());

        assert_eq!(
            outcomes,
            vec![
                EntryOutcome::Submitted(RequestId("REQ-LTV00001".to_string())),
                EntryOutcome::Closed,
            ]
        );
        assert!(output.contains("Email ID not found. Verify with your phone number instead."));
        assert!(output.contains("Phone region or calling code [IN]: "));
        assert!(output.contains("Welcome, Anu"));
        assert_eq!(log.rows().expect("rows").len(), 1);
    }

    #[test]
    fn rejected_field_is_asked_again_without_restarting() {
        let log = Arc::new(InMemoryRequestLog::default());
        let script = "\n+91\n9000000000\na@x.com\nHealth Team\n \nFeeling unwell\n";
        let (outcomes, output) = run(script, log.clone());

        assert_eq!(
            outcomes,
            vec![
                EntryOutcome::Retry,
                EntryOutcome::Submitted(RequestId("REQ-LTV00001".to_string())),
                EntryOutcome::Closed,
            ]
        );
        assert!(output.contains("Please enter a valid Email ID or Phone Number."));
        assert!(output.contains("Please enter a description."));
        // unverified entry, the corrected entry, and the closing prompt
        assert_eq!(output.matches("Email ID (blank to use phone): ").count(), 3);
        assert_eq!(output.matches("Request Type:").count(), 1);

        let rows = log.rows().expect("rows");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].description, "Feeling unwell");
    }

    #[test]
    fn date_rejections_only_ask_for_dates_again() {
        let log = Arc::new(InMemoryRequestLog::default());
        let script = "a@x.com\n4\n2\n\n\nVisiting family\n2025-05-04\n2025-05-01\n2025-05-01\n2025-05-04\n";
        let (outcomes, output) = run(script, log.clone());

        assert_eq!(
            outcomes,
            vec![
                EntryOutcome::Submitted(RequestId("REQ-LTV00001".to_string())),
                EntryOutcome::Closed,
            ]
        );
        assert!(output.contains("Please select both the From and To dates."));
        assert!(output.contains("The To date cannot be before the From date."));
        assert_eq!(output.matches("Description: ").count(), 1);

        let rows = log.rows().expect("rows");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].description, "Visiting family");
    }
}
