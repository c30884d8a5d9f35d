//! End-to-end intake scenarios against CSV files on disk.
//!
//! Each scenario opens a session over a roster export and a request log in a temporary
//! directory, submits through the public session API or HTTP router, and inspects the
//! rows that land in the log.

mod common {
    use std::path::{Path, PathBuf};
    use std::sync::Arc;

    use request_intake::intake::{
        CsvRequestLog, CsvRoster, IntakeSession, IntakeSettings, MessageTemplates,
    };

    pub(super) const ROSTER: &str = "\
Name,Email ID,Phone Number,Volunteer Category,Gender
Anu,a@x.com,9876543210,Long Term Department Support,Female
Bala,b@x.com,+91 98123 45678,Ashram Volunteer,Male
Chitra,c@x.com,9000000001,Short Term Department Support,Female
";

    pub(super) struct Workspace {
        pub(super) dir: tempfile::TempDir,
    }

    impl Workspace {
        pub(super) fn new(existing_log: Option<&str>) -> Self {
            let dir = tempfile::tempdir().expect("temp dir");
            std::fs::write(dir.path().join("roster.csv"), ROSTER).expect("write roster");
            if let Some(contents) = existing_log {
                std::fs::write(dir.path().join("requests.csv"), contents).expect("write log");
            }
            Self { dir }
        }

        pub(super) fn log_path(&self) -> PathBuf {
            self.dir.path().join("requests.csv")
        }

        pub(super) fn roster_path(&self) -> PathBuf {
            self.dir.path().join("roster.csv")
        }

        pub(super) fn open(&self) -> IntakeSession<CsvRequestLog> {
            IntakeSession::open(
                &CsvRoster::new(self.roster_path()),
                Arc::new(CsvRequestLog::new(self.log_path())),
                MessageTemplates::builtin(),
                IntakeSettings::default(),
            )
            .expect("session opens")
        }

        pub(super) fn log_rows(&self) -> Vec<Vec<String>> {
            read_rows(&self.log_path())
        }
    }

    pub(super) fn read_rows(path: &Path) -> Vec<Vec<String>> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(path)
            .expect("log readable");
        reader
            .records()
            .map(|row| {
                row.expect("row parses")
                    .iter()
                    .map(str::to_string)
                    .collect()
            })
            .collect()
    }
}

use std::sync::Arc;

use axum::http::StatusCode;
use chrono::NaiveDate;
use common::*;
use request_intake::intake::{
    request_router, CategorySelection, CsvRequestLog, CsvRoster, DateRange, IntakeError,
    IntakeSession, IntakeSettings, MessageTemplates, Rejection, StoreError,
};
use serde_json::{json, Value};
use tower::ServiceExt;

fn date(month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, month, day).expect("valid date")
}

#[test]
fn step_out_request_is_appended_in_column_order() {
    let workspace = Workspace::new(None);
    let session = workspace.open();

    let submitter = session.resolve_submitter(Some("a@x.com"), None);
    let receipt = session
        .submit_at(
            &submitter,
            &CategorySelection::new("Sahaya (Support) Team", Some("Step out of Ashram")),
            DateRange::between(date(5, 1), date(5, 4)),
            "Visiting family, back Sunday",
            date(4, 20).and_hms_micro_opt(9, 15, 0, 42).expect("valid time"),
        )
        .expect("stored");

    assert_eq!(receipt.request_id.as_str(), "REQ-LTV00001");
    assert!(receipt.message.ends_with("Your request ID: REQ-LTV00001"));

    let rows = workspace.log_rows();
    assert_eq!(
        rows,
        vec![vec![
            "REQ-LTV00001",
            "Anu",
            "Female",
            "a@x.com",
            "9876543210",
            "Long Term Department Support",
            "Sahaya (Support) Team",
            "Step out of Ashram",
            "01/05/2025",
            "04/05/2025",
            "Visiting family, back Sunday",
            "2025-04-20 09:15:00.000042",
        ]]
    );
}

#[test]
fn existing_log_seeds_the_allocator_and_a_reopened_session_continues() {
    let workspace = Workspace::new(Some(
        "REQ-AV00001,Bala,Male,b@x.com,+919812345678,Ashram Volunteer,Health Team,None,None,None,Cold,2025-04-01 10:00:00.000000\n\
REQ-AV00003,Bala,Male,b@x.com,+919812345678,Ashram Volunteer,Health Team,None,None,None,Cough,2025-04-02 10:00:00.000000\n",
    ));

    let submit = |session: &IntakeSession<CsvRequestLog>| {
        let submitter = session.resolve_submitter(None, None);
        assert!(!submitter.is_verified());
        let submitter = session.resolve_submitter(Some("b@x.com"), None);
        session
            .submit(
                &submitter,
                &CategorySelection::new("Health Team", None),
                DateRange::default(),
                "Fever",
            )
            .expect("stored")
            .request_id
    };

    assert_eq!(submit(&workspace.open()).as_str(), "REQ-AV00002");
    assert_eq!(submit(&workspace.open()).as_str(), "REQ-AV00004");

    let ids: Vec<String> = workspace
        .log_rows()
        .into_iter()
        .map(|row| row[0].clone())
        .collect();
    assert_eq!(ids, ["REQ-AV00001", "REQ-AV00003", "REQ-AV00002", "REQ-AV00004"]);
}

#[test]
fn rejected_submission_leaves_no_log_file() {
    let workspace = Workspace::new(None);
    let session = workspace.open();
    let submitter = session.resolve_submitter(Some("c@x.com"), None);

    let result = session.submit(
        &submitter,
        &CategorySelection::new("Seva Team", None),
        DateRange::default(),
        "Need a change",
    );

    assert!(matches!(
        result,
        Err(IntakeError::Rejected(Rejection::MissingSubCategory))
    ));
    assert!(!workspace.log_path().exists());
}

#[test]
fn missing_roster_stops_the_session() {
    let workspace = Workspace::new(None);
    let result = IntakeSession::open(
        &CsvRoster::new(workspace.dir.path().join("absent.csv")),
        Arc::new(CsvRequestLog::new(workspace.log_path())),
        MessageTemplates::builtin(),
        IntakeSettings::default(),
    );
    assert!(matches!(result, Err(IntakeError::Store(StoreError::Io(_)))));
}

#[tokio::test]
async fn http_submission_by_phone_lands_in_the_log() {
    let workspace = Workspace::new(None);
    let router = request_router(Arc::new(workspace.open()));

    let payload = json!({
        "phone": { "region": "+91", "number": "90000 00001" },
        "top_category": "Seva Team",
        "sub_category": "Devi Seva",
        "dates": { "from": "2025-06-01", "to": "2025-06-10" },
        "description": "Would like to join Devi Seva",
    });
    let response = router
        .oneshot(
            axum::http::Request::post("/api/v1/requests")
                .header(axum::http::header::CONTENT_TYPE, "application/json")
                .body(axum::body::Body::from(
                    serde_json::to_vec(&payload).expect("payload serializes"),
                ))
                .expect("request builds"),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = axum::body::to_bytes(response.into_body(), 4096)
        .await
        .expect("read body");
    let body: Value = serde_json::from_slice(&body).expect("json payload");
    assert_eq!(body["request_id"], "REQ-STV00001");

    let rows = workspace.log_rows();
    assert_eq!(rows[0][3], "c@x.com");
    assert_eq!(rows[0][4], "+919000000001");
    assert_eq!(rows[0][7], "Devi Seva");
    assert_eq!(rows[0][8], "01/06/2025");
}
