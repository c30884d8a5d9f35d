use super::common::*;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use serde_json::json;
use std::sync::Arc;
use tower::ServiceExt;

use crate::intake::categories::{ACCOMMODATION_TEAM, SAHAYA_TEAM, STEP_OUT_OF_ASHRAM};
use crate::intake::domain::VolunteerRole;
use crate::intake::request_router;
use crate::intake::router::{categories_handler, submit_handler, CategoryQuery};
use crate::intake::service::RequestDraft;

fn post_json(uri: &str, payload: serde_json::Value) -> axum::http::Request<axum::body::Body> {
    axum::http::Request::post(uri)
        .header(axum::http::header::CONTENT_TYPE, "application/json")
        .body(axum::body::Body::from(
            serde_json::to_vec(&payload).expect("payload serializes"),
        ))
        .expect("request builds")
}

#[tokio::test]
async fn submit_route_creates_request() {
    let log = Arc::new(MemoryRequestLog::default());
    let router = request_router(Arc::new(open_session(log.clone())));

    let response = router
        .oneshot(post_json(
            "/api/v1/requests",
            json!({
                "email": "a@x.com",
                "top_category": SAHAYA_TEAM,
                "sub_category": STEP_OUT_OF_ASHRAM,
                "dates": { "from": "2025-05-01", "to": "2025-05-04" },
                "description": "Visiting family",
            }),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::CREATED);
    let payload = read_json_body(response).await;
    assert_eq!(payload["request_id"], "REQ-LTV00001");
    assert_eq!(payload["degraded"], false);
    assert!(payload["message"]
        .as_str()
        .expect("message")
        .contains("REQ-LTV00001"));
    assert_eq!(log.rows().len(), 1);
}

#[tokio::test]
async fn slow_store_write_leaves_the_runtime_free() {
    let (release, gate) = std::sync::mpsc::channel();
    let log = Arc::new(GatedLog::new(gate));
    let router = request_router(Arc::new(open_session(log.clone())));

    let submission = tokio::spawn(router.oneshot(post_json(
        "/api/v1/requests",
        json!({
            "email": "b@x.com",
            "top_category": "Seva Team",
            "sub_category": "Seva Change",
            "description": "Kitchen seva please",
        }),
    )));
    // Let the submission reach the store before the append is released.
    tokio::task::yield_now().await;
    release.send(()).expect("gate still open");

    let response = submission
        .await
        .expect("submission task joins")
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(log.rows().len(), 1);
}

#[tokio::test]
async fn submit_handler_returns_unprocessable_for_rejection() {
    let session = Arc::new(open_session(Arc::new(MemoryRequestLog::default())));
    let draft = RequestDraft {
        email: Some("nobody@x.com".to_string()),
        ..RequestDraft::default()
    };

    let response = submit_handler(State(session), axum::Json(draft)).await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let payload = read_json_body(response).await;
    assert_eq!(payload["reason"], "unverified");
}

#[tokio::test]
async fn submit_handler_returns_internal_error_on_store_failure() {
    let session = Arc::new(open_session(Arc::new(ReadOnlyLog)));
    let draft = RequestDraft {
        email: Some("c@x.com".to_string()),
        selection: selection("Health Team", None),
        description: "Checkup".to_string(),
        ..RequestDraft::default()
    };

    let response = submit_handler(State(session), axum::Json(draft)).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn resolve_route_reports_phone_match() {
    let router = request_router(Arc::new(open_session(Arc::new(
        MemoryRequestLog::default(),
    ))));

    let response = router
        .oneshot(post_json(
            "/api/v1/identity/resolve",
            json!({ "phone": { "region": "IN", "number": "098765 43210" } }),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["found"], true);
    assert_eq!(payload["verified_via"], "phone");
    assert_eq!(payload["matched_phone"], "+919876543210");
    assert_eq!(payload["record"]["role"], "long_term_support");
    assert_eq!(payload["top_categories"][2], ACCOMMODATION_TEAM);
}

#[tokio::test]
async fn resolve_route_reports_not_found() {
    let router = request_router(Arc::new(open_session(Arc::new(
        MemoryRequestLog::default(),
    ))));

    let response = router
        .oneshot(post_json(
            "/api/v1/identity/resolve",
            json!({ "email": "A@X.COM" }),
        ))
        .await
        .expect("route executes");

    let payload = read_json_body(response).await;
    assert_eq!(payload["found"], false);
    assert_eq!(payload["verified_via"], "none");
    assert!(payload["record"].is_null());
}

#[tokio::test]
async fn categories_handler_reports_dependent_fields() {
    let session = Arc::new(open_session(Arc::new(MemoryRequestLog::default())));
    let query = CategoryQuery {
        role: Some(VolunteerRole::LongTermSupport),
        top_category: Some(SAHAYA_TEAM.to_string()),
        sub_category: Some(STEP_OUT_OF_ASHRAM.to_string()),
    };

    let response = categories_handler(State(session), Query(query)).await;

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["sub_categories"][1], STEP_OUT_OF_ASHRAM);
    assert_eq!(payload["requires_date_range"], true);
    assert!(payload["notice"]
        .as_str()
        .expect("notice text")
        .contains("72 hrs"));
}

#[tokio::test]
async fn categories_route_parses_query_string() {
    let router = request_router(Arc::new(open_session(Arc::new(
        MemoryRequestLog::default(),
    ))));

    let response = router
        .oneshot(
            axum::http::Request::get("/api/v1/categories?role=ashram_volunteer&top_category=Seva%20Team")
                .body(axum::body::Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["role"], "ashram_volunteer");
    assert_eq!(payload["sub_categories"][0], "Seva Affecting Health");
    assert_eq!(payload["requires_date_range"], false);
    assert!(payload["notice"].is_null());
}
