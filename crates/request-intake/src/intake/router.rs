use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use tracing::error;

use super::domain::{PhoneInput, VolunteerRole};
use super::repository::RequestStore;
use super::service::{IntakeError, IntakeSession, RequestDraft};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResolveRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<PhoneInput>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CategoryQuery {
    #[serde(default)]
    pub role: Option<VolunteerRole>,
    #[serde(default)]
    pub top_category: Option<String>,
    #[serde(default)]
    pub sub_category: Option<String>,
}

/// HTTP surface of an intake session: identity lookup, category options, and submission.
pub fn request_router<S>(session: Arc<IntakeSession<S>>) -> Router
where
    S: RequestStore + 'static,
{
    Router::new()
        .route("/api/v1/identity/resolve", post(resolve_handler::<S>))
        .route("/api/v1/categories", get(categories_handler::<S>))
        .route("/api/v1/requests", post(submit_handler::<S>))
        .with_state(session)
}

pub(crate) async fn resolve_handler<S>(
    State(session): State<Arc<IntakeSession<S>>>,
    Json(request): Json<ResolveRequest>,
) -> Response
where
    S: RequestStore + 'static,
{
    let resolution = session.resolve(request.email.as_deref(), request.phone.as_ref());
    let top_categories = resolution
        .record
        .as_ref()
        .map(|record| session.rules().top_categories(record.role))
        .unwrap_or_default();

    let payload = json!({
        "found": resolution.found,
        "verified_via": resolution.verified_via,
        "record": resolution.record,
        "matched_phone": resolution.matched_phone,
        "top_categories": top_categories,
    });
    (StatusCode::OK, Json(payload)).into_response()
}

pub(crate) async fn categories_handler<S>(
    State(session): State<Arc<IntakeSession<S>>>,
    Query(query): Query<CategoryQuery>,
) -> Response
where
    S: RequestStore + 'static,
{
    let role = query.role.unwrap_or(VolunteerRole::Other);
    let top_category = query.top_category.as_deref().unwrap_or_default();
    let (top_categories, sub_categories) = session.options_for(role, top_category);

    let sub_category = query
        .sub_category
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty());
    let requires_date_range =
        sub_category.is_some_and(|sub| session.rules().requires_date_range(sub));
    let notice = sub_category.and_then(|sub| session.notice_for(sub));

    let payload = json!({
        "role": role,
        "top_categories": top_categories,
        "sub_categories": sub_categories,
        "requires_date_range": requires_date_range,
        "notice": notice,
    });
    (StatusCode::OK, Json(payload)).into_response()
}

pub(crate) async fn submit_handler<S>(
    State(session): State<Arc<IntakeSession<S>>>,
    Json(draft): Json<RequestDraft>,
) -> Response
where
    S: RequestStore + 'static,
{
    // Appends are synced to disk while the allocator lock is held.
    let outcome = tokio::task::spawn_blocking(move || session.submit_draft(draft)).await;
    let result = match outcome {
        Ok(result) => result,
        Err(join_error) => {
            error!(error = %join_error, "submission task failed");
            let payload = json!({
                "error": "submission did not complete",
            });
            return (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response();
        }
    };

    match result {
        Ok(receipt) => (StatusCode::CREATED, Json(receipt)).into_response(),
        Err(IntakeError::Rejected(rejection)) => {
            let payload = json!({
                "error": rejection.to_string(),
                "reason": rejection.code(),
            });
            (StatusCode::UNPROCESSABLE_ENTITY, Json(payload)).into_response()
        }
        Err(other) => {
            let payload = json!({
                "error": other.to_string(),
            });
            (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
        }
    }
}
