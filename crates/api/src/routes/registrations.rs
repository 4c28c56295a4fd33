//! Registration queue routes.
//!
//! Writes go through the queue engine; reads go straight to the
//! registration repository.

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use domain::models::{
    authorize, Action, ListRegistrationsQuery, ListRegistrationsResponse, QueueStatus,
    RegisterForExhibitionRequest, Registration, RegistrationDetails, RejectRegistrationRequest,
    SubmitRegistrationRequest, UserIdentity,
};
use domain::services::{QueueError, RegistrationQueue};
use persistence::metrics::record_registration_transition;
use persistence::repositories::{PgQueueStore, RegistrationFilter, RegistrationRepository};
use serde::de::DeserializeOwned;
use shared::pagination::{PageRequest, Pagination};
use shared::validation::normalize_email;
use tracing::info;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::AuthenticatedUser;

const REVIEWERS_ONLY: &str = "Only clerks and admins can review registrations";

fn queue(state: &AppState) -> RegistrationQueue<PgQueueStore> {
    RegistrationQueue::with_max_attendees(
        PgQueueStore::new(state.pool.clone()),
        state.config.queue.max_attendees,
    )
}

fn require(identity: &UserIdentity, action: Action, message: &str) -> Result<(), ApiError> {
    if authorize(identity.role, action) {
        Ok(())
    } else {
        Err(ApiError::Forbidden(message.to_string()))
    }
}

/// Counts the operation, then converts the engine error for the response.
fn observe<T>(action: &'static str, result: Result<T, QueueError>) -> Result<T, ApiError> {
    match result {
        Ok(value) => {
            record_registration_transition(action, "ok");
            Ok(value)
        }
        Err(e) => {
            record_registration_transition(action, e.kind());
            Err(e.into())
        }
    }
}

/// Parses a JSON body. Syntax errors, missing fields and mistyped fields
/// are all validation errors.
fn json_body<T: DeserializeOwned>(body: &Bytes) -> Result<T, ApiError> {
    serde_json::from_slice(body)
        .map_err(|e| ApiError::Validation(format!("Invalid request body: {}", e)))
}

/// Parses an optional JSON body. An empty body yields the default value.
fn optional_json<T: DeserializeOwned + Default>(body: &Bytes) -> Result<T, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    json_body(body)
}

/// POST /api/v1/registrations
pub async fn submit_registration(
    State(state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
    body: Bytes,
) -> Result<(StatusCode, Json<Registration>), ApiError> {
    let request: SubmitRegistrationRequest = json_body(&body)?;
    request.validate()?;

    let registration = observe(
        "submit",
        queue(&state)
            .submit(&identity, request.exhibition_id, request.attendees_count)
            .await,
    )?;

    Ok((StatusCode::CREATED, Json(registration)))
}

/// POST /api/v1/exhibitions/:id/register
///
/// The body is optional; an empty body registers one attendee.
pub async fn register_for_exhibition(
    State(state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
    Path(exhibition_id): Path<i64>,
    body: Bytes,
) -> Result<(StatusCode, Json<Registration>), ApiError> {
    let request: RegisterForExhibitionRequest = optional_json(&body)?;
    request.validate()?;

    let registration = observe(
        "submit",
        queue(&state)
            .submit(&identity, exhibition_id, request.attendees_count)
            .await,
    )?;

    Ok((StatusCode::CREATED, Json(registration)))
}

/// GET /api/v1/registrations/queue-status
pub async fn queue_status(
    State(state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
) -> Result<Json<QueueStatus>, ApiError> {
    let status = queue(&state).queue_status(&identity).await?;
    Ok(Json(status))
}

/// GET /api/v1/registrations/mine
pub async fn my_registrations(
    State(state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
) -> Result<Json<Vec<RegistrationDetails>>, ApiError> {
    let repo = RegistrationRepository::new(state.pool.clone());
    let rows = repo
        .list_for_visitor_email(&normalize_email(&identity.email))
        .await?;

    Ok(Json(rows.into_iter().map(Into::into).collect()))
}

/// GET /api/v1/registrations
///
/// Reviewer listing, newest first, filterable by exhibition and status.
pub async fn list_registrations(
    State(state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
    Query(query): Query<ListRegistrationsQuery>,
) -> Result<Json<ListRegistrationsResponse>, ApiError> {
    require(
        &identity,
        Action::ListRegistrations,
        "Only clerks and admins can list registrations",
    )?;

    let page = PageRequest::new(query.page, query.per_page);
    let filter = RegistrationFilter {
        exhibition_id: query.exhibition_id,
        status: query.status.map(Into::into),
    };

    let repo = RegistrationRepository::new(state.pool.clone());
    let (rows, total) = tokio::try_join!(
        repo.list(filter, page.limit(), page.offset()),
        repo.count(filter)
    )?;

    Ok(Json(ListRegistrationsResponse {
        data: rows.into_iter().map(Into::into).collect(),
        pagination: Pagination::new(page, total),
    }))
}

/// GET /api/v1/registrations/:id
///
/// Visitors only see their own registrations; anything else is a 404.
pub async fn get_registration(
    State(state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
    Path(registration_id): Path<i64>,
) -> Result<Json<RegistrationDetails>, ApiError> {
    let repo = RegistrationRepository::new(state.pool.clone());
    let details: RegistrationDetails = repo
        .find_details_by_id(registration_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Registration not found".to_string()))?
        .into();

    let is_owner = details.visitor_email == normalize_email(&identity.email);
    if !is_owner && !authorize(identity.role, Action::ViewAnyRegistration) {
        return Err(ApiError::NotFound("Registration not found".to_string()));
    }

    Ok(Json(details))
}

/// POST /api/v1/registrations/:id/approve
pub async fn approve_registration(
    State(state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
    Path(registration_id): Path<i64>,
) -> Result<Json<Registration>, ApiError> {
    require(&identity, Action::ReviewRegistration, REVIEWERS_ONLY)?;

    let registration = observe(
        "approve",
        queue(&state).approve(registration_id, &identity).await,
    )?;

    info!(
        registration_id,
        reviewed_by = %identity.reviewer_label(),
        "Registration approved"
    );
    Ok(Json(registration))
}

/// POST /api/v1/registrations/:id/reject
pub async fn reject_registration(
    State(state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
    Path(registration_id): Path<i64>,
    body: Bytes,
) -> Result<Json<Registration>, ApiError> {
    require(&identity, Action::ReviewRegistration, REVIEWERS_ONLY)?;
    let request: RejectRegistrationRequest = optional_json(&body)?;
    request.validate()?;

    let registration = observe(
        "reject",
        queue(&state)
            .reject(registration_id, &identity, request.reason)
            .await,
    )?;

    info!(
        registration_id,
        reviewed_by = %identity.reviewer_label(),
        "Registration rejected"
    );
    Ok(Json(registration))
}

/// POST /api/v1/registrations/:id/cancel
pub async fn cancel_registration(
    State(state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
    Path(registration_id): Path<i64>,
) -> Result<Json<Registration>, ApiError> {
    let registration = observe(
        "cancel",
        queue(&state).cancel_as(registration_id, &identity).await,
    )?;

    Ok(Json(registration))
}
