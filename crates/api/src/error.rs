use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use domain::services::QueueError;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Validation error: {} invalid field(s)", .0.len())]
    InvalidFields(Vec<ValidationDetail>),

    #[error("Not eligible: {0}")]
    NotEligible(String),

    #[error("Duplicate registration: {message}")]
    DuplicateRegistration {
        message: String,
        existing_registration_id: Option<i64>,
    },

    #[error("Invalid transition: {0}")]
    InvalidTransition(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Vec<ValidationDetail>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    existing_registration_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ValidationDetail {
    pub field: String,
    pub message: String,
}

impl ApiError {
    /// Short machine-readable code placed in the `error` field.
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Unauthorized(_) => "unauthorized",
            ApiError::Forbidden(_) => "forbidden",
            ApiError::NotFound(_) => "not_found",
            ApiError::Conflict(_) => "conflict",
            ApiError::Validation(_) | ApiError::InvalidFields(_) => "validation_error",
            ApiError::NotEligible(_) => "not_eligible",
            ApiError::DuplicateRegistration { .. } => "duplicate_registration",
            ApiError::InvalidTransition(_) => "invalid_transition",
            ApiError::Internal(_) => "internal_error",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_)
            | ApiError::DuplicateRegistration { .. }
            | ApiError::InvalidTransition(_) => StatusCode::CONFLICT,
            ApiError::Validation(_) | ApiError::InvalidFields(_) => StatusCode::BAD_REQUEST,
            ApiError::NotEligible(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error = self.code().to_string();

        let body = match self {
            ApiError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                ErrorBody {
                    error,
                    message: "An internal error occurred".into(),
                    details: None,
                    existing_registration_id: None,
                }
            }
            ApiError::InvalidFields(details) => ErrorBody {
                error,
                message: match details.as_slice() {
                    [single] => single.message.clone(),
                    _ => format!("{} validation errors", details.len()),
                },
                details: Some(details),
                existing_registration_id: None,
            },
            ApiError::DuplicateRegistration {
                message,
                existing_registration_id,
            } => ErrorBody {
                error,
                message,
                details: None,
                existing_registration_id,
            },
            ApiError::Unauthorized(message)
            | ApiError::Forbidden(message)
            | ApiError::NotFound(message)
            | ApiError::Conflict(message)
            | ApiError::Validation(message)
            | ApiError::NotEligible(message)
            | ApiError::InvalidTransition(message) => ErrorBody {
                error,
                message,
                details: None,
                existing_registration_id: None,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<QueueError> for ApiError {
    fn from(err: QueueError) -> Self {
        match err {
            QueueError::InvalidInput(msg) => ApiError::Validation(msg),
            QueueError::NotFound(what) => ApiError::NotFound(format!("{} not found", what)),
            QueueError::NotEligible(msg) => ApiError::NotEligible(msg),
            dup @ QueueError::DuplicateRegistration { existing_id, .. } => {
                ApiError::DuplicateRegistration {
                    message: dup.to_string(),
                    existing_registration_id: existing_id,
                }
            }
            QueueError::InvalidTransition(e) => ApiError::InvalidTransition(e.to_string()),
            QueueError::Forbidden(msg) => ApiError::Forbidden(msg),
            QueueError::Storage(e) => ApiError::Internal(format!("Queue storage error: {}", e)),
        }
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => ApiError::NotFound("Resource not found".into()),
            sqlx::Error::Database(db_err) => match db_err.code().as_deref() {
                Some("23505") => ApiError::Conflict("Resource already exists".into()),
                Some("23503") => ApiError::NotFound("Referenced resource not found".into()),
                _ => ApiError::Internal(format!("Database error: {}", db_err)),
            },
            _ => ApiError::Internal(format!("Database error: {}", err)),
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut details: Vec<ValidationDetail> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |e| ValidationDetail {
                    field: field.to_string(),
                    message: e
                        .message
                        .clone()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("Invalid value for {}", field)),
                })
            })
            .collect();
        details.sort_by(|a, b| a.field.cmp(&b.field));

        ApiError::InvalidFields(details)
    }
}
