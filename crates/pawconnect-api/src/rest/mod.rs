//! REST API endpoints using Axum

pub mod admin;
pub mod auth;
pub mod directory;
pub mod shelter;

use crate::auth::{AccountError, AuthError, AuthService};
use crate::middleware::AuditLogger;
use crate::types::ErrorResponse;
use axum::{
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use pawconnect_core::error::{DirectoryError, ReviewError};
use pawconnect_directory::{DirectorySource, MemoryDirectory, ReviewWorkflow};
use std::sync::Arc;
use tracing::error;

// ============================================================================
// Application State
// ============================================================================

#[derive(Clone)]
pub struct ApiState {
    pub auth_service: Arc<AuthService>,
    pub audit_logger: Arc<AuditLogger>,
    /// Store behind registrations, profile edits and reviews
    pub directory: Arc<MemoryDirectory>,
    /// Read path of the public directory
    pub source: Arc<dyn DirectorySource>,
    pub workflow: ReviewWorkflow,
    /// Number of shelters on the landing page
    pub featured_count: usize,
}

impl ApiState {
    /// State over a single in-memory directory.
    pub fn new(auth_service: Arc<AuthService>, directory: Arc<MemoryDirectory>) -> Self {
        Self {
            auth_service,
            audit_logger: Arc::new(AuditLogger::new()),
            source: directory.clone(),
            workflow: ReviewWorkflow::new(directory.clone()),
            directory,
            featured_count: 3,
        }
    }

    pub fn with_source(mut self, source: Arc<dyn DirectorySource>) -> Self {
        self.source = source;
        self
    }

    pub fn with_featured_count(mut self, featured_count: usize) -> Self {
        self.featured_count = featured_count;
        self
    }
}

// ============================================================================
// Router Setup
// ============================================================================

pub fn create_rest_router(state: ApiState) -> Router {
    Router::new()
        // Public directory
        .route("/api/v1/shelters", get(directory::list_shelters))
        .route("/api/v1/shelters/featured", get(directory::featured_shelters))
        .route("/api/v1/shelters/{id}", get(directory::get_shelter))
        .route("/api/v1/filters/options", get(directory::get_filter_options))
        // Authentication
        .route("/api/v1/auth/signup", post(auth::signup))
        .route("/api/v1/auth/register-shelter", post(auth::register_shelter))
        .route("/api/v1/auth/login", post(auth::login))
        .route("/api/v1/auth/logout", post(auth::logout))
        .route("/api/v1/auth/me", get(auth::current_session))
        // Shelter operator
        .route(
            "/api/v1/shelter/profile",
            get(shelter::get_own_profile).put(shelter::update_own_profile),
        )
        .route("/api/v1/shelter/publish", post(shelter::set_own_visibility))
        // Administrator
        .route("/api/v1/admin/applications", get(admin::list_applications))
        .route("/api/v1/admin/applications/{id}", get(admin::get_application))
        .route(
            "/api/v1/admin/applications/{id}/approve",
            post(admin::approve_application),
        )
        .route(
            "/api/v1/admin/applications/{id}/reject",
            post(admin::reject_application),
        )
        .route("/api/v1/admin/stats", get(admin::get_stats))
        .route("/api/v1/admin/audit", get(admin::get_audit_logs))
        .with_state(state)
}

// ============================================================================
// Error Handling
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Internal error: {0}")]
    InternalError(String),

    #[error("Validation error: {0}")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error(transparent)]
    Auth(#[from] AuthError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, error_code, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "unauthorized", msg),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, "forbidden", msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg),
            ApiError::ServiceUnavailable(msg) => {
                (StatusCode::SERVICE_UNAVAILABLE, "service_unavailable", msg)
            }
            ApiError::InternalError(msg) => {
                error!(error = %msg, "Internal API error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                )
            }
            ApiError::ValidationError(errors) => {
                let details = serde_json::to_value(errors.field_errors()).unwrap_or_default();
                let body = ErrorResponse::new("validation_error", validation_message(&errors))
                    .with_details(details);
                return (StatusCode::BAD_REQUEST, Json(body)).into_response();
            }
            ApiError::Auth(err) => return err.into_response(),
        };

        let body = Json(ErrorResponse::new(error_code, message));
        (status, body).into_response()
    }
}

/// First human-readable validation message, falling back to the summary.
fn validation_message(errors: &validator::ValidationErrors) -> String {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));
    fields
        .iter()
        .flat_map(|(_, errs)| errs.iter())
        .find_map(|e| e.message.as_ref().map(|m| m.to_string()))
        .unwrap_or_else(|| format!("Validation failed: {}", errors))
}

impl From<AccountError> for ApiError {
    fn from(err: AccountError) -> Self {
        match err {
            AccountError::EmailTaken => ApiError::Conflict(err.to_string()),
            AccountError::WeakPassword(_) => ApiError::BadRequest(err.to_string()),
            AccountError::InvalidCredentials | AccountError::RoleMismatch => {
                ApiError::Unauthorized(err.to_string())
            }
            AccountError::Internal(e) => ApiError::InternalError(e.to_string()),
        }
    }
}

impl From<DirectoryError> for ApiError {
    fn from(err: DirectoryError) -> Self {
        match err {
            DirectoryError::Unavailable { .. } => ApiError::ServiceUnavailable(err.to_string()),
            DirectoryError::NotFound { .. } => ApiError::NotFound(err.to_string()),
            DirectoryError::AlreadyRegistered { .. } => ApiError::Conflict(err.to_string()),
            DirectoryError::NotAllowed { .. } => ApiError::Forbidden(err.to_string()),
        }
    }
}

impl From<ReviewError> for ApiError {
    fn from(err: ReviewError) -> Self {
        match err {
            ReviewError::NotFound { .. } => ApiError::NotFound(err.to_string()),
            ReviewError::AlreadyDecided { .. } => ApiError::Conflict(err.to_string()),
            ReviewError::MissingNotes => ApiError::BadRequest(err.to_string()),
        }
    }
}
