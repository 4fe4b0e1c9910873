//! Administrator review queue, statistics and audit log

use super::{ApiError, ApiState};
use crate::auth::{AuthUser, RequireAdministrator};
use crate::middleware::remote_addr;
use crate::types::*;
use axum::{
    extract::{Path, Query, State},
    http::Extensions,
    Json,
};
use pawconnect_core::error::ReviewError;
use pawconnect_core::types::{Capabilities, ShelterApplication, ShelterId};
use pawconnect_directory::ReviewDecision;
use pawconnect_filter::filter_applications;
use validator::Validate;

/// GET /api/v1/admin/applications - Searchable application queue
#[utoipa::path(
    get,
    path = "/api/v1/admin/applications",
    params(ApplicationQuery),
    responses(
        (status = 200, description = "Applications, newest first", body = ApplicationListResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "admin"
)]
pub async fn list_applications(
    State(state): State<ApiState>,
    _admin: RequireAdministrator,
    Query(query): Query<ApplicationQuery>,
) -> Json<ApplicationListResponse> {
    let all = state.directory.applications();
    let applications: Vec<ShelterApplication> = filter_applications(&all, &query.to_criteria())
        .into_iter()
        .cloned()
        .collect();

    Json(ApplicationListResponse {
        total: all.len(),
        result_count: applications.len(),
        applications,
    })
}

/// GET /api/v1/admin/applications/{id} - One application
#[utoipa::path(
    get,
    path = "/api/v1/admin/applications/{id}",
    params(
        ("id" = String, Path, description = "Shelter ID")
    ),
    responses(
        (status = 200, description = "Application found", body = ShelterApplication),
        (status = 404, description = "Application not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "admin"
)]
pub async fn get_application(
    State(state): State<ApiState>,
    _admin: RequireAdministrator,
    Path(id): Path<String>,
) -> Result<Json<ShelterApplication>, ApiError> {
    let id = ShelterId::from(id);
    state
        .directory
        .application(&id)
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Application {} not found", id)))
}

fn decide(
    state: &ApiState,
    admin: &AuthUser,
    extensions: &Extensions,
    id: ShelterId,
    decision: ReviewDecision,
) -> Result<ShelterApplication, ApiError> {
    let action = match decision {
        ReviewDecision::Approve { .. } => "approve_application",
        ReviewDecision::Reject { .. } => "reject_application",
    };
    let result = state.workflow.decide(&id, decision);

    let details = match &result {
        Ok(app) => serde_json::json!({ "status": app.status, "notes": app.review_notes }),
        Err(e) => serde_json::json!({ "error": e.to_string() }),
    };
    state.audit_logger.log(
        admin.email().to_string(),
        admin.principal.role(),
        action.to_string(),
        format!("/api/v1/admin/applications/{}", id),
        details,
        remote_addr(extensions),
        result.is_ok(),
    );

    result.map_err(ApiError::from)
}

/// POST /api/v1/admin/applications/{id}/approve - Approve a pending application
#[utoipa::path(
    post,
    path = "/api/v1/admin/applications/{id}/approve",
    params(
        ("id" = String, Path, description = "Shelter ID")
    ),
    request_body = ReviewRequest,
    responses(
        (status = 200, description = "Application approved", body = ShelterApplication),
        (status = 404, description = "Application not found", body = ErrorResponse),
        (status = 409, description = "Application already decided", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "admin"
)]
pub async fn approve_application(
    State(state): State<ApiState>,
    extensions: Extensions,
    RequireAdministrator(admin): RequireAdministrator,
    Path(id): Path<String>,
    Json(request): Json<ReviewRequest>,
) -> Result<Json<ShelterApplication>, ApiError> {
    request.validate()?;
    let decision = ReviewDecision::Approve {
        notes: request.notes,
    };
    decide(&state, &admin, &extensions, ShelterId::from(id), decision).map(Json)
}

/// POST /api/v1/admin/applications/{id}/reject - Reject with notes
#[utoipa::path(
    post,
    path = "/api/v1/admin/applications/{id}/reject",
    params(
        ("id" = String, Path, description = "Shelter ID")
    ),
    request_body = ReviewRequest,
    responses(
        (status = 200, description = "Application rejected", body = ShelterApplication),
        (status = 400, description = "Notes missing", body = ErrorResponse),
        (status = 404, description = "Application not found", body = ErrorResponse),
        (status = 409, description = "Application already decided", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "admin"
)]
pub async fn reject_application(
    State(state): State<ApiState>,
    extensions: Extensions,
    RequireAdministrator(admin): RequireAdministrator,
    Path(id): Path<String>,
    Json(request): Json<ReviewRequest>,
) -> Result<Json<ShelterApplication>, ApiError> {
    request.validate()?;
    let notes = request.notes.ok_or(ReviewError::MissingNotes)?;
    let decision = ReviewDecision::Reject { notes };
    decide(&state, &admin, &extensions, ShelterId::from(id), decision).map(Json)
}

/// GET /api/v1/admin/stats - Counts for the overview page
#[utoipa::path(
    get,
    path = "/api/v1/admin/stats",
    responses(
        (status = 200, description = "Directory statistics", body = StatsResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "admin"
)]
pub async fn get_stats(
    State(state): State<ApiState>,
    _admin: RequireAdministrator,
) -> Json<StatsResponse> {
    Json(state.directory.stats().into())
}

/// GET /api/v1/admin/audit - Audit log, newest first
#[utoipa::path(
    get,
    path = "/api/v1/admin/audit",
    responses(
        (status = 200, description = "Audit log entries", body = Vec<AuditLogEntry>),
        (status = 403, description = "Forbidden", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "admin"
)]
pub async fn get_audit_logs(
    State(state): State<ApiState>,
    user: AuthUser,
) -> Result<Json<Vec<AuditLogEntry>>, ApiError> {
    if !user.can(Capabilities::VIEW_AUDIT_LOG) {
        return Err(ApiError::Forbidden(
            "Insufficient permissions for this operation".to_string(),
        ));
    }
    Ok(Json(state.audit_logger.get_logs()))
}
