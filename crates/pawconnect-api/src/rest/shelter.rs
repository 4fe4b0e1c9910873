//! Shelter operator self-service

use super::{ApiError, ApiState};
use crate::auth::{AuthUser, RequireShelterOperator};
use crate::middleware::remote_addr;
use crate::types::*;
use axum::{extract::State, http::Extensions, Json};
use pawconnect_core::types::{Capabilities, Principal, ShelterId, ShelterProfile, ShelterUpdate};
use tracing::info;
use validator::Validate;

fn own_shelter(user: &AuthUser) -> Result<ShelterId, ApiError> {
    match &user.principal {
        Principal::ShelterOperator(operator) => Ok(operator.shelter_id.clone()),
        _ => Err(ApiError::Forbidden("No shelter is linked to this account".to_string())),
    }
}

/// GET /api/v1/shelter/profile - The operator's full shelter profile
#[utoipa::path(
    get,
    path = "/api/v1/shelter/profile",
    responses(
        (status = 200, description = "Shelter profile", body = ShelterProfile),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "shelter"
)]
pub async fn get_own_profile(
    State(state): State<ApiState>,
    RequireShelterOperator(user): RequireShelterOperator,
) -> Result<Json<ShelterProfile>, ApiError> {
    let id = own_shelter(&user)?;
    state
        .directory
        .profile(&id)
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Shelter {} not found", id)))
}

/// PUT /api/v1/shelter/profile - Edit profile fields
#[utoipa::path(
    put,
    path = "/api/v1/shelter/profile",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile updated", body = ShelterProfile),
        (status = 400, description = "Invalid update", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "shelter"
)]
pub async fn update_own_profile(
    State(state): State<ApiState>,
    RequireShelterOperator(user): RequireShelterOperator,
    Json(request): Json<UpdateProfileRequest>,
) -> Result<Json<ShelterProfile>, ApiError> {
    request.validate()?;
    let id = own_shelter(&user)?;

    let update = ShelterUpdate::from(request);
    if update.is_empty() {
        return Err(ApiError::BadRequest("No profile fields supplied".to_string()));
    }

    let profile = state.directory.update_profile(&id, update)?;
    info!(shelter_id = %id, "Shelter profile edited by operator");
    Ok(Json(profile))
}

/// POST /api/v1/shelter/publish - List or unlist the shelter
///
/// Only approved shelters can be listed.
#[utoipa::path(
    post,
    path = "/api/v1/shelter/publish",
    request_body = PublishRequest,
    responses(
        (status = 200, description = "Visibility changed", body = ShelterProfile),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Not approved yet", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "shelter"
)]
pub async fn set_own_visibility(
    State(state): State<ApiState>,
    extensions: Extensions,
    RequireShelterOperator(user): RequireShelterOperator,
    Json(request): Json<PublishRequest>,
) -> Result<Json<ShelterProfile>, ApiError> {
    if !user.can(Capabilities::PUBLISH_SHELTER) {
        return Err(ApiError::Forbidden(
            "Publishing is not permitted for this account".to_string(),
        ));
    }
    let id = own_shelter(&user)?;

    let result = state.directory.set_published(&id, request.published);
    state.audit_logger.log(
        user.email().to_string(),
        user.principal.role(),
        if request.published {
            "publish_shelter"
        } else {
            "unpublish_shelter"
        }
        .to_string(),
        format!("/api/v1/shelter/{}", id),
        serde_json::json!({ "published": request.published }),
        remote_addr(&extensions),
        result.is_ok(),
    );

    Ok(Json(result?))
}
