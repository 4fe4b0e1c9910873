//! Public shelter directory

use super::{ApiError, ApiState};
use crate::types::*;
use axum::{
    extract::{Path, Query, State},
    Json,
};
use pawconnect_core::types::{ShelterId, ShelterRecord};
use pawconnect_directory::load_directory;
use pawconnect_filter::filter_options;
use tracing::debug;

/// GET /api/v1/shelters - Filtered public directory
///
/// An unavailable directory yields an empty listing with `error` set rather
/// than an error status.
#[utoipa::path(
    get,
    path = "/api/v1/shelters",
    params(ShelterQuery),
    responses(
        (status = 200, description = "Directory listing", body = ShelterListResponse)
    ),
    tag = "directory"
)]
pub async fn list_shelters(
    State(state): State<ApiState>,
    Query(query): Query<ShelterQuery>,
) -> Json<ShelterListResponse> {
    let criteria = query.to_criteria();
    let view = load_directory(state.source.as_ref()).await;
    let shelters: Vec<ShelterRecord> = view.visible(&criteria).into_iter().cloned().collect();

    debug!(
        total = view.shelters.len(),
        results = shelters.len(),
        active = criteria.has_active_filters(),
        "Directory query"
    );

    Json(ShelterListResponse {
        total: view.shelters.len(),
        result_count: shelters.len(),
        has_active_filters: criteria.has_active_filters(),
        shelters,
        error: view.error,
    })
}

/// GET /api/v1/shelters/featured - Landing page selection
#[utoipa::path(
    get,
    path = "/api/v1/shelters/featured",
    responses(
        (status = 200, description = "Featured shelters", body = ShelterListResponse)
    ),
    tag = "directory"
)]
pub async fn featured_shelters(State(state): State<ApiState>) -> Json<ShelterListResponse> {
    let view = load_directory(state.source.as_ref()).await;
    let shelters = view.featured(state.featured_count).to_vec();

    Json(ShelterListResponse {
        total: view.shelters.len(),
        result_count: shelters.len(),
        has_active_filters: false,
        shelters,
        error: view.error,
    })
}

/// GET /api/v1/shelters/{id} - One published shelter
#[utoipa::path(
    get,
    path = "/api/v1/shelters/{id}",
    params(
        ("id" = String, Path, description = "Shelter ID")
    ),
    responses(
        (status = 200, description = "Shelter found", body = ShelterRecord),
        (status = 404, description = "No published shelter with this ID", body = ErrorResponse),
        (status = 503, description = "Directory unavailable", body = ErrorResponse)
    ),
    tag = "directory"
)]
pub async fn get_shelter(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> Result<Json<ShelterRecord>, ApiError> {
    let id = ShelterId::from(id);
    state
        .source
        .fetch_shelter_by_id(&id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Shelter {} not found", id)))
}

/// GET /api/v1/filters/options - Sidebar choices
#[utoipa::path(
    get,
    path = "/api/v1/filters/options",
    responses(
        (status = 200, description = "Region and founding-year choices", body = FilterOptionsResponse)
    ),
    tag = "directory"
)]
pub async fn get_filter_options() -> Json<FilterOptionsResponse> {
    Json(filter_options().into())
}
