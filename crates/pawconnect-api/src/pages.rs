//! Role-gated dashboard pages
//!
//! Every pattern in [`RouteTable::standard`] is served here. A request waits
//! for its session to resolve, then either redirects (`/login` when signed
//! out, `/` when the role is not allowed) or renders the page payload.

use crate::auth::Session;
use crate::rest::{ApiError, ApiState};
use crate::types::{NavLink, PageResponse, StatsResponse};
use axum::{
    extract::State,
    http::Uri,
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Json, Router,
};
use pawconnect_access::{dashboard_home, navigation_for, AccessOutcome, RouteMatch, RouteTable};
use pawconnect_core::types::{Principal, ShelterId};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

#[derive(Clone)]
pub struct PageState {
    api: ApiState,
    routes: Arc<RouteTable>,
}

pub fn create_page_router(api: ApiState) -> Router {
    let routes = Arc::new(RouteTable::standard());
    let state = PageState {
        api,
        routes: routes.clone(),
    };

    routes
        .routes()
        .iter()
        .fold(Router::new(), |router, route| {
            router.route(route.pattern, get(render_page))
        })
        .with_state(state)
}

async fn render_page(
    State(state): State<PageState>,
    uri: Uri,
    Session(session): Session,
) -> Result<Response, ApiError> {
    let path = uri.path();
    let matched = state
        .routes
        .lookup(path)
        .ok_or_else(|| ApiError::NotFound(format!("No page at {}", path)))?;

    let access = session.guard(matched.route.allowed).settled().await;
    debug!(path, page = matched.route.page, ?access, "Page access decided");

    let principal = match (access.outcome(), session.principal()) {
        (AccessOutcome::Redirect(target), _) => return Ok(Redirect::to(target).into_response()),
        (AccessOutcome::Render, Some(principal)) => principal,
        // settled() never reports Resolving
        (AccessOutcome::Loading, _) | (AccessOutcome::Render, None) => {
            return Ok(Redirect::to(pawconnect_access::SIGN_IN_PATH).into_response())
        }
    };

    let data = page_data(&state.api, &matched, &principal)?;
    let role = principal.role();

    Ok(Json(PageResponse {
        page: matched.route.page.to_string(),
        title: matched.route.title.to_string(),
        path: path.to_string(),
        display_name: principal.display_name(),
        role,
        navigation: navigation_for(Some(role)).iter().map(NavLink::from).collect(),
        home: dashboard_home(Some(role)).to_string(),
        params: matched.params.iter().cloned().collect::<BTreeMap<_, _>>(),
        data,
    })
    .into_response())
}

fn page_data(
    state: &ApiState,
    matched: &RouteMatch<'_>,
    principal: &Principal,
) -> Result<serde_json::Value, ApiError> {
    let value = match matched.route.page {
        "donor-dashboard" => serde_json::to_value(principal),
        "shelter-overview" | "shelter-profile" | "shelter-preview" => {
            let Principal::ShelterOperator(operator) = principal else {
                return Err(ApiError::Forbidden(
                    "No shelter is linked to this account".to_string(),
                ));
            };
            let profile = state
                .directory
                .profile(&operator.shelter_id)
                .ok_or_else(|| {
                    ApiError::NotFound(format!("Shelter {} not found", operator.shelter_id))
                })?;
            // Preview shows what donors would see once listed
            if matched.route.page == "shelter-preview" {
                serde_json::to_value(profile.to_record())
            } else {
                serde_json::to_value(profile)
            }
        }
        "admin-overview" => serde_json::to_value(StatsResponse::from(state.directory.stats())),
        "admin-applications" => serde_json::to_value(state.directory.pending_applications()),
        "admin-review" => {
            let id = matched
                .param("id")
                .map(ShelterId::from)
                .ok_or_else(|| ApiError::BadRequest("Missing application id".to_string()))?;
            let application = state
                .directory
                .application(&id)
                .ok_or_else(|| ApiError::NotFound(format!("Application {} not found", id)))?;
            serde_json::to_value(application)
        }
        "admin-shelters" => serde_json::to_value(state.directory.applications()),
        _ => Ok(serde_json::Value::Null),
    };

    value.map_err(|e| ApiError::InternalError(e.to_string()))
}
