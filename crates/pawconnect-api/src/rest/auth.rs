//! Sign-up, shelter registration, login and logout

use super::{ApiError, ApiState};
use crate::auth::{Account, AccountProfile, AuthUser, Session};
use crate::session::principal_for_account;
use crate::types::*;
use axum::{extract::State, http::StatusCode, Json};
use chrono::{DateTime, Utc};
use pawconnect_access::{dashboard_home, navigation_for};
use pawconnect_core::types::ShelterId;
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

fn login_response(
    state: &ApiState,
    account: Account,
    token: String,
    expires_at: DateTime<Utc>,
) -> Result<LoginResponse, ApiError> {
    let id = account.id;
    let principal = principal_for_account(account, &state.directory)
        .ok_or_else(|| ApiError::InternalError(format!("No principal for account {}", id)))?;

    Ok(LoginResponse {
        access_token: token,
        expires_at,
        home: dashboard_home(Some(principal.role())).to_string(),
        principal,
    })
}

/// Signs in an account that was just created.
fn sign_in_new_account(state: &ApiState, id: Uuid) -> Result<LoginResponse, ApiError> {
    let account = state
        .auth_service
        .account(id)
        .ok_or_else(|| ApiError::InternalError(format!("Account {} missing after creation", id)))?;
    let (token, expires_at) = state
        .auth_service
        .issue_token(&account)
        .map_err(|e| ApiError::InternalError(e.to_string()))?;
    login_response(state, account, token, expires_at)
}

fn check_password_policy(state: &ApiState, password: &str) -> Result<(), ApiError> {
    let min = state.auth_service.config().min_password_length;
    if password.chars().count() < min {
        return Err(ApiError::BadRequest(format!(
            "Password must be at least {} characters",
            min
        )));
    }
    Ok(())
}

/// POST /api/v1/auth/signup - Donor sign-up
#[utoipa::path(
    post,
    path = "/api/v1/auth/signup",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "Account created and signed in", body = LoginResponse),
        (status = 400, description = "Invalid form", body = ErrorResponse),
        (status = 409, description = "Email already registered", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn signup(
    State(state): State<ApiState>,
    Json(request): Json<SignupRequest>,
) -> Result<(StatusCode, Json<LoginResponse>), ApiError> {
    request.validate()?;
    check_password_policy(&state, &request.password)?;

    let profile = AccountProfile::Donor {
        first_name: request.first_name.trim().to_string(),
        last_name: request.last_name.trim().to_string(),
        phone: request.phone.filter(|p| !p.is_empty()),
        city: request.city.filter(|c| !c.is_empty()),
        state: request.state.filter(|s| !s.is_empty()),
    };
    let id = state
        .auth_service
        .create_account(&request.email, &request.password, profile)?;

    info!(account_id = %id, "Donor signed up");
    Ok((StatusCode::CREATED, Json(sign_in_new_account(&state, id)?)))
}

/// POST /api/v1/auth/register-shelter - Shelter application
///
/// Creates the operator account and a pending, unpublished shelter sharing
/// its ID.
#[utoipa::path(
    post,
    path = "/api/v1/auth/register-shelter",
    request_body = ShelterRegisterRequest,
    responses(
        (status = 201, description = "Application submitted and operator signed in", body = LoginResponse),
        (status = 400, description = "Invalid form", body = ErrorResponse),
        (status = 409, description = "Email already registered", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn register_shelter(
    State(state): State<ApiState>,
    Json(request): Json<ShelterRegisterRequest>,
) -> Result<(StatusCode, Json<LoginResponse>), ApiError> {
    request.validate()?;
    check_password_policy(&state, &request.password)?;

    let id = state.auth_service.create_account(
        &request.email,
        &request.password,
        AccountProfile::ShelterOperator,
    )?;

    if let Err(e) = state
        .directory
        .submit_application(ShelterId::from(id), request.registration())
    {
        warn!(account_id = %id, error = %e, "Shelter application rejected, removing account");
        state.auth_service.remove_account(id);
        return Err(e.into());
    }

    Ok((StatusCode::CREATED, Json(sign_in_new_account(&state, id)?)))
}

/// POST /api/v1/auth/login - Sign in as a given account kind
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn login(
    State(state): State<ApiState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    request.validate()?;

    let (account, token, expires_at) =
        state
            .auth_service
            .login(&request.email, &request.password, request.role)?;

    Ok(Json(login_response(&state, account, token, expires_at)?))
}

/// POST /api/v1/auth/logout - End the current session
#[utoipa::path(
    post,
    path = "/api/v1/auth/logout",
    responses(
        (status = 204, description = "Signed out")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "auth"
)]
pub async fn logout(Session(session): Session) -> Result<StatusCode, ApiError> {
    session
        .sign_out()
        .await
        .map_err(|e| ApiError::InternalError(e.to_string()))?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/auth/me - Current principal, capabilities and navigation
#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    responses(
        (status = 200, description = "Signed-in session", body = SessionResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "auth"
)]
pub async fn current_session(user: AuthUser) -> Json<SessionResponse> {
    let role = Some(user.principal.role());
    Json(SessionResponse {
        capabilities: user.principal.capabilities().names(),
        navigation: navigation_for(role).iter().map(NavLink::from).collect(),
        home: dashboard_home(role).to_string(),
        principal: user.principal,
    })
}
