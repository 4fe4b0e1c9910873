//! Accounts, JWT sessions and request extractors

use crate::session::{resolve_principal, BearerSession};
use crate::types::ErrorResponse;
use anyhow::{anyhow, Context};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json, RequestPartsExt,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use chrono::{DateTime, Duration, Utc};
use dashmap::{mapref::entry::Entry, DashMap};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use metrics::counter;
use pawconnect_access::SessionContext;
use pawconnect_core::config::{AuthSettings, DEFAULT_JWT_SECRET, MAX_TOKEN_TTL_HOURS};
use pawconnect_core::types::{Capabilities, Principal, Role};
use pawconnect_directory::MemoryDirectory;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

// ============================================================================
// Configuration
// ============================================================================

#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// JWT secret key
    pub jwt_secret: String,

    /// JWT token expiration duration
    pub jwt_expiration: Duration,

    /// Minimum accepted password length
    pub min_password_length: usize,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: DEFAULT_JWT_SECRET.to_string(),
            jwt_expiration: Duration::hours(24),
            min_password_length: 8,
        }
    }
}

impl From<&AuthSettings> for AuthConfig {
    fn from(settings: &AuthSettings) -> Self {
        Self {
            jwt_secret: settings.jwt_secret.clone(),
            jwt_expiration: Duration::hours(settings.token_ttl_hours.clamp(1, MAX_TOKEN_TTL_HOURS)),
            min_password_length: settings.min_password_length,
        }
    }
}

// ============================================================================
// JWT Claims
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (account ID)
    pub sub: String,

    /// Account role
    pub role: Role,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// JWT ID
    pub jti: String,
}

impl Claims {
    pub fn new(account_id: Uuid, role: Role, expiration: Duration) -> Self {
        let now = Utc::now();
        Self {
            sub: account_id.to_string(),
            role,
            iat: now.timestamp(),
            exp: (now + expiration).timestamp(),
            jti: Uuid::new_v4().to_string(),
        }
    }

    pub fn account_id(&self) -> Option<Uuid> {
        Uuid::parse_str(&self.sub).ok()
    }
}

// ============================================================================
// Account Store
// ============================================================================

/// Role-specific data captured at sign-up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountProfile {
    Donor {
        first_name: String,
        last_name: String,
        phone: Option<String>,
        city: Option<String>,
        state: Option<String>,
    },
    /// Shelter details live in the directory under the account id
    ShelterOperator,
    Administrator {
        first_name: String,
        last_name: String,
    },
}

impl AccountProfile {
    pub fn role(&self) -> Role {
        match self {
            AccountProfile::Donor { .. } => Role::Donor,
            AccountProfile::ShelterOperator => Role::ShelterOperator,
            AccountProfile::Administrator { .. } => Role::Administrator,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Account {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub profile: AccountProfile,
    pub created_at: DateTime<Utc>,
}

impl Account {
    pub fn role(&self) -> Role {
        self.profile.role()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    #[error("An account with this email already exists")]
    EmailTaken,

    #[error("Password must be at least {0} characters")]
    WeakPassword(usize),

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Invalid credentials for this user type")]
    RoleMismatch,

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

// ============================================================================
// Authentication Service
// ============================================================================

pub struct AuthService {
    config: AuthConfig,
    /// Keyed by lowercase email
    accounts: Arc<DashMap<String, Account>>,
    emails: Arc<DashMap<Uuid, String>>,
    /// Revoked token ids and their expiry
    revoked: Arc<DashMap<String, i64>>,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl AuthService {
    pub fn new(config: AuthConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.jwt_secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.jwt_secret.as_bytes());

        Self {
            config,
            accounts: Arc::new(DashMap::new()),
            emails: Arc::new(DashMap::new()),
            revoked: Arc::new(DashMap::new()),
            encoding_key,
            decoding_key,
        }
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Hash a password using Argon2
    pub fn hash_password(&self, password: &str) -> anyhow::Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();
        let password_hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| anyhow!("Failed to hash password: {}", e))?
            .to_string();
        Ok(password_hash)
    }

    /// Verify a password against a hash
    pub fn verify_password(&self, password: &str, hash: &str) -> anyhow::Result<bool> {
        let parsed_hash = PasswordHash::new(hash)
            .map_err(|e| anyhow!("Failed to parse password hash: {}", e))?;
        let argon2 = Argon2::default();
        Ok(argon2
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    /// Creates an account; the role follows from `profile`.
    pub fn create_account(
        &self,
        email: &str,
        password: &str,
        profile: AccountProfile,
    ) -> Result<Uuid, AccountError> {
        let key = email.trim().to_lowercase();
        if self.accounts.contains_key(&key) {
            return Err(AccountError::EmailTaken);
        }
        if password.chars().count() < self.config.min_password_length {
            return Err(AccountError::WeakPassword(self.config.min_password_length));
        }

        let account = Account {
            id: Uuid::new_v4(),
            email: email.trim().to_string(),
            password_hash: self.hash_password(password)?,
            profile,
            created_at: Utc::now(),
        };
        let id = account.id;
        let role = account.role();

        // Re-checked under the shard lock
        match self.accounts.entry(key.clone()) {
            Entry::Occupied(_) => return Err(AccountError::EmailTaken),
            Entry::Vacant(slot) => {
                slot.insert(account);
            }
        }
        self.emails.insert(id, key);

        counter!("pawconnect_accounts_created_total", "role" => role.as_str()).increment(1);
        info!(account_id = %id, role = %role, "Account created");
        Ok(id)
    }

    /// Drops an account, e.g. when the rest of a registration failed.
    pub fn remove_account(&self, id: Uuid) -> Option<Account> {
        let (_, key) = self.emails.remove(&id)?;
        self.accounts.remove(&key).map(|(_, account)| account)
    }

    pub fn account(&self, id: Uuid) -> Option<Account> {
        let key = self.emails.get(&id)?;
        self.accounts.get(key.value()).map(|a| a.value().clone())
    }

    pub fn account_by_email(&self, email: &str) -> Option<Account> {
        self.accounts
            .get(&email.trim().to_lowercase())
            .map(|a| a.value().clone())
    }

    pub fn account_count(&self) -> usize {
        self.accounts.len()
    }

    /// Signs a token for `account`.
    pub fn issue_token(&self, account: &Account) -> anyhow::Result<(String, DateTime<Utc>)> {
        let claims = Claims::new(account.id, account.role(), self.config.jwt_expiration);

        let expires_at = DateTime::from_timestamp(claims.exp, 0)
            .ok_or_else(|| anyhow!("Invalid expiration timestamp"))?;

        let token = encode(&Header::default(), &claims, &self.encoding_key)
            .context("Failed to encode JWT token")?;

        Ok((token, expires_at))
    }

    /// Authenticates an account of the given kind and issues a token.
    ///
    /// A correct password for an account of another kind is still refused.
    pub fn login(
        &self,
        email: &str,
        password: &str,
        role: Role,
    ) -> Result<(Account, String, DateTime<Utc>), AccountError> {
        let outcome = self.try_login(email, password, role);
        let label = match &outcome {
            Ok(_) => "success",
            Err(AccountError::RoleMismatch) => "role_mismatch",
            Err(_) => "failure",
        };
        counter!("pawconnect_logins_total", "outcome" => label).increment(1);
        outcome
    }

    fn try_login(
        &self,
        email: &str,
        password: &str,
        role: Role,
    ) -> Result<(Account, String, DateTime<Utc>), AccountError> {
        let account = self
            .account_by_email(email)
            .ok_or(AccountError::InvalidCredentials)?;

        if !self.verify_password(password, &account.password_hash)? {
            return Err(AccountError::InvalidCredentials);
        }

        if account.role() != role {
            warn!(account_id = %account.id, requested = %role, "Login with wrong account type");
            return Err(AccountError::RoleMismatch);
        }

        let (token, expires_at) = self.issue_token(&account)?;
        info!(account_id = %account.id, role = %role, "Login successful");
        Ok((account, token, expires_at))
    }

    /// Verify and decode JWT token
    pub fn verify_token(&self, token: &str) -> anyhow::Result<Claims> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &Validation::default())
            .context("Invalid JWT token")?;

        if self.revoked.contains_key(&token_data.claims.jti) {
            return Err(anyhow!("Token has been revoked"));
        }

        Ok(token_data.claims)
    }

    /// Revokes a token until it would have expired anyway.
    pub fn revoke(&self, claims: &Claims) {
        let now = Utc::now().timestamp();
        self.revoked.retain(|_, exp| *exp > now);
        self.revoked.insert(claims.jti.clone(), claims.exp);
        debug!(jti = %claims.jti, "Token revoked");
    }
}

// ============================================================================
// Request Extractors
// ============================================================================

fn services(parts: &Parts) -> Result<(Arc<AuthService>, Arc<MemoryDirectory>), AuthError> {
    let auth_service = parts
        .extensions
        .get::<Arc<AuthService>>()
        .cloned()
        .ok_or(AuthError::InternalError)?;
    let directory = parts
        .extensions
        .get::<Arc<MemoryDirectory>>()
        .cloned()
        .ok_or(AuthError::InternalError)?;
    Ok((auth_service, directory))
}

/// Authenticated principal from a bearer token
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub principal: Principal,
    pub claims: Claims,
}

impl AuthUser {
    pub fn can(&self, capability: Capabilities) -> bool {
        self.principal.can(capability)
    }

    pub fn email(&self) -> &str {
        self.principal.email()
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) = parts
            .extract::<TypedHeader<Authorization<Bearer>>>()
            .await
            .map_err(|_| AuthError::MissingCredentials)?;

        let (auth_service, directory) = services(parts)?;

        let claims = auth_service
            .verify_token(bearer.token())
            .map_err(|_| AuthError::InvalidToken)?;

        let principal = resolve_principal(&auth_service, &directory, &claims)
            .ok_or(AuthError::InvalidToken)?;

        Ok(AuthUser { principal, claims })
    }
}

/// Session context for the request, resolved from an optional bearer token.
///
/// Never rejects for missing or bad credentials; the session simply resolves
/// to no principal.
pub struct Session(pub SessionContext);

impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let token = parts
            .extract::<TypedHeader<Authorization<Bearer>>>()
            .await
            .ok()
            .map(|TypedHeader(Authorization(bearer))| bearer.token().to_string());

        let (auth_service, directory) = services(parts)?;
        let provider = BearerSession::new(auth_service, directory, token);
        Ok(Session(SessionContext::start(Arc::new(provider)).await))
    }
}

// ============================================================================
// Capability extractors
// ============================================================================

/// Requires the administrator review capability
pub struct RequireAdministrator(pub AuthUser);

impl<S> FromRequestParts<S> for RequireAdministrator
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;

        if !user.can(Capabilities::REVIEW_APPLICATIONS) {
            return Err(AuthError::InsufficientPermissions);
        }

        Ok(RequireAdministrator(user))
    }
}

/// Requires the shelter profile management capability
pub struct RequireShelterOperator(pub AuthUser);

impl<S> FromRequestParts<S> for RequireShelterOperator
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;

        if !user.can(Capabilities::MANAGE_SHELTER_PROFILE) {
            return Err(AuthError::InsufficientPermissions);
        }

        Ok(RequireShelterOperator(user))
    }
}

// ============================================================================
// Error Handling
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Missing authentication credentials")]
    MissingCredentials,

    #[error("Invalid JWT token")]
    InvalidToken,

    #[error("Insufficient permissions")]
    InsufficientPermissions,

    #[error("Internal authentication error")]
    InternalError,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            AuthError::MissingCredentials => (
                StatusCode::UNAUTHORIZED,
                "missing_credentials",
                "Authentication required",
            ),
            AuthError::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                "invalid_token",
                "Invalid or expired session token",
            ),
            AuthError::InsufficientPermissions => (
                StatusCode::FORBIDDEN,
                "insufficient_permissions",
                "Insufficient permissions for this operation",
            ),
            AuthError::InternalError => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "Internal authentication error",
            ),
        };

        let body = Json(ErrorResponse::new(error_code, message));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn donor_profile() -> AccountProfile {
        AccountProfile::Donor {
            first_name: "Asha".to_string(),
            last_name: "Rao".to_string(),
            phone: None,
            city: Some("Pune".to_string()),
            state: Some("Maharashtra".to_string()),
        }
    }

    #[test]
    fn test_token_lifetime_from_settings_is_bounded() {
        let mut settings = AuthSettings::default();
        settings.token_ttl_hours = i64::MAX;
        let config = AuthConfig::from(&settings);
        assert_eq!(config.jwt_expiration, Duration::hours(MAX_TOKEN_TTL_HOURS));

        settings.token_ttl_hours = 12;
        assert_eq!(AuthConfig::from(&settings).jwt_expiration, Duration::hours(12));
    }

    #[test]
    fn test_password_hashing() {
        let auth = AuthService::new(AuthConfig::default());
        let password = "test_password_123";

        let hash = auth.hash_password(password).unwrap();
        assert!(auth.verify_password(password, &hash).unwrap());
        assert!(!auth.verify_password("wrong_password", &hash).unwrap());
    }

    #[test]
    fn test_create_account() {
        let auth = AuthService::new(AuthConfig::default());

        let id = auth
            .create_account("asha@example.org", "password123", donor_profile())
            .unwrap();

        assert!(id != Uuid::nil());
        assert_eq!(auth.account(id).unwrap().role(), Role::Donor);
        assert!(auth.account_by_email("ASHA@example.org").is_some());
    }

    #[test]
    fn test_duplicate_email_and_weak_password() {
        let auth = AuthService::new(AuthConfig::default());
        auth.create_account("asha@example.org", "password123", donor_profile())
            .unwrap();

        assert!(matches!(
            auth.create_account("Asha@Example.org", "password123", donor_profile()),
            Err(AccountError::EmailTaken)
        ));
        assert!(matches!(
            auth.create_account("ravi@example.org", "short", donor_profile()),
            Err(AccountError::WeakPassword(8))
        ));
    }

    #[test]
    fn test_jwt_flow() {
        let auth = AuthService::new(AuthConfig::default());
        let id = auth
            .create_account("asha@example.org", "password123", donor_profile())
            .unwrap();

        let (account, token, expires_at) = auth
            .login("asha@example.org", "password123", Role::Donor)
            .unwrap();
        assert_eq!(account.id, id);
        assert!(expires_at > Utc::now());

        let claims = auth.verify_token(&token).unwrap();
        assert_eq!(claims.account_id(), Some(id));
        assert_eq!(claims.role, Role::Donor);
    }

    #[test]
    fn test_login_wrong_role_rejected() {
        let auth = AuthService::new(AuthConfig::default());
        auth.create_account("asha@example.org", "password123", donor_profile())
            .unwrap();

        let err = auth
            .login("asha@example.org", "password123", Role::Administrator)
            .unwrap_err();
        assert!(matches!(err, AccountError::RoleMismatch));
        assert_eq!(err.to_string(), "Invalid credentials for this user type");

        assert!(matches!(
            auth.login("asha@example.org", "nope-nope", Role::Donor),
            Err(AccountError::InvalidCredentials)
        ));
        assert!(matches!(
            auth.login("nobody@example.org", "password123", Role::Donor),
            Err(AccountError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_revoked_token_rejected() {
        let auth = AuthService::new(AuthConfig::default());
        auth.create_account("asha@example.org", "password123", donor_profile())
            .unwrap();
        let (_, token, _) = auth
            .login("asha@example.org", "password123", Role::Donor)
            .unwrap();

        let claims = auth.verify_token(&token).unwrap();
        auth.revoke(&claims);
        assert!(auth.verify_token(&token).is_err());
    }

    #[test]
    fn test_token_from_other_secret_rejected() {
        let auth = AuthService::new(AuthConfig::default());
        let other = AuthService::new(AuthConfig {
            jwt_secret: "another-secret".to_string(),
            ..AuthConfig::default()
        });
        let id = other
            .create_account("asha@example.org", "password123", donor_profile())
            .unwrap();
        let (token, _) = other.issue_token(&other.account(id).unwrap()).unwrap();

        assert!(auth.verify_token(&token).is_err());
    }

    #[test]
    fn test_remove_account() {
        let auth = AuthService::new(AuthConfig::default());
        let id = auth
            .create_account("ops@paws.org", "password123", AccountProfile::ShelterOperator)
            .unwrap();

        assert!(auth.remove_account(id).is_some());
        assert!(auth.account(id).is_none());
        assert_eq!(auth.account_count(), 0);
    }
}
