//! Bearer-token session provider
//!
//! Bridges [`AuthService`] tokens and the directory into the
//! [`SessionProvider`] used by protected pages.

use crate::auth::{Account, AccountProfile, AuthService, Claims};
use async_trait::async_trait;
use pawconnect_access::{SessionError, SessionProvider};
use pawconnect_core::types::{
    AdministratorProfile, DonorProfile, Principal, ShelterId, ShelterOperatorProfile,
};
use pawconnect_directory::MemoryDirectory;
use std::sync::Arc;
use tracing::debug;

/// Builds the principal behind verified claims.
///
/// Returns `None` when the account is gone or has changed kind.
pub fn resolve_principal(
    auth: &AuthService,
    directory: &MemoryDirectory,
    claims: &Claims,
) -> Option<Principal> {
    let account = auth.account(claims.account_id()?)?;
    if account.role() != claims.role {
        debug!(account_id = %account.id, "Token no longer matches account");
        return None;
    }
    principal_for_account(account, directory)
}

/// Principal for an account. Shelter operators also need their shelter row.
pub fn principal_for_account(account: Account, directory: &MemoryDirectory) -> Option<Principal> {
    let principal = match account.profile {
        AccountProfile::Donor {
            first_name,
            last_name,
            phone,
            city,
            state,
        } => Principal::Donor(DonorProfile {
            id: account.id,
            email: account.email,
            first_name,
            last_name,
            phone,
            city,
            state,
        }),
        AccountProfile::ShelterOperator => {
            let shelter_id = ShelterId::from(account.id);
            let shelter = directory.profile(&shelter_id)?;
            Principal::ShelterOperator(ShelterOperatorProfile {
                id: account.id,
                email: account.email,
                shelter_id,
                name: shelter.name,
                verification_status: shelter.verification_status,
                is_published: shelter.is_published,
            })
        }
        AccountProfile::Administrator {
            first_name,
            last_name,
        } => Principal::Administrator(AdministratorProfile {
            id: account.id,
            email: account.email,
            first_name,
            last_name,
        }),
    };
    Some(principal)
}

/// Session backed by the bearer token of one request.
pub struct BearerSession {
    auth: Arc<AuthService>,
    directory: Arc<MemoryDirectory>,
    token: Option<String>,
}

impl BearerSession {
    pub fn new(
        auth: Arc<AuthService>,
        directory: Arc<MemoryDirectory>,
        token: Option<String>,
    ) -> Self {
        Self {
            auth,
            directory,
            token,
        }
    }
}

#[async_trait]
impl SessionProvider for BearerSession {
    async fn current_principal(&self) -> Result<Option<Principal>, SessionError> {
        let Some(token) = self.token.as_deref() else {
            return Ok(None);
        };
        let claims = self
            .auth
            .verify_token(token)
            .map_err(|_| SessionError::Expired)?;
        Ok(resolve_principal(&self.auth, &self.directory, &claims))
    }

    async fn sign_out(&self) -> Result<(), SessionError> {
        if let Some(token) = self.token.as_deref() {
            // An already invalid token needs no revocation
            if let Ok(claims) = self.auth.verify_token(token) {
                self.auth.revoke(&claims);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthConfig;
    use pawconnect_access::{AccessState, SessionContext};
    use pawconnect_core::types::{RoleSet, ShelterRegistration, VerificationStatus};

    fn setup() -> (Arc<AuthService>, Arc<MemoryDirectory>) {
        (
            Arc::new(AuthService::new(AuthConfig::default())),
            Arc::new(MemoryDirectory::new()),
        )
    }

    fn register_operator(auth: &AuthService, directory: &MemoryDirectory) -> String {
        let id = auth
            .create_account("ops@happytails.org", "password123", AccountProfile::ShelterOperator)
            .unwrap();
        directory
            .submit_application(
                ShelterId::from(id),
                ShelterRegistration {
                    email: "ops@happytails.org".to_string(),
                    name: "Happy Tails".to_string(),
                    phone: "+91 90000 00000".to_string(),
                    address: "4 Lake Road".to_string(),
                    city: "Kolkata".to_string(),
                    state: "West Bengal".to_string(),
                    postal_code: "700001".to_string(),
                    description: "Cats and dogs".to_string(),
                    website: None,
                    registration_number: None,
                    established_year: Some(2021),
                },
            )
            .unwrap();
        let account = auth.account(id).unwrap();
        auth.issue_token(&account).unwrap().0
    }

    #[tokio::test]
    async fn test_operator_principal_reflects_shelter() {
        let (auth, directory) = setup();
        let token = register_operator(&auth, &directory);

        let session = BearerSession::new(auth, directory, Some(token));
        match session.current_principal().await.unwrap() {
            Some(Principal::ShelterOperator(p)) => {
                assert_eq!(p.name, "Happy Tails");
                assert_eq!(p.verification_status, VerificationStatus::Pending);
                assert!(!p.is_published);
            }
            other => panic!("unexpected principal: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_missing_and_bad_tokens() {
        let (auth, directory) = setup();

        let anonymous = BearerSession::new(auth.clone(), directory.clone(), None);
        assert_eq!(anonymous.current_principal().await.unwrap(), None);

        let garbage = BearerSession::new(auth, directory, Some("not-a-jwt".to_string()));
        assert_eq!(
            garbage.current_principal().await.unwrap_err(),
            SessionError::Expired
        );
    }

    #[tokio::test]
    async fn test_context_sign_out_revokes_token() {
        let (auth, directory) = setup();
        let token = register_operator(&auth, &directory);

        let provider = Arc::new(BearerSession::new(
            auth.clone(),
            directory.clone(),
            Some(token.clone()),
        ));
        let context = SessionContext::start(provider).await;
        assert_eq!(
            context.guard(RoleSet::SHELTER_OPERATOR).state(),
            AccessState::Authorized
        );

        context.sign_out().await.unwrap();
        assert!(auth.verify_token(&token).is_err());

        let again = SessionContext::start(Arc::new(BearerSession::new(
            auth,
            directory,
            Some(token),
        )))
        .await;
        assert_eq!(
            again.guard(RoleSet::SHELTER_OPERATOR).state(),
            AccessState::Unauthenticated
        );
    }
}
