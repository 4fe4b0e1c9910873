//! Access decision for protected pages
//!
//! A navigation attempt starts in [`AccessState::Resolving`] until the
//! session is known, then settles on one of the three terminal states.

use crate::route::{LANDING_PATH, SIGN_IN_PATH};
use pawconnect_core::types::{Principal, RoleSet};
use serde::Serialize;
use tokio::sync::watch;
use tracing::debug;

/// What the session currently knows about its principal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SessionStatus {
    /// Lookup still in flight
    #[default]
    Resolving,
    /// Lookup finished; `None` means signed out
    Resolved(Option<Principal>),
}

impl SessionStatus {
    pub fn principal(&self) -> Option<&Principal> {
        match self {
            SessionStatus::Resolved(principal) => principal.as_ref(),
            SessionStatus::Resolving => None,
        }
    }

    pub fn is_resolving(&self) -> bool {
        matches!(self, SessionStatus::Resolving)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessState {
    Resolving,
    Unauthenticated,
    Authorized,
    Forbidden,
}

/// How to render an access state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessOutcome {
    /// Neutral loading indicator
    Loading,
    Redirect(&'static str),
    /// Render the protected page
    Render,
}

impl AccessState {
    pub fn outcome(&self) -> AccessOutcome {
        match self {
            AccessState::Resolving => AccessOutcome::Loading,
            AccessState::Unauthenticated => AccessOutcome::Redirect(SIGN_IN_PATH),
            AccessState::Forbidden => AccessOutcome::Redirect(LANDING_PATH),
            AccessState::Authorized => AccessOutcome::Render,
        }
    }
}

/// Decides access for a session against a route's allow-list.
pub fn evaluate(status: &SessionStatus, allowed: &RoleSet) -> AccessState {
    match status {
        SessionStatus::Resolving => AccessState::Resolving,
        SessionStatus::Resolved(None) => AccessState::Unauthenticated,
        SessionStatus::Resolved(Some(principal)) => {
            if allowed.allows(principal.role()) {
                AccessState::Authorized
            } else {
                AccessState::Forbidden
            }
        }
    }
}

/// Re-evaluates a route's access on every session change.
#[derive(Debug, Clone)]
pub struct AccessGuard {
    allowed: RoleSet,
    status: watch::Receiver<SessionStatus>,
}

impl AccessGuard {
    pub fn new(allowed: RoleSet, status: watch::Receiver<SessionStatus>) -> Self {
        Self { allowed, status }
    }

    /// Access state for the current session value.
    pub fn state(&self) -> AccessState {
        evaluate(&self.status.borrow(), &self.allowed)
    }

    /// Waits for the next session change and returns the new state.
    ///
    /// Returns `None` once the session has been dropped.
    pub async fn changed(&mut self) -> Option<AccessState> {
        self.status.changed().await.ok()?;
        let state = evaluate(&self.status.borrow_and_update(), &self.allowed);
        debug!(?state, "Access re-evaluated");
        Some(state)
    }

    /// Waits until the session has resolved and returns the settled state.
    pub async fn settled(&mut self) -> AccessState {
        match self.status.wait_for(|status| !status.is_resolving()).await {
            Ok(status) => evaluate(&status, &self.allowed),
            Err(_) => AccessState::Unauthenticated,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pawconnect_core::types::{AdministratorProfile, DonorProfile, Role};
    use uuid::Uuid;

    fn donor() -> Principal {
        Principal::Donor(DonorProfile {
            id: Uuid::new_v4(),
            email: "donor@example.org".to_string(),
            first_name: "Asha".to_string(),
            last_name: "Rao".to_string(),
            phone: None,
            city: None,
            state: None,
        })
    }

    fn admin() -> Principal {
        Principal::Administrator(AdministratorProfile {
            id: Uuid::new_v4(),
            email: "admin@pawconnect.in".to_string(),
            first_name: "Admin".to_string(),
            last_name: "User".to_string(),
        })
    }

    #[test]
    fn test_resolving_shows_loading() {
        let state = evaluate(&SessionStatus::Resolving, &RoleSet::ADMINISTRATOR);
        assert_eq!(state, AccessState::Resolving);
        assert_eq!(state.outcome(), AccessOutcome::Loading);
    }

    #[test]
    fn test_absent_principal_redirects_to_sign_in() {
        for allowed in [RoleSet::DONOR, RoleSet::SHELTER_OPERATOR, RoleSet::all()] {
            let state = evaluate(&SessionStatus::Resolved(None), &allowed);
            assert_eq!(state, AccessState::Unauthenticated);
            assert_eq!(state.outcome(), AccessOutcome::Redirect("/login"));
        }
    }

    #[test]
    fn test_donor_on_admin_route_redirects_to_landing() {
        let state = evaluate(&SessionStatus::Resolved(Some(donor())), &RoleSet::ADMINISTRATOR);
        assert_eq!(state, AccessState::Forbidden);
        assert_eq!(state.outcome(), AccessOutcome::Redirect("/"));
    }

    #[test]
    fn test_allowed_role_renders() {
        let state = evaluate(&SessionStatus::Resolved(Some(admin())), &RoleSet::ADMINISTRATOR);
        assert_eq!(state.outcome(), AccessOutcome::Render);

        let either = RoleSet::DONOR | RoleSet::ADMINISTRATOR;
        assert_eq!(
            evaluate(&SessionStatus::Resolved(Some(donor())), &either),
            AccessState::Authorized
        );
    }

    #[test]
    fn test_status_principal() {
        assert!(SessionStatus::Resolving.principal().is_none());
        let status = SessionStatus::Resolved(Some(admin()));
        assert_eq!(status.principal().map(|p| p.role()), Some(Role::Administrator));
    }

    #[tokio::test]
    async fn test_guard_follows_session_changes() {
        let (tx, rx) = watch::channel(SessionStatus::Resolving);
        let mut guard = AccessGuard::new(RoleSet::DONOR, rx);
        assert_eq!(guard.state(), AccessState::Resolving);

        tx.send(SessionStatus::Resolved(Some(donor()))).unwrap();
        assert_eq!(guard.changed().await, Some(AccessState::Authorized));

        tx.send(SessionStatus::Resolved(None)).unwrap();
        assert_eq!(guard.changed().await, Some(AccessState::Unauthenticated));

        drop(tx);
        assert_eq!(guard.changed().await, None);
    }

    #[tokio::test]
    async fn test_guard_settles() {
        let (tx, rx) = watch::channel(SessionStatus::Resolving);
        let mut guard = AccessGuard::new(RoleSet::ADMINISTRATOR, rx);

        let waiter = tokio::spawn(async move { guard.settled().await });
        tx.send(SessionStatus::Resolved(Some(donor()))).unwrap();

        assert_eq!(waiter.await.unwrap(), AccessState::Forbidden);
    }
}
