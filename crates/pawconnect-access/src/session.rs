//! Session context
//!
//! A [`SessionContext`] is created when a visitor arrives, refreshed on
//! sign-in, sign-out and profile notifications, and torn down on sign-out.
//! Its status is published over a `watch` channel so any number of
//! [`AccessGuard`]s can follow it.

use crate::guard::{AccessGuard, SessionStatus};
use async_trait::async_trait;
use pawconnect_core::types::{Principal, RoleSet};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Errors raised by a session provider.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SessionError {
    /// The identity service could not be reached
    #[error("Session provider unavailable: {0}")]
    Unavailable(String),

    /// The presented credentials are no longer valid
    #[error("Session expired")]
    Expired,
}

/// Source of the current principal.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    /// Looks up the principal behind the session, if any.
    async fn current_principal(&self) -> Result<Option<Principal>, SessionError>;

    /// Ends the session with the identity service.
    async fn sign_out(&self) -> Result<(), SessionError>;
}

/// Auth-state notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    SignedIn(Principal),
    SignedOut,
    /// Same identity, new attributes (e.g. a shelter was approved)
    ProfileChanged(Principal),
}

/// Explicit per-visitor session.
pub struct SessionContext {
    provider: Arc<dyn SessionProvider>,
    status: watch::Sender<SessionStatus>,
}

impl SessionContext {
    /// Creates a context in the `Resolving` state without querying the
    /// provider.
    pub fn new(provider: Arc<dyn SessionProvider>) -> Self {
        let (status, _) = watch::channel(SessionStatus::Resolving);
        Self { provider, status }
    }

    /// Creates a context and resolves the current principal.
    pub async fn start(provider: Arc<dyn SessionProvider>) -> Self {
        let context = Self::new(provider);
        context.resolve().await;
        context
    }

    /// Queries the provider and publishes the result.
    ///
    /// A provider failure resolves to "no principal".
    pub async fn resolve(&self) -> SessionStatus {
        let principal = match self.provider.current_principal().await {
            Ok(principal) => principal,
            Err(e) => {
                warn!(error = %e, "Session lookup failed, treating as signed out");
                None
            }
        };

        debug!(role = ?principal.as_ref().map(|p| p.role()), "Session resolved");
        let status = SessionStatus::Resolved(principal);
        self.status.send_replace(status.clone());
        status
    }

    /// Applies an auth-state notification.
    pub fn refresh(&self, event: SessionEvent) {
        let status = match event {
            SessionEvent::SignedIn(principal) => {
                info!(email = %principal.email(), role = %principal.role(), "Signed in");
                SessionStatus::Resolved(Some(principal))
            }
            SessionEvent::ProfileChanged(principal) => {
                debug!(email = %principal.email(), "Session profile changed");
                SessionStatus::Resolved(Some(principal))
            }
            SessionEvent::SignedOut => SessionStatus::Resolved(None),
        };
        self.status.send_replace(status);
    }

    /// Signs out with the provider, then clears the principal.
    pub async fn sign_out(&self) -> Result<(), SessionError> {
        self.provider.sign_out().await?;
        if let Some(principal) = self.principal() {
            info!(email = %principal.email(), "Signed out");
        }
        self.status.send_replace(SessionStatus::Resolved(None));
        Ok(())
    }

    pub fn status(&self) -> SessionStatus {
        self.status.borrow().clone()
    }

    pub fn principal(&self) -> Option<Principal> {
        self.status.borrow().principal().cloned()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionStatus> {
        self.status.subscribe()
    }

    /// Guard for a route allowing `allowed`.
    pub fn guard(&self, allowed: RoleSet) -> AccessGuard {
        AccessGuard::new(allowed, self.subscribe())
    }
}

impl std::fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionContext")
            .field("status", &*self.status.borrow())
            .finish()
    }
}
