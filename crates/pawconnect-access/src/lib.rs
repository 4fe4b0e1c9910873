//! Role-gated routing for PawConnect dashboards
//!
//! - [`route`]: protected pages and their static role allow-lists
//! - [`guard`]: the `Resolving → Unauthenticated | Forbidden | Authorized`
//!   decision and how each state renders
//! - [`navigation`]: per-role dashboard navigation
//! - [`session`]: the explicit session context guards observe
//!
//! # Example
//!
//! ```rust
//! use pawconnect_access::{evaluate, AccessOutcome, RouteTable, SessionStatus};
//!
//! let table = RouteTable::standard();
//! let route = table.lookup("/admin/applications").unwrap().route;
//!
//! let state = evaluate(&SessionStatus::Resolved(None), &route.allowed);
//! assert_eq!(state.outcome(), AccessOutcome::Redirect("/login"));
//! ```

pub mod guard;
pub mod navigation;
pub mod route;
pub mod session;

pub use guard::{evaluate, AccessGuard, AccessOutcome, AccessState, SessionStatus};
pub use navigation::{dashboard_home, navigation_for, navigation_for_tag, NavEntry};
pub use route::{ProtectedRoute, RouteMatch, RouteTable, LANDING_PATH, SIGN_IN_PATH};
pub use session::{SessionContext, SessionError, SessionEvent, SessionProvider};
