//! # PawConnect Core
//!
//! Core types, error handling, and configuration for the PawConnect shelter
//! directory.
//!
//! - **Types**: shelter rows and their public projection, roles, capability
//!   sets and the [`Principal`] sum type.
//! - **Errors**: `thiserror` enums for configuration, directory and review
//!   failures, serializable for API responses.
//! - **Configuration**: YAML configuration with environment overrides and
//!   validation.
//!
//! ## Example
//!
//! ```
//! use pawconnect_core::types::{Capabilities, Role};
//!
//! let caps = Role::Administrator.capabilities();
//! assert!(caps.contains(Capabilities::REVIEW_APPLICATIONS));
//! ```

pub mod config;
pub mod error;
pub mod types;

pub use config::AppConfig;
pub use error::{PawConnectError, Result};
pub use types::{
    Capabilities, Principal, Role, RoleSet, ShelterId, ShelterProfile, ShelterRecord,
    VerificationStatus,
};
