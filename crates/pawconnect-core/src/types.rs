//! Core domain types for PawConnect.
//!
//! Shelters are stored as [`ShelterProfile`] rows and exposed to the public
//! directory through the read-only [`ShelterRecord`] projection. Signed-in
//! identities are modelled by [`Principal`], a sum type over the three account
//! kinds; every permission question goes through [`Principal::capabilities`].

use bitflags::bitflags;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

// ============================================================================
// Identifiers
// ============================================================================

/// Opaque shelter identifier.
///
/// Seeded shelters carry short ids ("1", "2", ...); shelters created through
/// registration share the UUID of the operator account that owns them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(transparent)]
pub struct ShelterId(String);

impl ShelterId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ShelterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ShelterId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ShelterId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<Uuid> for ShelterId {
    fn from(id: Uuid) -> Self {
        Self(id.to_string())
    }
}

// ============================================================================
// Shelters
// ============================================================================

/// Review state of a shelter application.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum VerificationStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl VerificationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VerificationStatus::Pending => "pending",
            VerificationStatus::Approved => "approved",
            VerificationStatus::Rejected => "rejected",
        }
    }

    /// Parses the lowercase wire form.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(VerificationStatus::Pending),
            "approved" => Some(VerificationStatus::Approved),
            "rejected" => Some(VerificationStatus::Rejected),
            _ => None,
        }
    }
}

impl fmt::Display for VerificationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How donors reach a shelter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct Contact {
    pub email: String,
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
}

/// Public directory entry for a shelter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct ShelterRecord {
    pub id: ShelterId,
    pub name: String,
    pub city: String,
    /// Region (Indian state or union territory)
    pub state: String,
    pub description: String,
    /// Image URL, empty when the shelter has not uploaded one
    pub image: String,
    #[serde(flatten)]
    pub contact: Contact,
    pub verified: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub established_year: Option<i32>,
}

/// Full stored row behind a shelter listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct ShelterProfile {
    pub id: ShelterId,
    pub email: String,
    pub name: String,
    pub phone: String,
    pub address: Option<String>,
    pub city: String,
    pub state: String,
    pub postal_code: Option<String>,
    pub description: Option<String>,
    pub website: Option<String>,
    pub registration_number: Option<String>,
    pub established_year: Option<i32>,
    pub verification_status: VerificationStatus,
    pub is_published: bool,
    pub theme_color: Option<String>,
    pub logo_url: Option<String>,
    pub cover_image_url: Option<String>,
    /// Administrator notes recorded with the last review decision
    pub review_notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ShelterProfile {
    /// Whether the shelter appears in the public directory.
    pub fn is_listed(&self) -> bool {
        self.verification_status == VerificationStatus::Approved && self.is_published
    }

    /// Projects the stored row onto the public directory shape.
    pub fn to_record(&self) -> ShelterRecord {
        ShelterRecord {
            id: self.id.clone(),
            name: self.name.clone(),
            city: self.city.clone(),
            state: self.state.clone(),
            description: self.description.clone().unwrap_or_default(),
            image: self.cover_image_url.clone().unwrap_or_default(),
            contact: Contact {
                email: self.email.clone(),
                phone: self.phone.clone(),
                website: self.website.clone(),
            },
            verified: self.verification_status == VerificationStatus::Approved,
            established_year: self.established_year,
        }
    }

    /// Builds the administrator view of this profile.
    pub fn to_application(&self) -> ShelterApplication {
        ShelterApplication {
            id: self.id.clone(),
            name: self.name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            address: self.address.clone(),
            city: self.city.clone(),
            state: self.state.clone(),
            postal_code: self.postal_code.clone(),
            description: self.description.clone(),
            website: self.website.clone(),
            registration_number: self.registration_number.clone(),
            established_year: self.established_year,
            status: self.verification_status,
            review_notes: self.review_notes.clone(),
            submitted_at: self.created_at,
        }
    }
}

/// Data captured by the shelter registration form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct ShelterRegistration {
    pub email: String,
    pub name: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub description: String,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub registration_number: Option<String>,
    #[serde(default)]
    pub established_year: Option<i32>,
}

/// Partial update of a shelter's editable profile fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct ShelterUpdate {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub description: Option<String>,
    pub website: Option<String>,
    pub theme_color: Option<String>,
    pub established_year: Option<i32>,
}

impl ShelterUpdate {
    pub fn is_empty(&self) -> bool {
        *self == ShelterUpdate::default()
    }
}

/// Administrator view of a submitted shelter application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct ShelterApplication {
    pub id: ShelterId,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: Option<String>,
    pub city: String,
    pub state: String,
    pub postal_code: Option<String>,
    pub description: Option<String>,
    pub website: Option<String>,
    pub registration_number: Option<String>,
    pub established_year: Option<i32>,
    pub status: VerificationStatus,
    pub review_notes: Option<String>,
    pub submitted_at: DateTime<Utc>,
}

// ============================================================================
// Roles and capabilities
// ============================================================================

/// Account kind of a principal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub enum Role {
    #[serde(rename = "donor", alias = "user")]
    Donor,
    #[serde(rename = "shelter-operator", alias = "shelter")]
    ShelterOperator,
    #[serde(rename = "administrator", alias = "admin")]
    Administrator,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Donor, Role::ShelterOperator, Role::Administrator];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Donor => "donor",
            Role::ShelterOperator => "shelter-operator",
            Role::Administrator => "administrator",
        }
    }

    /// Parses a role tag, accepting both the canonical and the short legacy
    /// forms. Anything else yields `None`.
    pub fn parse(tag: &str) -> Option<Self> {
        match tag {
            "donor" | "user" => Some(Role::Donor),
            "shelter-operator" | "shelter" => Some(Role::ShelterOperator),
            "administrator" | "admin" => Some(Role::Administrator),
            _ => None,
        }
    }

    /// Capabilities granted to every principal holding this role.
    pub fn capabilities(&self) -> Capabilities {
        match self {
            Role::Donor => Capabilities::BROWSE | Capabilities::DONOR_DASHBOARD,
            Role::ShelterOperator => {
                Capabilities::BROWSE
                    | Capabilities::MANAGE_SHELTER_PROFILE
                    | Capabilities::PUBLISH_SHELTER
            }
            Role::Administrator => {
                Capabilities::BROWSE
                    | Capabilities::REVIEW_APPLICATIONS
                    | Capabilities::VIEW_AUDIT_LOG
            }
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

bitflags! {
    /// What a principal is allowed to do.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct Capabilities: u32 {
        const BROWSE = 1 << 0;
        const DONOR_DASHBOARD = 1 << 1;
        const MANAGE_SHELTER_PROFILE = 1 << 2;
        const PUBLISH_SHELTER = 1 << 3;
        const REVIEW_APPLICATIONS = 1 << 4;
        const VIEW_AUDIT_LOG = 1 << 5;
    }
}

impl Capabilities {
    /// Lowercase names of every set capability, in declaration order.
    pub fn names(&self) -> Vec<String> {
        self.iter_names()
            .map(|(name, _)| name.to_lowercase())
            .collect()
    }
}

bitflags! {
    /// Set of roles allowed through a protected route.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct RoleSet: u8 {
        const DONOR = 1 << 0;
        const SHELTER_OPERATOR = 1 << 1;
        const ADMINISTRATOR = 1 << 2;
    }
}

impl RoleSet {
    /// Membership test for a single role.
    pub fn allows(&self, role: Role) -> bool {
        self.contains(RoleSet::from(role))
    }
}

impl From<Role> for RoleSet {
    fn from(role: Role) -> Self {
        match role {
            Role::Donor => RoleSet::DONOR,
            Role::ShelterOperator => RoleSet::SHELTER_OPERATOR,
            Role::Administrator => RoleSet::ADMINISTRATOR,
        }
    }
}

// ============================================================================
// Principals
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct DonorProfile {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct ShelterOperatorProfile {
    pub id: Uuid,
    pub email: String,
    pub shelter_id: ShelterId,
    /// Shelter display name
    pub name: String,
    pub verification_status: VerificationStatus,
    pub is_published: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct AdministratorProfile {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

/// The authenticated identity of a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(tag = "role", rename_all = "kebab-case")]
pub enum Principal {
    Donor(DonorProfile),
    ShelterOperator(ShelterOperatorProfile),
    Administrator(AdministratorProfile),
}

impl Principal {
    pub fn id(&self) -> Uuid {
        match self {
            Principal::Donor(p) => p.id,
            Principal::ShelterOperator(p) => p.id,
            Principal::Administrator(p) => p.id,
        }
    }

    pub fn email(&self) -> &str {
        match self {
            Principal::Donor(p) => &p.email,
            Principal::ShelterOperator(p) => &p.email,
            Principal::Administrator(p) => &p.email,
        }
    }

    pub fn role(&self) -> Role {
        match self {
            Principal::Donor(_) => Role::Donor,
            Principal::ShelterOperator(_) => Role::ShelterOperator,
            Principal::Administrator(_) => Role::Administrator,
        }
    }

    /// Name shown in the dashboard header.
    pub fn display_name(&self) -> String {
        match self {
            Principal::Donor(p) => format!("{} {}", p.first_name, p.last_name),
            Principal::ShelterOperator(p) => p.name.clone(),
            Principal::Administrator(p) => format!("{} {}", p.first_name, p.last_name),
        }
    }

    pub fn capabilities(&self) -> Capabilities {
        self.role().capabilities()
    }

    pub fn can(&self, capability: Capabilities) -> bool {
        self.capabilities().contains(capability)
    }
}
