//! API request and response types with OpenAPI schema generation

use chrono::{DateTime, Utc};
use pawconnect_access::NavEntry;
use pawconnect_core::types::{
    Principal, Role, ShelterApplication, ShelterRecord, ShelterRegistration, ShelterUpdate,
};
use pawconnect_directory::DirectoryStats;
use pawconnect_filter::{
    ApplicationCriteria, FilterCriteria, FilterOptions, RegionSelector, StatusSelector,
    YearBracket,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

// ============================================================================
// Directory
// ============================================================================

/// Query string of the public directory.
///
/// Every parameter is optional; unknown region or bracket values are ignored.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ShelterQuery {
    /// Case-insensitive substring of the shelter name
    pub search: Option<String>,

    /// Exact region, or "All States"
    pub state: Option<String>,

    /// Case-insensitive substring of the city
    pub city: Option<String>,

    /// Founding-year bracket label, e.g. "2015-2019"
    pub established: Option<String>,
}

impl ShelterQuery {
    pub fn to_criteria(&self) -> FilterCriteria {
        let mut criteria = FilterCriteria::new();
        if let Some(search) = &self.search {
            criteria = criteria.with_search(search.as_str());
        }
        if let Some(state) = &self.state {
            criteria = criteria.with_region(RegionSelector::parse(state));
        }
        if let Some(city) = &self.city {
            criteria = criteria.with_city(city.as_str());
        }
        if let Some(established) = &self.established {
            criteria = criteria.with_established(YearBracket::parse(established));
        }
        criteria
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ShelterListResponse {
    /// Matching shelters in directory order
    pub shelters: Vec<ShelterRecord>,

    /// Number of published shelters before filtering
    pub total: usize,

    /// Number of shelters after filtering
    pub result_count: usize,

    /// Whether any criterion narrowed the listing
    pub has_active_filters: bool,

    /// Set when the directory could not be loaded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct FilterOptionsResponse {
    /// Region choices, "All States" first
    pub regions: Vec<String>,

    /// Founding-year bracket labels, "All Years" first
    pub brackets: Vec<String>,
}

impl From<FilterOptions> for FilterOptionsResponse {
    fn from(options: FilterOptions) -> Self {
        Self {
            regions: options.regions.into_iter().map(str::to_string).collect(),
            brackets: options.brackets.into_iter().map(str::to_string).collect(),
        }
    }
}

// ============================================================================
// Authentication
// ============================================================================

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(email(message = "Please enter a valid email address"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,

    /// Account kind being signed into
    pub role: Role,
}

/// Issued on login, sign-up and shelter registration.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    /// JWT access token
    pub access_token: String,

    /// Token expiration time
    pub expires_at: DateTime<Utc>,

    pub principal: Principal,

    /// Dashboard the client should open next
    pub home: String,
}

/// Donor sign-up form.
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct SignupRequest {
    #[validate(email(message = "Please enter a valid email address"))]
    pub email: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,

    #[validate(must_match(other = "password", message = "Passwords do not match"))]
    pub confirm_password: String,

    #[validate(length(min = 1, max = 100))]
    pub first_name: String,

    #[validate(length(min = 1, max = 100))]
    pub last_name: String,

    #[serde(default)]
    pub phone: Option<String>,

    #[serde(default)]
    pub city: Option<String>,

    #[serde(default)]
    pub state: Option<String>,
}

/// Shelter registration form.
///
/// Mirrors the multi-step form: account basics, location, then details.
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct ShelterRegisterRequest {
    #[validate(email(message = "Please enter a valid email address"))]
    pub email: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,

    #[validate(must_match(other = "password", message = "Passwords do not match"))]
    pub confirm_password: String,

    #[validate(length(min = 1, max = 200, message = "Please fill in all required fields"))]
    pub name: String,

    #[validate(length(min = 1, max = 32, message = "Please fill in all required fields"))]
    pub phone: String,

    #[validate(length(min = 1, message = "Please fill in all location fields"))]
    pub address: String,

    #[validate(length(min = 1, message = "Please fill in all location fields"))]
    pub city: String,

    #[validate(length(min = 1, message = "Please fill in all location fields"))]
    pub state: String,

    #[validate(length(min = 1, message = "Please fill in all location fields"))]
    pub postal_code: String,

    #[validate(length(min = 1, message = "Please provide a description"))]
    pub description: String,

    #[serde(default)]
    pub website: Option<String>,

    #[serde(default)]
    pub registration_number: Option<String>,

    #[serde(default)]
    #[validate(range(min = 1800, max = 2100))]
    pub established_year: Option<i32>,
}

impl ShelterRegisterRequest {
    /// Shelter fields of the form, without the credentials.
    pub fn registration(&self) -> ShelterRegistration {
        ShelterRegistration {
            email: self.email.clone(),
            name: self.name.trim().to_string(),
            phone: self.phone.trim().to_string(),
            address: self.address.trim().to_string(),
            city: self.city.trim().to_string(),
            state: self.state.trim().to_string(),
            postal_code: self.postal_code.trim().to_string(),
            description: self.description.trim().to_string(),
            website: self.website.clone(),
            registration_number: self.registration_number.clone(),
            established_year: self.established_year,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NavLink {
    pub label: String,
    pub path: String,
}

impl From<&NavEntry> for NavLink {
    fn from(entry: &NavEntry) -> Self {
        Self {
            label: entry.label.to_string(),
            path: entry.path.to_string(),
        }
    }
}

/// The signed-in principal and what the dashboard should show for it.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SessionResponse {
    pub principal: Principal,

    /// Lowercase capability names
    pub capabilities: Vec<String>,

    pub navigation: Vec<NavLink>,

    pub home: String,
}

// ============================================================================
// Shelter Operator
// ============================================================================

#[derive(Debug, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,

    #[validate(length(min = 1, max = 32))]
    pub phone: Option<String>,

    #[validate(length(min = 1, max = 100))]
    pub city: Option<String>,

    #[validate(length(min = 1, max = 100))]
    pub state: Option<String>,

    #[validate(length(max = 5000))]
    pub description: Option<String>,

    #[validate(length(max = 500))]
    pub website: Option<String>,

    #[validate(length(max = 32))]
    pub theme_color: Option<String>,

    #[validate(range(min = 1800, max = 2100))]
    pub established_year: Option<i32>,
}

impl From<UpdateProfileRequest> for ShelterUpdate {
    fn from(request: UpdateProfileRequest) -> Self {
        ShelterUpdate {
            name: request.name,
            phone: request.phone,
            city: request.city,
            state: request.state,
            description: request.description,
            website: request.website,
            theme_color: request.theme_color,
            established_year: request.established_year,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PublishRequest {
    /// `true` lists the shelter in the public directory
    pub published: bool,
}

// ============================================================================
// Administrator
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ApplicationQuery {
    /// Case-insensitive substring of the shelter name or city
    pub search: Option<String>,

    /// `all`, `pending`, `approved` or `rejected`
    pub status: Option<String>,
}

impl ApplicationQuery {
    pub fn to_criteria(&self) -> ApplicationCriteria {
        let mut criteria = ApplicationCriteria::default();
        if let Some(search) = &self.search {
            criteria = criteria.with_search(search.as_str());
        }
        if let Some(status) = &self.status {
            criteria = criteria.with_status(StatusSelector::parse(status));
        }
        criteria
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApplicationListResponse {
    /// Matching applications, newest first
    pub applications: Vec<ShelterApplication>,

    pub total: usize,

    pub result_count: usize,
}

#[derive(Debug, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct ReviewRequest {
    /// Shown to the applicant; required when rejecting
    #[serde(default)]
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StatsResponse {
    pub total: usize,
    pub pending: usize,
    pub approved: usize,
    pub rejected: usize,
    pub published: usize,
}

impl From<DirectoryStats> for StatsResponse {
    fn from(stats: DirectoryStats) -> Self {
        Self {
            total: stats.total,
            pending: stats.pending,
            approved: stats.approved,
            rejected: stats.rejected,
            published: stats.published,
        }
    }
}

// ============================================================================
// Protected Pages
// ============================================================================

/// What a protected page renders for an authorized visitor.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PageResponse {
    /// Stable page identifier, e.g. `admin-review`
    pub page: String,

    pub title: String,

    pub path: String,

    /// Header name of the signed-in principal
    pub display_name: String,

    pub role: Role,

    pub navigation: Vec<NavLink>,

    pub home: String,

    /// Path parameters captured from the route pattern
    pub params: BTreeMap<String, String>,

    /// Page-specific content
    #[schema(value_type = Object)]
    pub data: serde_json::Value,
}

// ============================================================================
// Error Response
// ============================================================================

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error code
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// Additional error details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,

    /// Timestamp
    pub timestamp: DateTime<Utc>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            details: None,
            timestamp: Utc::now(),
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}

// ============================================================================
// Audit Log
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuditLogEntry {
    /// Log entry ID
    pub id: Uuid,

    /// Email of the principal who performed the action
    pub user: String,

    /// Role at time of action
    pub role: Role,

    /// Action performed
    pub action: String,

    /// Resource affected
    pub resource: String,

    /// Additional details
    #[schema(value_type = Object)]
    pub details: serde_json::Value,

    /// Source IP address
    pub source_ip: String,

    /// Timestamp
    pub timestamp: DateTime<Utc>,

    /// Success or failure
    pub success: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shelter_form() -> ShelterRegisterRequest {
        ShelterRegisterRequest {
            email: "care@chennaicare.org".to_string(),
            password: "rescue1234".to_string(),
            confirm_password: "rescue1234".to_string(),
            name: "Chennai Animal Care".to_string(),
            phone: "+91 98765 43210".to_string(),
            address: "123 Main Street".to_string(),
            city: "Chennai".to_string(),
            state: "Tamil Nadu".to_string(),
            postal_code: "600001".to_string(),
            description: "Rescue and rehabilitation".to_string(),
            website: None,
            registration_number: None,
            established_year: Some(2018),
        }
    }

    #[test]
    fn test_shelter_query_to_criteria() {
        let query = ShelterQuery {
            search: Some("paws".to_string()),
            state: Some("All States".to_string()),
            city: None,
            established: Some("2015-2019".to_string()),
        };
        let criteria = query.to_criteria();

        assert_eq!(criteria.search, "paws");
        assert!(criteria.region.is_all());
        assert_eq!(criteria.established, YearBracket::From2015To2019);
        assert!(criteria.has_active_filters());

        assert!(!ShelterQuery::default().to_criteria().has_active_filters());
    }

    #[test]
    fn test_application_query_unknown_status_ignored() {
        let query = ApplicationQuery {
            search: None,
            status: Some("archived".to_string()),
        };
        assert_eq!(query.to_criteria().status, StatusSelector::All);
    }

    #[test]
    fn test_shelter_register_validation() {
        assert!(shelter_form().validate().is_ok());

        let mut mismatch = shelter_form();
        mismatch.confirm_password = "rescue12345".to_string();
        let errors = mismatch.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("confirm_password"));

        let mut short = shelter_form();
        short.password = "short".to_string();
        short.confirm_password = "short".to_string();
        assert!(short.validate().unwrap_err().field_errors().contains_key("password"));

        let mut missing = shelter_form();
        missing.postal_code = String::new();
        assert!(missing
            .validate()
            .unwrap_err()
            .field_errors()
            .contains_key("postal_code"));
    }

    #[test]
    fn test_registration_trims_fields() {
        let mut form = shelter_form();
        form.city = "  Chennai ".to_string();
        assert_eq!(form.registration().city, "Chennai");
    }

    #[test]
    fn test_login_request_accepts_legacy_role_tag() {
        let request: LoginRequest = serde_json::from_value(serde_json::json!({
            "email": "admin@pawconnect.in",
            "password": "secret",
            "role": "admin"
        }))
        .unwrap();
        assert_eq!(request.role, Role::Administrator);
    }
}
