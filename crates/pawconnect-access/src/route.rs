//! Protected route table
//!
//! Each protected page declares a static allow-list of roles. Patterns use
//! `{name}` segments for path parameters.

use pawconnect_core::types::RoleSet;

/// Where unauthenticated visitors are sent.
pub const SIGN_IN_PATH: &str = "/login";

/// Where signed-in visitors without access are sent.
pub const LANDING_PATH: &str = "/";

/// A protected page and the roles allowed to see it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtectedRoute {
    /// Path pattern, e.g. `/admin/review/{id}`
    pub pattern: &'static str,
    /// Stable page identifier
    pub page: &'static str,
    /// Page heading
    pub title: &'static str,
    pub allowed: RoleSet,
}

impl ProtectedRoute {
    pub const fn new(
        pattern: &'static str,
        page: &'static str,
        title: &'static str,
        allowed: RoleSet,
    ) -> Self {
        Self {
            pattern,
            page,
            title,
            allowed,
        }
    }

    /// Matches a concrete path, returning captured parameters.
    pub fn match_path(&self, path: &str) -> Option<Vec<(String, String)>> {
        let mut params = Vec::new();
        let mut wanted = segments(self.pattern);
        let mut given = segments(path);

        loop {
            match (wanted.next(), given.next()) {
                (None, None) => return Some(params),
                (Some(w), Some(g)) => {
                    if let Some(name) = w.strip_prefix('{').and_then(|w| w.strip_suffix('}')) {
                        params.push((name.to_string(), g.to_string()));
                    } else if w != g {
                        return None;
                    }
                }
                _ => return None,
            }
        }
    }
}

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

/// A resolved lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch<'a> {
    pub route: &'a ProtectedRoute,
    pub params: Vec<(String, String)>,
}

impl RouteMatch<'_> {
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// Ordered set of protected routes.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: Vec<ProtectedRoute>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// The PawConnect dashboard pages.
    pub fn standard() -> Self {
        Self::new()
            .with_route(ProtectedRoute::new(
                "/dashboard",
                "donor-dashboard",
                "My Profile",
                RoleSet::DONOR,
            ))
            .with_route(ProtectedRoute::new(
                "/shelter/dashboard",
                "shelter-overview",
                "Shelter Overview",
                RoleSet::SHELTER_OPERATOR,
            ))
            .with_route(ProtectedRoute::new(
                "/shelter/dashboard/profile",
                "shelter-profile",
                "Edit Profile",
                RoleSet::SHELTER_OPERATOR,
            ))
            .with_route(ProtectedRoute::new(
                "/shelter/dashboard/preview",
                "shelter-preview",
                "Profile Preview",
                RoleSet::SHELTER_OPERATOR,
            ))
            .with_route(ProtectedRoute::new(
                "/admin",
                "admin-overview",
                "Admin Overview",
                RoleSet::ADMINISTRATOR,
            ))
            .with_route(ProtectedRoute::new(
                "/admin/applications",
                "admin-applications",
                "Shelter Applications",
                RoleSet::ADMINISTRATOR,
            ))
            .with_route(ProtectedRoute::new(
                "/admin/review/{id}",
                "admin-review",
                "Review Application",
                RoleSet::ADMINISTRATOR,
            ))
            .with_route(ProtectedRoute::new(
                "/admin/shelters",
                "admin-shelters",
                "Manage Shelters",
                RoleSet::ADMINISTRATOR,
            ))
    }

    pub fn with_route(mut self, route: ProtectedRoute) -> Self {
        self.routes.push(route);
        self
    }

    /// First route whose pattern matches `path`.
    pub fn lookup(&self, path: &str) -> Option<RouteMatch<'_>> {
        self.routes.iter().find_map(|route| {
            route
                .match_path(path)
                .map(|params| RouteMatch { route, params })
        })
    }

    pub fn routes(&self) -> &[ProtectedRoute] {
        &self.routes
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pawconnect_core::types::Role;

    #[test]
    fn test_standard_table() {
        let table = RouteTable::standard();
        assert_eq!(table.len(), 8);

        let donor = table.lookup("/dashboard").unwrap();
        assert!(donor.route.allowed.allows(Role::Donor));
        assert!(!donor.route.allowed.allows(Role::Administrator));

        let preview = table.lookup("/shelter/dashboard/preview").unwrap();
        assert_eq!(preview.route.page, "shelter-preview");
        assert!(preview.route.allowed.allows(Role::ShelterOperator));
    }

    #[test]
    fn test_lookup_captures_params() {
        let table = RouteTable::standard();
        let review = table.lookup("/admin/review/abc-123").unwrap();

        assert_eq!(review.route.page, "admin-review");
        assert_eq!(review.param("id"), Some("abc-123"));
        assert_eq!(review.param("other"), None);
    }

    #[test]
    fn test_lookup_ignores_trailing_slash() {
        let table = RouteTable::standard();
        assert_eq!(table.lookup("/admin/").unwrap().route.page, "admin-overview");
    }

    #[test]
    fn test_lookup_misses() {
        let table = RouteTable::standard();
        assert!(table.lookup("/").is_none());
        assert!(table.lookup("/admin/review").is_none());
        assert!(table.lookup("/admin/review/1/extra").is_none());
        assert!(table.lookup("/shelters").is_none());
    }

    #[test]
    fn test_every_route_allows_someone() {
        for route in RouteTable::standard().routes() {
            assert!(!route.allowed.is_empty(), "{}", route.pattern);
        }
    }
}
