//! Dashboard navigation per role

use pawconnect_core::types::Role;
use serde::Serialize;

/// One sidebar link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NavEntry {
    pub label: &'static str,
    pub path: &'static str,
}

const fn entry(label: &'static str, path: &'static str) -> NavEntry {
    NavEntry { label, path }
}

static DONOR_NAV: [NavEntry; 1] = [entry("Profile", "/dashboard")];

static SHELTER_NAV: [NavEntry; 3] = [
    entry("Overview", "/shelter/dashboard"),
    entry("Edit Profile", "/shelter/dashboard/profile"),
    entry("Preview", "/shelter/dashboard/preview"),
];

static ADMIN_NAV: [NavEntry; 3] = [
    entry("Overview", "/admin"),
    entry("Applications", "/admin/applications"),
    entry("Shelters", "/admin/shelters"),
];

/// Ordered navigation entries for a role; empty without one.
pub fn navigation_for(role: Option<Role>) -> &'static [NavEntry] {
    match role {
        Some(Role::Donor) => &DONOR_NAV,
        Some(Role::ShelterOperator) => &SHELTER_NAV,
        Some(Role::Administrator) => &ADMIN_NAV,
        None => &[],
    }
}

/// Navigation for a raw role tag. Unknown tags get no entries.
pub fn navigation_for_tag(tag: &str) -> &'static [NavEntry] {
    navigation_for(Role::parse(tag))
}

/// Dashboard home for a role; the landing page without one.
pub fn dashboard_home(role: Option<Role>) -> &'static str {
    match role {
        Some(Role::Donor) => "/dashboard",
        Some(Role::ShelterOperator) => "/shelter/dashboard",
        Some(Role::Administrator) => "/admin",
        None => crate::route::LANDING_PATH,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::route::RouteTable;

    #[test]
    fn test_navigation_per_role() {
        let labels: Vec<_> = navigation_for(Some(Role::ShelterOperator))
            .iter()
            .map(|e| e.label)
            .collect();
        assert_eq!(labels, vec!["Overview", "Edit Profile", "Preview"]);

        assert_eq!(navigation_for(Some(Role::Donor)).len(), 1);
        assert_eq!(navigation_for(Some(Role::Administrator))[1].path, "/admin/applications");
        assert!(navigation_for(None).is_empty());
    }

    #[test]
    fn test_navigation_for_tag() {
        assert_eq!(navigation_for_tag("admin"), navigation_for(Some(Role::Administrator)));
        assert_eq!(navigation_for_tag("user"), navigation_for(Some(Role::Donor)));
        assert!(navigation_for_tag("superuser").is_empty());
        assert!(navigation_for_tag("").is_empty());
    }

    #[test]
    fn test_dashboard_home() {
        assert_eq!(dashboard_home(Some(Role::Donor)), "/dashboard");
        assert_eq!(dashboard_home(Some(Role::ShelterOperator)), "/shelter/dashboard");
        assert_eq!(dashboard_home(Some(Role::Administrator)), "/admin");
        assert_eq!(dashboard_home(None), "/");
    }

    #[test]
    fn test_navigation_reachable_by_role() {
        let table = RouteTable::standard();
        for role in Role::ALL {
            for entry in navigation_for(Some(role)) {
                let matched = table.lookup(entry.path).unwrap();
                assert!(matched.route.allowed.allows(role), "{} -> {}", role, entry.path);
            }
            let home = table.lookup(dashboard_home(Some(role))).unwrap();
            assert!(home.route.allowed.allows(role));
        }
    }
}
