//! Filtering for the administrator's application queue

use crate::engine::FilterEngine;
use crate::rules::{CityFilter, CompositeFilter, NameFilter};
use pawconnect_core::types::{ShelterApplication, VerificationStatus};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// Status constraint for the application queue.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum StatusSelector {
    #[default]
    All,
    Only(VerificationStatus),
}

impl StatusSelector {
    /// Parses `all`, `pending`, `approved` or `rejected`; anything else
    /// means no constraint.
    pub fn parse(value: &str) -> Self {
        match value.trim() {
            "" | "all" => StatusSelector::All,
            other => match VerificationStatus::parse(other) {
                Some(status) => StatusSelector::Only(status),
                None => {
                    debug!(value = other, "Unrecognised status selector ignored");
                    StatusSelector::All
                }
            },
        }
    }

    pub fn admits(&self, status: VerificationStatus) -> bool {
        match self {
            StatusSelector::All => true,
            StatusSelector::Only(wanted) => *wanted == status,
        }
    }
}

impl From<String> for StatusSelector {
    fn from(value: String) -> Self {
        StatusSelector::parse(&value)
    }
}

impl From<StatusSelector> for String {
    fn from(selector: StatusSelector) -> Self {
        match selector {
            StatusSelector::All => "all".to_string(),
            StatusSelector::Only(status) => status.as_str().to_string(),
        }
    }
}

/// Search box and status tabs of the application queue.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicationCriteria {
    /// Case-insensitive substring of the shelter name or city
    pub search: String,
    pub status: StatusSelector,
}

impl ApplicationCriteria {
    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }

    pub fn with_status(mut self, status: StatusSelector) -> Self {
        self.status = status;
        self
    }
}

/// Narrows the application queue, keeping its order.
pub fn filter_applications<'a>(
    applications: &'a [ShelterApplication],
    criteria: &ApplicationCriteria,
) -> Vec<&'a ShelterApplication> {
    let mut engine = FilterEngine::new();
    if !criteria.search.is_empty() {
        engine = engine.with_rule(Arc::new(CompositeFilter::Or(vec![
            Arc::new(NameFilter::new(&criteria.search)),
            Arc::new(CityFilter::new(&criteria.search)),
        ])));
    }

    applications
        .iter()
        .filter(|app| criteria.status.admits(app.status))
        .filter(|app| engine.matches_listing(*app))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pawconnect_core::types::ShelterId;

    fn application(id: &str, name: &str, city: &str, status: VerificationStatus) -> ShelterApplication {
        ShelterApplication {
            id: ShelterId::from(id),
            name: name.to_string(),
            email: format!("{}@example.org", id),
            phone: "+91 90000 00000".to_string(),
            address: None,
            city: city.to_string(),
            state: "Maharashtra".to_string(),
            postal_code: None,
            description: None,
            website: None,
            registration_number: None,
            established_year: None,
            status,
            review_notes: None,
            submitted_at: Default::default(),
        }
    }

    fn queue() -> Vec<ShelterApplication> {
        vec![
            application("a", "Happy Tails", "Pune", VerificationStatus::Pending),
            application("b", "Pune Paws", "Nagpur", VerificationStatus::Approved),
            application("c", "Stray Hearts", "Mumbai", VerificationStatus::Rejected),
            application("d", "Nashik Rescue", "Nashik", VerificationStatus::Pending),
        ]
    }

    fn ids(apps: &[&ShelterApplication]) -> Vec<String> {
        apps.iter().map(|a| a.id.to_string()).collect()
    }

    #[test]
    fn test_default_returns_everything() {
        let apps = queue();
        assert_eq!(
            ids(&filter_applications(&apps, &ApplicationCriteria::default())),
            vec!["a", "b", "c", "d"]
        );
    }

    #[test]
    fn test_search_matches_name_or_city() {
        let apps = queue();
        let criteria = ApplicationCriteria::default().with_search("PUNE");
        assert_eq!(ids(&filter_applications(&apps, &criteria)), vec!["a", "b"]);
    }

    #[test]
    fn test_status_tab() {
        let apps = queue();
        let criteria =
            ApplicationCriteria::default().with_status(StatusSelector::Only(VerificationStatus::Pending));
        assert_eq!(ids(&filter_applications(&apps, &criteria)), vec!["a", "d"]);

        let criteria = criteria.with_search("nashik");
        assert_eq!(ids(&filter_applications(&apps, &criteria)), vec!["d"]);
    }

    #[test]
    fn test_status_selector_parse() {
        assert_eq!(StatusSelector::parse("all"), StatusSelector::All);
        assert_eq!(
            StatusSelector::parse("rejected"),
            StatusSelector::Only(VerificationStatus::Rejected)
        );
        assert_eq!(StatusSelector::parse("archived"), StatusSelector::All);
        assert!(StatusSelector::All.admits(VerificationStatus::Approved));
    }
}
