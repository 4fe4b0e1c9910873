//! In-memory shelter directory
//!
//! Holds every shelter profile in insertion order behind a single
//! `parking_lot::RwLock`. The public listing keeps insertion order; the
//! administrator queue is newest first.

use crate::source::DirectorySource;
use async_trait::async_trait;
use chrono::Utc;
use metrics::counter;
use parking_lot::RwLock;
use pawconnect_core::error::{DirectoryError, ReviewError};
use pawconnect_core::types::{
    ShelterApplication, ShelterId, ShelterProfile, ShelterRecord, ShelterRegistration,
    ShelterUpdate, VerificationStatus,
};
use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, info};

#[derive(Debug, Default)]
struct Profiles {
    rows: Vec<ShelterProfile>,
    index: HashMap<ShelterId, usize>,
}

impl Profiles {
    fn get(&self, id: &ShelterId) -> Option<&ShelterProfile> {
        self.index.get(id).map(|&pos| &self.rows[pos])
    }

    fn get_mut(&mut self, id: &ShelterId) -> Option<&mut ShelterProfile> {
        match self.index.get(id) {
            Some(&pos) => self.rows.get_mut(pos),
            None => None,
        }
    }

    fn email_taken(&self, email: &str) -> bool {
        self.rows.iter().any(|p| p.email.eq_ignore_ascii_case(email))
    }

    fn push(&mut self, profile: ShelterProfile) -> Result<(), DirectoryError> {
        if self.index.contains_key(&profile.id) {
            return Err(DirectoryError::not_allowed(
                profile.id.as_str(),
                "a shelter with this id already exists",
            ));
        }
        if self.email_taken(&profile.email) {
            return Err(DirectoryError::AlreadyRegistered {
                email: profile.email,
            });
        }
        self.index.insert(profile.id.clone(), self.rows.len());
        self.rows.push(profile);
        Ok(())
    }
}

/// Counts shown on the administrator overview.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryStats {
    pub total: usize,
    pub pending: usize,
    pub approved: usize,
    pub rejected: usize,
    pub published: usize,
}

/// Thread-safe in-memory directory.
#[derive(Debug, Default)]
pub struct MemoryDirectory {
    profiles: RwLock<Profiles>,
}

impl MemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a directory from seed profiles, skipping duplicates.
    pub fn with_profiles(profiles: impl IntoIterator<Item = ShelterProfile>) -> Self {
        let directory = Self::new();
        for profile in profiles {
            if let Err(e) = directory.insert(profile) {
                debug!(error = %e, "Skipping duplicate seed shelter");
            }
        }
        directory
    }

    /// Adds a fully formed profile.
    pub fn insert(&self, profile: ShelterProfile) -> Result<(), DirectoryError> {
        self.profiles.write().push(profile)
    }

    /// Records a new shelter application in the `pending` state.
    ///
    /// The shelter shares `id` with the operator account that submitted it.
    pub fn submit_application(
        &self,
        id: ShelterId,
        registration: ShelterRegistration,
    ) -> Result<ShelterProfile, DirectoryError> {
        let now = Utc::now();
        let profile = ShelterProfile {
            id,
            email: registration.email,
            name: registration.name,
            phone: registration.phone,
            address: Some(registration.address),
            city: registration.city,
            state: registration.state,
            postal_code: Some(registration.postal_code),
            description: Some(registration.description),
            website: registration.website.filter(|w| !w.is_empty()),
            registration_number: registration.registration_number.filter(|r| !r.is_empty()),
            established_year: registration.established_year,
            verification_status: VerificationStatus::Pending,
            is_published: false,
            theme_color: None,
            logo_url: None,
            cover_image_url: None,
            review_notes: None,
            created_at: now,
            updated_at: now,
        };

        self.profiles.write().push(profile.clone())?;

        counter!("pawconnect_applications_submitted_total").increment(1);
        info!(shelter_id = %profile.id, name = %profile.name, "Shelter application submitted");
        Ok(profile)
    }

    pub fn profile(&self, id: &ShelterId) -> Option<ShelterProfile> {
        self.profiles.read().get(id).cloned()
    }

    /// Applies a partial update to a shelter's editable fields.
    pub fn update_profile(
        &self,
        id: &ShelterId,
        update: ShelterUpdate,
    ) -> Result<ShelterProfile, DirectoryError> {
        let mut profiles = self.profiles.write();
        let profile = profiles
            .get_mut(id)
            .ok_or_else(|| DirectoryError::not_found(id.as_str()))?;

        if let Some(name) = update.name {
            profile.name = name;
        }
        if let Some(phone) = update.phone {
            profile.phone = phone;
        }
        if let Some(city) = update.city {
            profile.city = city;
        }
        if let Some(state) = update.state {
            profile.state = state;
        }
        if let Some(description) = update.description {
            profile.description = Some(description);
        }
        if let Some(website) = update.website {
            profile.website = Some(website).filter(|w| !w.is_empty());
        }
        if let Some(theme_color) = update.theme_color {
            profile.theme_color = Some(theme_color);
        }
        if let Some(year) = update.established_year {
            profile.established_year = Some(year);
        }
        profile.updated_at = Utc::now();

        debug!(shelter_id = %id, "Shelter profile updated");
        Ok(profile.clone())
    }

    /// Lists or unlists a shelter. Only approved shelters can be listed.
    pub fn set_published(
        &self,
        id: &ShelterId,
        published: bool,
    ) -> Result<ShelterProfile, DirectoryError> {
        let mut profiles = self.profiles.write();
        let profile = profiles
            .get_mut(id)
            .ok_or_else(|| DirectoryError::not_found(id.as_str()))?;

        if published && profile.verification_status != VerificationStatus::Approved {
            return Err(DirectoryError::not_allowed(
                id.as_str(),
                format!(
                    "only approved shelters can be published (status: {})",
                    profile.verification_status
                ),
            ));
        }

        profile.is_published = published;
        profile.updated_at = Utc::now();
        info!(shelter_id = %id, published, "Shelter visibility changed");
        Ok(profile.clone())
    }

    /// Moves a pending application to `status` under one write lock.
    pub(crate) fn transition(
        &self,
        id: &ShelterId,
        status: VerificationStatus,
        notes: Option<String>,
    ) -> Result<ShelterProfile, ReviewError> {
        let mut profiles = self.profiles.write();
        let profile = profiles
            .get_mut(id)
            .ok_or_else(|| ReviewError::NotFound { id: id.to_string() })?;
        if profile.verification_status != VerificationStatus::Pending {
            return Err(ReviewError::AlreadyDecided {
                id: id.to_string(),
                status: profile.verification_status,
            });
        }

        profile.verification_status = status;
        profile.review_notes = notes;
        if status != VerificationStatus::Approved {
            profile.is_published = false;
        }
        profile.updated_at = Utc::now();
        Ok(profile.clone())
    }

    /// Every application, newest first.
    pub fn applications(&self) -> Vec<ShelterApplication> {
        let profiles = self.profiles.read();
        let mut apps: Vec<_> = profiles
            .rows
            .iter()
            .rev()
            .map(ShelterProfile::to_application)
            .collect();
        apps.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));
        apps
    }

    /// Applications awaiting review, newest first.
    pub fn pending_applications(&self) -> Vec<ShelterApplication> {
        self.applications()
            .into_iter()
            .filter(|app| app.status == VerificationStatus::Pending)
            .collect()
    }

    pub fn application(&self, id: &ShelterId) -> Option<ShelterApplication> {
        self.profiles.read().get(id).map(ShelterProfile::to_application)
    }

    /// Approved and published shelters in insertion order.
    pub fn listed(&self) -> Vec<ShelterRecord> {
        self.profiles
            .read()
            .rows
            .iter()
            .filter(|p| p.is_listed())
            .map(ShelterProfile::to_record)
            .collect()
    }

    pub fn stats(&self) -> DirectoryStats {
        let profiles = self.profiles.read();
        let mut stats = DirectoryStats {
            total: profiles.rows.len(),
            ..Default::default()
        };
        for profile in &profiles.rows {
            match profile.verification_status {
                VerificationStatus::Pending => stats.pending += 1,
                VerificationStatus::Approved => stats.approved += 1,
                VerificationStatus::Rejected => stats.rejected += 1,
            }
            if profile.is_listed() {
                stats.published += 1;
            }
        }
        stats
    }

    pub fn len(&self) -> usize {
        self.profiles.read().rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl DirectorySource for MemoryDirectory {
    async fn fetch_published_shelters(&self) -> Result<Vec<ShelterRecord>, DirectoryError> {
        Ok(self.listed())
    }

    async fn fetch_shelter_by_id(
        &self,
        id: &ShelterId,
    ) -> Result<Option<ShelterRecord>, DirectoryError> {
        Ok(self
            .profiles
            .read()
            .get(id)
            .filter(|p| p.is_listed())
            .map(ShelterProfile::to_record))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::builtin_seed;

    fn registration(email: &str, name: &str) -> ShelterRegistration {
        ShelterRegistration {
            email: email.to_string(),
            name: name.to_string(),
            phone: "+91 90000 00000".to_string(),
            address: "12 MG Road".to_string(),
            city: "Pune".to_string(),
            state: "Maharashtra".to_string(),
            postal_code: "411001".to_string(),
            description: "Rescue and rehoming".to_string(),
            website: Some(String::new()),
            registration_number: Some("MH/2020/1".to_string()),
            established_year: Some(2020),
        }
    }

    fn seeded() -> MemoryDirectory {
        MemoryDirectory::with_profiles(builtin_seed().unwrap())
    }

    #[test]
    fn test_seeded_listing_keeps_order() {
        let directory = seeded();
        let ids: Vec<_> = directory.listed().iter().map(|r| r.id.to_string()).collect();
        assert_eq!(ids, vec!["1", "2", "3", "4", "5", "6"]);
    }

    #[test]
    fn test_submit_application_is_pending_and_unlisted() {
        let directory = seeded();
        let profile = directory
            .submit_application(ShelterId::from("new-1"), registration("a@paws.org", "Happy Tails"))
            .unwrap();

        assert_eq!(profile.verification_status, VerificationStatus::Pending);
        assert!(!profile.is_published);
        assert_eq!(profile.website, None);
        assert_eq!(directory.listed().len(), 6);
        assert_eq!(directory.pending_applications().len(), 1);
    }

    #[test]
    fn test_duplicate_email_rejected() {
        let directory = seeded();
        let err = directory
            .submit_application(ShelterId::from("x"), registration("CONTACT@mumbaidogs.org", "Dup"))
            .unwrap_err();
        assert!(matches!(err, DirectoryError::AlreadyRegistered { .. }));
    }

    #[test]
    fn test_pending_newest_first() {
        let directory = MemoryDirectory::new();
        for (id, email) in [("a", "a@x.org"), ("b", "b@x.org"), ("c", "c@x.org")] {
            directory
                .submit_application(ShelterId::from(id), registration(email, id))
                .unwrap();
        }

        let ids: Vec<_> = directory
            .pending_applications()
            .iter()
            .map(|a| a.id.to_string())
            .collect();
        assert_eq!(ids, vec!["c", "b", "a"]);
    }

    #[test]
    fn test_update_profile() {
        let directory = seeded();
        let id = ShelterId::from("2");
        let updated = directory
            .update_profile(
                &id,
                ShelterUpdate {
                    city: Some("Delhi NCR".to_string()),
                    website: Some("https://dar.org".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(updated.city, "Delhi NCR");
        assert_eq!(updated.website.as_deref(), Some("https://dar.org"));
        assert_eq!(updated.name, "Delhi Animal Rescue");

        let missing = directory.update_profile(&ShelterId::from("404"), ShelterUpdate::default());
        assert!(matches!(missing, Err(DirectoryError::NotFound { .. })));
    }

    #[test]
    fn test_publish_requires_approval() {
        let directory = MemoryDirectory::new();
        let id = ShelterId::from("p");
        directory
            .submit_application(id.clone(), registration("p@x.org", "P"))
            .unwrap();

        let err = directory.set_published(&id, true).unwrap_err();
        assert!(matches!(err, DirectoryError::NotAllowed { .. }));

        directory
            .transition(&id, VerificationStatus::Approved, None)
            .unwrap();
        assert!(directory.set_published(&id, true).unwrap().is_listed());
        assert_eq!(directory.listed().len(), 1);

        assert!(!directory.set_published(&id, false).unwrap().is_published);
    }

    #[test]
    fn test_stats() {
        let directory = seeded();
        directory
            .submit_application(ShelterId::from("n"), registration("n@x.org", "N"))
            .unwrap();
        directory.set_published(&ShelterId::from("6"), false).unwrap();

        let stats = directory.stats();
        assert_eq!(stats.total, 7);
        assert_eq!(stats.pending, 1);
        assert_eq!(stats.approved, 6);
        assert_eq!(stats.published, 5);
    }

    #[tokio::test]
    async fn test_source_only_returns_listed() {
        let directory = seeded();
        directory
            .submit_application(ShelterId::from("hidden"), registration("h@x.org", "Hidden"))
            .unwrap();

        assert_eq!(directory.fetch_published_shelters().await.unwrap().len(), 6);
        assert!(directory
            .fetch_shelter_by_id(&ShelterId::from("hidden"))
            .await
            .unwrap()
            .is_none());
        let mumbai = directory
            .fetch_shelter_by_id(&ShelterId::from("1"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(mumbai.name, "Mumbai Street Dogs Care");
    }
}
