//! Seed data for the directory
//!
//! Seed files list shelters that go live immediately: each entry becomes an
//! approved, published profile.

use chrono::Utc;
use pawconnect_core::error::{ConfigError, Result};
use pawconnect_core::types::{ShelterId, ShelterProfile, VerificationStatus};
use serde::Deserialize;
use std::path::Path;
use tracing::info;

const BUILTIN_SEED: &str = include_str!("../data/shelters.yaml");

#[derive(Debug, Deserialize)]
struct SeedFile {
    #[serde(default)]
    shelters: Vec<SeedShelter>,
}

#[derive(Debug, Deserialize)]
struct SeedShelter {
    id: String,
    name: String,
    city: String,
    state: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    image: Option<String>,
    email: String,
    phone: String,
    #[serde(default)]
    website: Option<String>,
    #[serde(default)]
    established_year: Option<i32>,
}

impl SeedShelter {
    fn into_profile(self) -> ShelterProfile {
        let now = Utc::now();
        ShelterProfile {
            id: ShelterId::new(self.id),
            email: self.email,
            name: self.name,
            phone: self.phone,
            address: None,
            city: self.city,
            state: self.state,
            postal_code: None,
            description: self.description,
            website: self.website,
            registration_number: None,
            established_year: self.established_year,
            verification_status: VerificationStatus::Approved,
            is_published: true,
            theme_color: None,
            logo_url: None,
            cover_image_url: self.image,
            review_notes: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Parses seed YAML into live shelter profiles.
pub fn parse_seed(yaml: &str) -> Result<Vec<ShelterProfile>> {
    let file: SeedFile = serde_yaml::from_str(yaml).map_err(|e| ConfigError::InvalidFormat {
        reason: format!("seed data: {}", e),
    })?;
    Ok(file
        .shelters
        .into_iter()
        .map(SeedShelter::into_profile)
        .collect())
}

/// Loads a seed file from disk.
pub fn load_seed_file<P: AsRef<Path>>(path: P) -> Result<Vec<ShelterProfile>> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::LoadFailed {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    let profiles = parse_seed(&contents)?;
    info!(path = %path.display(), count = profiles.len(), "Loaded shelter seed file");
    Ok(profiles)
}

/// The bundled sample shelters.
pub fn builtin_seed() -> Result<Vec<ShelterProfile>> {
    parse_seed(BUILTIN_SEED)
}
