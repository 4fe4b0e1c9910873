//! Directory data source
//!
//! The public directory reads through [`DirectorySource`]. Loading never
//! fails from the caller's point of view: an unavailable source yields an
//! empty [`DirectoryView`] that carries the error message.

use async_trait::async_trait;
use pawconnect_core::error::DirectoryError;
use pawconnect_core::types::{ShelterId, ShelterRecord};
use pawconnect_filter::{filter_shelters, FilterCriteria};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, warn};

/// Read access to published shelters.
#[async_trait]
pub trait DirectorySource: Send + Sync {
    /// Approved and published shelters, in directory order.
    async fn fetch_published_shelters(&self) -> Result<Vec<ShelterRecord>, DirectoryError>;

    /// A published shelter, or `None` if there is no such listing.
    async fn fetch_shelter_by_id(
        &self,
        id: &ShelterId,
    ) -> Result<Option<ShelterRecord>, DirectoryError>;
}

#[async_trait]
impl<T: DirectorySource + ?Sized> DirectorySource for Arc<T> {
    async fn fetch_published_shelters(&self) -> Result<Vec<ShelterRecord>, DirectoryError> {
        (**self).fetch_published_shelters().await
    }

    async fn fetch_shelter_by_id(
        &self,
        id: &ShelterId,
    ) -> Result<Option<ShelterRecord>, DirectoryError> {
        (**self).fetch_shelter_by_id(id).await
    }
}

/// The loaded shelter collection plus the reason it is empty, if it failed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DirectoryView {
    pub shelters: Vec<ShelterRecord>,
    pub error: Option<String>,
}

impl DirectoryView {
    pub fn is_empty(&self) -> bool {
        self.shelters.is_empty()
    }

    pub fn failed(&self) -> bool {
        self.error.is_some()
    }

    /// Shelters matching `criteria`, in directory order.
    pub fn visible(&self, criteria: &FilterCriteria) -> Vec<&ShelterRecord> {
        filter_shelters(&self.shelters, criteria)
    }

    /// The first `count` shelters.
    pub fn featured(&self, count: usize) -> &[ShelterRecord] {
        &self.shelters[..count.min(self.shelters.len())]
    }
}

/// Loads the published directory, converting failures into an empty view.
pub async fn load_directory(source: &dyn DirectorySource) -> DirectoryView {
    match source.fetch_published_shelters().await {
        Ok(shelters) => {
            debug!(count = shelters.len(), "Directory loaded");
            DirectoryView {
                shelters,
                error: None,
            }
        }
        Err(e) => {
            warn!(error = %e, transient = e.is_transient(), "Directory unavailable, showing empty state");
            DirectoryView {
                shelters: Vec::new(),
                error: Some(e.to_string()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::builtin_seed;
    use crate::store::MemoryDirectory;

    struct Offline;

    #[async_trait]
    impl DirectorySource for Offline {
        async fn fetch_published_shelters(&self) -> Result<Vec<ShelterRecord>, DirectoryError> {
            Err(DirectoryError::unavailable("connection refused"))
        }

        async fn fetch_shelter_by_id(
            &self,
            _id: &ShelterId,
        ) -> Result<Option<ShelterRecord>, DirectoryError> {
            Err(DirectoryError::unavailable("connection refused"))
        }
    }

    #[tokio::test]
    async fn test_load_directory() {
        let directory = MemoryDirectory::with_profiles(builtin_seed().unwrap());
        let view = load_directory(&directory).await;

        assert!(!view.failed());
        assert_eq!(view.shelters.len(), 6);
        assert_eq!(view.featured(3).len(), 3);
        assert_eq!(view.featured(10).len(), 6);
    }

    #[tokio::test]
    async fn test_unavailable_source_yields_empty_view() {
        let view = load_directory(&Offline).await;

        assert!(view.is_empty());
        assert!(view.failed());
        assert!(view.error.unwrap().contains("connection refused"));
    }

    #[tokio::test]
    async fn test_visible_applies_criteria() {
        let directory = Arc::new(MemoryDirectory::with_profiles(builtin_seed().unwrap()));
        let view = load_directory(&directory).await;

        let maharashtra = view.visible(&FilterCriteria::new().with_region("Maharashtra"));
        let names: Vec<_> = maharashtra.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Mumbai Street Dogs Care", "Pune Pet Sanctuary"]);

        let empty = DirectoryView::default();
        assert!(empty.visible(&FilterCriteria::default()).is_empty());
    }
}
