//! Administrator review of shelter applications

use crate::store::MemoryDirectory;
use metrics::counter;
use pawconnect_core::error::ReviewError;
use pawconnect_core::types::{ShelterApplication, ShelterId, VerificationStatus};
use std::sync::Arc;
use tracing::info;

/// An administrator's verdict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewDecision {
    Approve { notes: Option<String> },
    /// Notes are shown to the applicant and must not be blank
    Reject { notes: String },
}

impl ReviewDecision {
    pub fn target_status(&self) -> VerificationStatus {
        match self {
            ReviewDecision::Approve { .. } => VerificationStatus::Approved,
            ReviewDecision::Reject { .. } => VerificationStatus::Rejected,
        }
    }
}

/// Applies review decisions to a directory.
#[derive(Debug, Clone)]
pub struct ReviewWorkflow {
    directory: Arc<MemoryDirectory>,
}

impl ReviewWorkflow {
    pub fn new(directory: Arc<MemoryDirectory>) -> Self {
        Self { directory }
    }

    /// Decides a pending application.
    ///
    /// # Errors
    ///
    /// - [`ReviewError::MissingNotes`] for a rejection with blank notes
    /// - [`ReviewError::NotFound`] for an unknown id
    /// - [`ReviewError::AlreadyDecided`] unless the application is pending
    pub fn decide(
        &self,
        id: &ShelterId,
        decision: ReviewDecision,
    ) -> Result<ShelterApplication, ReviewError> {
        let notes = match decision {
            ReviewDecision::Reject { ref notes } if notes.trim().is_empty() => {
                return Err(ReviewError::MissingNotes);
            }
            ReviewDecision::Reject { ref notes } => Some(notes.trim().to_string()),
            ReviewDecision::Approve { ref notes } => notes
                .as_deref()
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .map(str::to_string),
        };

        let status = decision.target_status();
        let profile = self.directory.transition(id, status, notes)?;

        counter!("pawconnect_reviews_total", "decision" => status.as_str()).increment(1);
        info!(shelter_id = %id, status = %status, "Application decided");
        Ok(profile.to_application())
    }
}
