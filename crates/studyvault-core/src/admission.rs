//! Admission policy: whether a new submission is published immediately or
//! waits for a human.
//!
//! Fail-closed. Anything short of a confident "study related" verdict goes to
//! the moderation queue; nothing is ever auto-rejected.

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::models::{SubmissionStatus, Verdict};

/// Verdicts must be strictly above this to auto-publish.
pub const AUTO_PUBLISH_MIN_CONFIDENCE: u8 = 70;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdmissionDecision {
    AutoPublish,
    HoldForReview,
}

impl AdmissionDecision {
    pub fn target_status(self) -> SubmissionStatus {
        match self {
            AdmissionDecision::AutoPublish => SubmissionStatus::Published,
            AdmissionDecision::HoldForReview => SubmissionStatus::PendingReview,
        }
    }
}

impl Display for AdmissionDecision {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            AdmissionDecision::AutoPublish => f.write_str("auto_publish"),
            AdmissionDecision::HoldForReview => f.write_str("hold_for_review"),
        }
    }
}

/// Route a classified document. `None` covers skipped, failed and timed-out classification.
pub fn decide(verdict: Option<&Verdict>) -> AdmissionDecision {
    match verdict {
        Some(v) if v.is_study_related && v.confidence > AUTO_PUBLISH_MIN_CONFIDENCE => {
            AdmissionDecision::AutoPublish
        }
        _ => AdmissionDecision::HoldForReview,
    }
}

/// Routing for document kinds that are never classified.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NonPdfPolicy {
    #[default]
    Hold,
    AutoPublish,
}

impl FromStr for NonPdfPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "hold" | "hold_for_review" | "review" => Ok(NonPdfPolicy::Hold),
            "auto_publish" | "publish" => Ok(NonPdfPolicy::AutoPublish),
            _ => Err(anyhow::anyhow!(
                "Invalid NON_PDF_POLICY: {}. Use hold or auto_publish",
                s
            )),
        }
    }
}

pub fn decide_unclassified(policy: NonPdfPolicy) -> AdmissionDecision {
    match policy {
        NonPdfPolicy::Hold => AdmissionDecision::HoldForReview,
        NonPdfPolicy::AutoPublish => AdmissionDecision::AutoPublish,
    }
}
