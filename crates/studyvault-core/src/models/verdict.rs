//! Relevance verdict produced by the external classifier.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Highest confidence a verdict can carry.
pub const MAX_CONFIDENCE: u8 = 100;

/// Structured judgment on whether a document is study material.
///
/// Serialized in camelCase because this is the shape the classifier is asked to
/// answer in and the shape persisted alongside the submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Verdict {
    pub is_study_related: bool,
    /// 0..=100
    pub confidence: u8,
    pub summary: String,
    pub categories: Vec<String>,
    pub reasoning: String,
}

impl Verdict {
    pub fn new(
        is_study_related: bool,
        confidence: u8,
        summary: impl Into<String>,
        categories: Vec<String>,
        reasoning: impl Into<String>,
    ) -> Self {
        Self {
            is_study_related,
            confidence: confidence.min(MAX_CONFIDENCE),
            summary: summary.into(),
            categories,
            reasoning: reasoning.into(),
        }
    }
}
