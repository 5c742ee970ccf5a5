//! Guarded submission state machine.
//!
//! ```text
//! intake ──► pending_review ──► published
//!    │              │
//!    └──► published └──► rejected
//! ```
//!
//! Every status change goes through a [`Transition`]. Stores check
//! [`Transition::allowed_from`] atomically with the write; [`Submission::apply`]
//! is the in-process equivalent.

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::AppError;
use crate::models::{Payload, StorageLocation, Submission, SubmissionStatus, Verdict};

/// Human reviewer annotation attached to a moderation decision.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Review {
    pub note: Option<String>,
    pub reviewer: Option<String>,
}

/// What a moderator asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Approve,
    Reject,
}

impl Decision {
    pub fn target(&self) -> SubmissionStatus {
        match self {
            Decision::Approve => SubmissionStatus::Published,
            Decision::Reject => SubmissionStatus::Rejected,
        }
    }
}

impl Display for Decision {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Decision::Approve => f.write_str("approve"),
            Decision::Reject => f.write_str("reject"),
        }
    }
}

impl FromStr for Decision {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "approve" | "approved" => Ok(Decision::Approve),
            "reject" | "rejected" => Ok(Decision::Reject),
            _ => Err(anyhow::anyhow!("Invalid decision: {}. Use approve or reject", s)),
        }
    }
}

/// Outcome of a human review, ready to be applied.
#[derive(Debug, Clone, PartialEq)]
pub enum ReviewDecision {
    Approve { location: StorageLocation },
    Reject,
}

impl ReviewDecision {
    pub fn into_transition(self, review: Review) -> Transition {
        match self {
            ReviewDecision::Approve { location } => Transition::Approve { location, review },
            ReviewDecision::Reject => Transition::Reject { review },
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    /// Admission policy routed the submission to a human.
    HoldForReview { verdict: Option<Verdict> },
    /// Payload moved to durable storage without human involvement.
    Publish {
        verdict: Option<Verdict>,
        location: StorageLocation,
    },
    /// Human approved a held submission; payload moved to durable storage.
    Approve {
        location: StorageLocation,
        review: Review,
    },
    /// Human rejected a held submission; inline bytes are purged.
    Reject { review: Review },
}

impl Transition {
    pub fn target(&self) -> SubmissionStatus {
        match self {
            Transition::HoldForReview { .. } => SubmissionStatus::PendingReview,
            Transition::Publish { .. } | Transition::Approve { .. } => SubmissionStatus::Published,
            Transition::Reject { .. } => SubmissionStatus::Rejected,
        }
    }

    pub fn allowed_from(&self) -> &'static [SubmissionStatus] {
        match self {
            Transition::HoldForReview { .. } => &[SubmissionStatus::Intake],
            Transition::Publish { .. } => {
                &[SubmissionStatus::Intake, SubmissionStatus::PendingReview]
            }
            Transition::Approve { .. } | Transition::Reject { .. } => {
                &[SubmissionStatus::PendingReview]
            }
        }
    }

    pub fn is_allowed_from(&self, from: SubmissionStatus) -> bool {
        self.allowed_from().contains(&from)
    }

    pub fn check(&self, from: SubmissionStatus) -> Result<(), AppError> {
        if self.is_allowed_from(from) {
            Ok(())
        } else {
            Err(AppError::InvalidStateTransition {
                from,
                to: self.target(),
            })
        }
    }

    /// Durable location the transition publishes to, if any.
    pub fn location(&self) -> Option<&StorageLocation> {
        match self {
            Transition::Publish { location, .. } | Transition::Approve { location, .. } => {
                Some(location)
            }
            _ => None,
        }
    }
}

impl Submission {
    /// Apply a transition in place. On error the submission is left untouched.
    ///
    /// A verdict already on record is never replaced.
    pub fn apply(&mut self, transition: Transition, at: DateTime<Utc>) -> Result<(), AppError> {
        transition.check(self.status)?;

        let status = transition.target();
        match transition {
            Transition::HoldForReview { verdict } => {
                if self.verdict.is_none() {
                    self.verdict = verdict;
                }
            }
            Transition::Publish { verdict, location } => {
                if self.verdict.is_none() {
                    self.verdict = verdict;
                }
                self.payload = Payload::Stored(location);
            }
            Transition::Approve { location, review } => {
                self.payload = Payload::Stored(location);
                self.record_review(review, at);
            }
            Transition::Reject { review } => {
                self.payload = Payload::Purged;
                self.record_review(review, at);
            }
        }
        self.status = status;
        self.updated_at = at;
        Ok(())
    }

    fn record_review(&mut self, review: Review, at: DateTime<Utc>) {
        self.review_note = review.note;
        self.reviewed_by = review.reviewer;
        self.reviewed_at = Some(at);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, NewSubmission};
    use crate::StorageBackend;
    use bytes::Bytes;

    fn intake() -> Submission {
        let new = NewSubmission {
            title: "Circuits Lab".to_string(),
            subject: "Basic Electronics".to_string(),
            description: None,
            department: "Electrical Engineering".to_string(),
            category: Category::LabManual,
            submitter: "Meera".to_string(),
            submitter_id: None,
            file_name: "lab.pdf".to_string(),
            content_type: "application/pdf".to_string(),
            data: Bytes::from_static(b"%PDF"),
        };
        Submission::from_new(&new, Utc::now())
    }

    fn location() -> StorageLocation {
        StorageLocation {
            backend: StorageBackend::Local,
            bucket: None,
            key: "lab-manual/lab.pdf".to_string(),
            url: "http://localhost:3000/files/lab-manual/lab.pdf".to_string(),
        }
    }

    fn verdict(confidence: u8) -> Verdict {
        Verdict::new(true, confidence, "lab manual", vec![], "procedures")
    }

    fn held() -> Submission {
        let mut s = intake();
        s.apply(
            Transition::HoldForReview {
                verdict: Some(verdict(40)),
            },
            Utc::now(),
        )
        .unwrap();
        s
    }

    #[test]
    fn decision_parses_and_targets() {
        assert_eq!("Approve".parse::<Decision>().unwrap(), Decision::Approve);
        assert_eq!(Decision::Reject.target(), SubmissionStatus::Rejected);
        assert!("maybe".parse::<Decision>().is_err());
    }

    #[test]
    fn hold_then_approve() {
        let mut s = held();
        assert_eq!(s.status, SubmissionStatus::PendingReview);
        assert!(s.payload.is_inline());

        let transition = ReviewDecision::Approve {
            location: location(),
        }
        .into_transition(Review {
            note: Some("looks fine".into()),
            reviewer: Some("mod".into()),
        });
        s.apply(transition, Utc::now()).unwrap();

        assert_eq!(s.status, SubmissionStatus::Published);
        assert_eq!(s.public_url(), Some(location().url.as_str()));
        assert_eq!(s.review_note.as_deref(), Some("looks fine"));
        assert!(s.reviewed_at.is_some());
        assert_eq!(s.verdict.as_ref().map(|v| v.confidence), Some(40));
    }

    #[test]
    fn auto_publish_from_intake_has_no_review() {
        let mut s = intake();
        s.apply(
            Transition::Publish {
                verdict: Some(verdict(85)),
                location: location(),
            },
            Utc::now(),
        )
        .unwrap();
        assert_eq!(s.status, SubmissionStatus::Published);
        assert!(s.review_note.is_none());
        assert!(s.reviewed_at.is_none());
    }

    #[test]
    fn approve_requires_pending_review() {
        let mut s = intake();
        let err = s
            .apply(
                Transition::Approve {
                    location: location(),
                    review: Review::default(),
                },
                Utc::now(),
            )
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::InvalidStateTransition {
                from: SubmissionStatus::Intake,
                to: SubmissionStatus::Published
            }
        ));
        assert_eq!(s.status, SubmissionStatus::Intake);
    }

    #[test]
    fn reject_purges_payload_and_keeps_note() {
        let mut s = held();
        let transition = ReviewDecision::Reject.into_transition(Review {
            note: Some("duplicate".into()),
            reviewer: None,
        });
        s.apply(transition, Utc::now()).unwrap();
        assert_eq!(s.status, SubmissionStatus::Rejected);
        assert_eq!(s.payload, Payload::Purged);
        assert_eq!(s.review_note.as_deref(), Some("duplicate"));
    }

    #[test]
    fn reject_from_intake_is_invalid_and_leaves_state() {
        let mut s = intake();
        let before = s.clone();
        let err = s
            .apply(
                Transition::Reject {
                    review: Review::default(),
                },
                Utc::now(),
            )
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::InvalidStateTransition {
                from: SubmissionStatus::Intake,
                to: SubmissionStatus::Rejected
            }
        ));
        assert_eq!(s.status, before.status);
        assert_eq!(s.payload, before.payload);
    }

    #[test]
    fn terminal_states_accept_nothing() {
        for status in [SubmissionStatus::Published, SubmissionStatus::Rejected] {
            for t in [
                Transition::HoldForReview { verdict: None },
                Transition::Publish {
                    verdict: None,
                    location: location(),
                },
                Transition::Approve {
                    location: location(),
                    review: Review::default(),
                },
                Transition::Reject {
                    review: Review::default(),
                },
            ] {
                assert!(t.check(status).is_err(), "{:?} from {}", t, status);
            }
        }
    }

    #[test]
    fn recorded_verdict_is_immutable() {
        let mut s = held();
        s.apply(
            Transition::Publish {
                verdict: Some(verdict(99)),
                location: location(),
            },
            Utc::now(),
        )
        .unwrap();
        assert_eq!(s.verdict.map(|v| v.confidence), Some(40));
    }
}
