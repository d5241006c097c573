//! Activity events - the immutable facts the engine consumes.
//!
//! A learner interacting with course content produces one
//! [`ActivitySubmission`] per action. Ingest validation turns it into an
//! [`ActivityEvent`], the append-only fact everything downstream is derived
//! from.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::{ConceptId, CourseId, TopicId, UserId};

/// The four kinds of learning activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    Video,
    Article,
    Coding,
    Quiz,
}

impl ActivityKind {
    /// Convert to database/JSON string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::Article => "article",
            Self::Coding => "coding",
            Self::Quiz => "quiz",
        }
    }

    /// Parse from database/JSON string
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "video" => Some(Self::Video),
            "article" => Some(Self::Article),
            "coding" => Some(Self::Coding),
            "quiz" => Some(Self::Quiz),
            _ => None,
        }
    }
}

/// Per-kind activity payload.
///
/// Each variant carries only the fields that make sense for its kind,
/// rather than an open-ended metadata map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ActivityDetail {
    /// A video watch session.
    Video {
        /// How much of the video was watched, 0-100.
        #[serde(default)]
        watch_percentage: f64,
    },

    /// An article read session.
    Article {
        /// Scroll-based read depth, 0-100.
        #[serde(default)]
        read_percentage: f64,
    },

    /// A coding-problem work session.
    Coding {
        #[serde(default)]
        attempts: u32,
        #[serde(default)]
        hints_used: u32,
        /// Whether the problem was solved in this session.
        solved: bool,
    },

    /// A quiz attempt.
    Quiz {
        /// Score as a percentage, 0-100.
        score: f64,
        /// Whether the score met the quiz passing threshold.
        passed: bool,
    },
}

impl ActivityDetail {
    /// The kind of activity this payload belongs to.
    pub fn kind(&self) -> ActivityKind {
        match self {
            Self::Video { .. } => ActivityKind::Video,
            Self::Article { .. } => ActivityKind::Article,
            Self::Coding { .. } => ActivityKind::Coding,
            Self::Quiz { .. } => ActivityKind::Quiz,
        }
    }
}

/// A raw activity candidate, as received from a client.
///
/// `time_spent_seconds` is signed on purpose: rejecting negative values is
/// an ingest responsibility, not a deserialization accident.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivitySubmission {
    pub user_id: UserId,
    pub course_id: CourseId,
    pub concept_id: ConceptId,
    pub topic_id: TopicId,
    #[serde(flatten)]
    pub detail: ActivityDetail,
    pub completed: bool,
    pub time_spent_seconds: i64,
    /// When the activity happened. Defaults to ingest time when absent.
    #[serde(default)]
    pub occurred_at: Option<DateTime<Utc>>,
}

/// A validated, normalized activity event. Immutable; append-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityEvent {
    /// Event identity. Re-submitting the same event is safe because every
    /// mutation it drives is idempotent or monotonic.
    pub event_id: Uuid,
    pub user_id: UserId,
    pub course_id: CourseId,
    pub concept_id: ConceptId,
    pub topic_id: TopicId,
    #[serde(flatten)]
    pub detail: ActivityDetail,
    pub completed: bool,
    pub time_spent_seconds: u64,
    pub occurred_at: DateTime<Utc>,
}

impl ActivityEvent {
    /// The kind of activity.
    pub fn kind(&self) -> ActivityKind {
        self.detail.kind()
    }
}
