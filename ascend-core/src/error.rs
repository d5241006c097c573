//! Error types for ascend-core
//!
//! The taxonomy follows the request-handling contract: validation and
//! not-found reject a single request with no mutation; version conflicts
//! are retried and only surface as a concurrency error once retries are
//! exhausted; timeouts abort the single event, which the caller may safely
//! retry because application is idempotent by event identity.

use thiserror::Error;

use ascend_models::{AchievementId, ConceptId, CourseId, DefinitionError, TestId, TopicId};

/// Top-level error type for ascend-core
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("not found: {0}")]
    NotFound(#[from] NotFoundError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("definition error: {0}")]
    Definition(#[from] DefinitionError),

    #[error("save retries exhausted after {attempts} attempts for {key}")]
    Concurrency { key: String, attempts: u32 },

    #[error("course catalog timed out after {timeout_ms} ms")]
    Timeout { timeout_ms: u64 },
}

/// A malformed or unknown activity submission. Rejected with no mutation.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    #[error("time spent must be non-negative, got {0}")]
    NegativeTimeSpent(i64),

    #[error("unknown course {0}")]
    UnknownCourse(CourseId),

    #[error("unknown concept {concept} in course {course}")]
    UnknownConcept { course: CourseId, concept: ConceptId },

    #[error("unknown topic {topic} under concept {concept} in course {course}")]
    UnknownTopic {
        course: CourseId,
        concept: ConceptId,
        topic: TopicId,
    },

    #[error("attempt limit reached for test {test}: max {max}")]
    AttemptLimitReached { test: TestId, max: u32 },
}

/// A referenced entity is absent. At the aggregation layer this means the
/// ingest-validated structure and the stored progress disagree - a
/// data-integrity fault, fatal for the request.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum NotFoundError {
    #[error("course {0} not found")]
    Course(CourseId),

    #[error("concept {concept} not found in course {course}")]
    Concept { course: CourseId, concept: ConceptId },

    #[error("topic {topic} not found under concept {concept}")]
    Topic { concept: ConceptId, topic: TopicId },

    #[error("test {0} not found")]
    Test(TestId),

    #[error("achievement {0} not found")]
    Achievement(AchievementId),
}

/// Errors from a repository implementation.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The document changed under us. The apply cycle reloads and retries.
    #[error("version conflict: expected {expected}, found {found}")]
    VersionConflict { expected: u64, found: u64 },

    #[error("storage backend error: {0}")]
    Backend(String),
}

impl StoreError {
    /// Whether a retry of the whole apply cycle can succeed.
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::VersionConflict { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_displays_offending_ids() {
        let err = ValidationError::UnknownTopic {
            course: CourseId::new("c1"),
            concept: ConceptId::new("arrays"),
            topic: TopicId::new("t9"),
        };
        let msg = err.to_string();
        assert!(msg.contains("t9"));
        assert!(msg.contains("arrays"));
        assert!(msg.contains("c1"));
    }

    #[test]
    fn engine_error_converts_from_validation_error() {
        let err: EngineError = ValidationError::NegativeTimeSpent(-5).into();
        assert!(matches!(err, EngineError::Validation(_)));
        assert!(err.to_string().contains("-5"));
    }

    #[test]
    fn engine_error_converts_from_not_found() {
        let err: EngineError = NotFoundError::Course(CourseId::new("missing")).into();
        assert!(matches!(err, EngineError::NotFound(_)));
    }

    #[test]
    fn store_conflict_is_retryable() {
        let err = StoreError::VersionConflict {
            expected: 3,
            found: 4,
        };
        assert!(err.is_conflict());
        assert!(!StoreError::Backend("down".into()).is_conflict());
    }
}
