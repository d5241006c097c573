//! Event ingest - validation and normalization of activity submissions
//!
//! Ingest is the only component that talks to the course catalog on the
//! write path. It rejects malformed submissions before anything mutates,
//! and stamps accepted ones with an event id and a timestamp.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::debug;
use uuid::Uuid;

use ascend_models::{ActivityEvent, ActivitySubmission, CourseStructure};

use crate::catalog::CourseCatalog;
use crate::error::{EngineError, ValidationError};

/// Validates and normalizes incoming activity submissions.
pub struct EventIngest {
    catalog: Arc<dyn CourseCatalog>,
    catalog_timeout: Duration,
}

impl EventIngest {
    pub fn new(catalog: Arc<dyn CourseCatalog>, catalog_timeout: Duration) -> Self {
        Self {
            catalog,
            catalog_timeout,
        }
    }

    /// Validate a submission and normalize it into an [`ActivityEvent`].
    ///
    /// Returns the course structure alongside the event so the caller can
    /// aggregate without a second catalog read. No side effects: a
    /// rejected submission mutates nothing.
    pub async fn normalize(
        &self,
        submission: ActivitySubmission,
    ) -> Result<(ActivityEvent, CourseStructure), EngineError> {
        if submission.time_spent_seconds < 0 {
            return Err(ValidationError::NegativeTimeSpent(submission.time_spent_seconds).into());
        }

        let structure = self.fetch_structure(&submission).await?;

        if structure.concept(&submission.concept_id).is_none() {
            return Err(ValidationError::UnknownConcept {
                course: submission.course_id,
                concept: submission.concept_id,
            }
            .into());
        }
        if !structure.contains(&submission.concept_id, &submission.topic_id) {
            return Err(ValidationError::UnknownTopic {
                course: submission.course_id,
                concept: submission.concept_id,
                topic: submission.topic_id,
            }
            .into());
        }

        let event = ActivityEvent {
            event_id: Uuid::new_v4(),
            user_id: submission.user_id,
            course_id: submission.course_id,
            concept_id: submission.concept_id,
            topic_id: submission.topic_id,
            detail: submission.detail,
            completed: submission.completed,
            time_spent_seconds: submission.time_spent_seconds as u64,
            occurred_at: submission.occurred_at.unwrap_or_else(Utc::now),
        };
        debug!(
            event_id = %event.event_id,
            user = %event.user_id,
            kind = event.kind().as_str(),
            "accepted activity event"
        );
        Ok((event, structure))
    }

    /// Catalog read with a bounded timeout. An unknown course is a
    /// validation failure; an elapsed timeout aborts the event without
    /// touching any state.
    async fn fetch_structure(
        &self,
        submission: &ActivitySubmission,
    ) -> Result<CourseStructure, EngineError> {
        let lookup = self.catalog.structure(&submission.course_id);
        match tokio::time::timeout(self.catalog_timeout, lookup).await {
            Ok(Ok(structure)) => Ok(structure),
            Ok(Err(_)) => {
                Err(ValidationError::UnknownCourse(submission.course_id.clone()).into())
            }
            Err(_) => Err(EngineError::Timeout {
                timeout_ms: self.catalog_timeout.as_millis() as u64,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::MemoryCatalog;
    use ascend_models::{ActivityDetail, ConceptId, CourseId, TopicId, UserId};
    use async_trait::async_trait;
    use crate::error::NotFoundError;

    fn submission() -> ActivitySubmission {
        ActivitySubmission {
            user_id: UserId::new("u1"),
            course_id: CourseId::new("c1"),
            concept_id: ConceptId::new("arrays"),
            topic_id: TopicId::new("t1"),
            detail: ActivityDetail::Video {
                watch_percentage: 100.0,
            },
            completed: true,
            time_spent_seconds: 300,
            occurred_at: None,
        }
    }

    async fn catalog_with_course() -> Arc<MemoryCatalog> {
        let catalog = Arc::new(MemoryCatalog::new());
        catalog
            .insert(CourseStructure::new(
                CourseId::new("c1"),
                [(
                    ConceptId::new("arrays"),
                    vec![TopicId::new("t1"), TopicId::new("t2")],
                )],
            ))
            .await;
        catalog
    }

    #[tokio::test]
    async fn accepts_valid_submission_and_defaults_occurred_at() {
        let ingest = EventIngest::new(catalog_with_course().await, Duration::from_secs(1));
        let before = Utc::now();
        let (event, structure) = ingest.normalize(submission()).await.unwrap();

        assert_eq!(event.time_spent_seconds, 300);
        assert!(event.occurred_at >= before);
        assert_eq!(structure.total_topics(), 2);
    }

    #[tokio::test]
    async fn preserves_explicit_occurred_at() {
        let ingest = EventIngest::new(catalog_with_course().await, Duration::from_secs(1));
        let at = Utc::now() - chrono::Duration::hours(2);
        let mut sub = submission();
        sub.occurred_at = Some(at);

        let (event, _) = ingest.normalize(sub).await.unwrap();
        assert_eq!(event.occurred_at, at);
    }

    #[tokio::test]
    async fn rejects_negative_time_spent() {
        let ingest = EventIngest::new(catalog_with_course().await, Duration::from_secs(1));
        let mut sub = submission();
        sub.time_spent_seconds = -1;

        let err = ingest.normalize(sub).await.unwrap_err();
        assert!(matches!(
            err,
            EngineError::Validation(ValidationError::NegativeTimeSpent(-1))
        ));
    }

    #[tokio::test]
    async fn rejects_unknown_course() {
        let ingest = EventIngest::new(catalog_with_course().await, Duration::from_secs(1));
        let mut sub = submission();
        sub.course_id = CourseId::new("ghost");

        let err = ingest.normalize(sub).await.unwrap_err();
        assert!(matches!(
            err,
            EngineError::Validation(ValidationError::UnknownCourse(_))
        ));
    }

    #[tokio::test]
    async fn rejects_unknown_concept_and_topic() {
        let ingest = EventIngest::new(catalog_with_course().await, Duration::from_secs(1));

        let mut sub = submission();
        sub.concept_id = ConceptId::new("graphs");
        assert!(matches!(
            ingest.normalize(sub).await.unwrap_err(),
            EngineError::Validation(ValidationError::UnknownConcept { .. })
        ));

        let mut sub = submission();
        sub.topic_id = TopicId::new("t9");
        assert!(matches!(
            ingest.normalize(sub).await.unwrap_err(),
            EngineError::Validation(ValidationError::UnknownTopic { .. })
        ));
    }

    struct StalledCatalog;

    #[async_trait]
    impl CourseCatalog for StalledCatalog {
        async fn structure(
            &self,
            _course_id: &CourseId,
        ) -> Result<CourseStructure, NotFoundError> {
            // Never resolves within the test timeout
            tokio::time::sleep(Duration::from_secs(3600)).await;
            unreachable!()
        }
    }

    #[tokio::test]
    async fn slow_catalog_surfaces_timeout() {
        let ingest = EventIngest::new(Arc::new(StalledCatalog), Duration::from_millis(10));
        let err = ingest.normalize(submission()).await.unwrap_err();
        assert!(matches!(err, EngineError::Timeout { timeout_ms: 10 }));
    }
}
