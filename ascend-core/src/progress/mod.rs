//! Progress aggregation - applying one event to the (user, course) record
//!
//! The aggregator is a pure state transition on a loaded [`CourseProgress`]
//! document: the caller loads, applies, and saves with a version check.
//! Completion flags fold monotonically (OR), so re-applying the same event
//! never changes them after the first application; time spent always
//! accumulates, by contract.

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use ascend_models::{ActivityEvent, ConceptId, CourseProgress, CourseStructure};

use crate::error::NotFoundError;

/// What one event application changed, beyond the record itself.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProgressDelta {
    /// The topic flipped from incomplete to complete.
    pub topic_completed: bool,
    /// Concepts that newly reached 100% in this application.
    pub concepts_completed: Vec<ConceptId>,
    /// The whole course newly reached 100% in this application.
    pub course_completed: bool,
}

/// Apply one activity event to the user's course progress.
///
/// The structure must be the one the event was validated against; a
/// mismatch here means ingest and aggregation saw different course trees,
/// which is a data-integrity fault surfaced as [`NotFoundError`].
pub fn apply_event(
    progress: &mut CourseProgress,
    structure: &CourseStructure,
    event: &ActivityEvent,
    now: DateTime<Utc>,
) -> Result<ProgressDelta, NotFoundError> {
    let total_topics =
        structure
            .topic_count(&event.concept_id)
            .ok_or_else(|| NotFoundError::Concept {
                course: event.course_id.clone(),
                concept: event.concept_id.clone(),
            })?;
    if !structure.contains(&event.concept_id, &event.topic_id) {
        return Err(NotFoundError::Topic {
            concept: event.concept_id.clone(),
            topic: event.topic_id.clone(),
        });
    }

    let course_was_complete = progress.completed();
    let mut delta = ProgressDelta::default();

    {
        let concept = progress.concept_mut(&event.concept_id);
        let concept_was_complete = concept.completed;

        let topic = concept.topic_mut(&event.topic_id);
        let topic_was_complete = topic.completed;
        topic.completed = topic.completed || event.completed;
        topic.time_spent_seconds += event.time_spent_seconds;
        delta.topic_completed = !topic_was_complete && topic.completed;

        concept.recompute(total_topics);
        if !concept_was_complete && concept.completed {
            delta.concepts_completed.push(concept.concept_id.clone());
            info!(
                user = %event.user_id,
                concept = %event.concept_id,
                "concept completed"
            );
        }
    }

    progress.recompute_overall(structure);
    progress.last_accessed_at = now;

    if !course_was_complete && progress.completed() {
        delta.course_completed = true;
        info!(user = %event.user_id, course = %event.course_id, "course completed");
    }

    debug!(
        user = %event.user_id,
        course = %event.course_id,
        overall = progress.overall_progress,
        "progress updated"
    );
    Ok(delta)
}
