//! Progress records - per-topic, per-concept, and per-course aggregates.
//!
//! Records are lazily created as activity arrives and are only ever updated
//! in place. Completion flags are monotonic: a completed topic never
//! un-completes, which is what makes concurrent re-application of the same
//! event safe.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::structure::CourseStructure;
use crate::types::{ConceptId, CourseId, TopicId, UserId};

/// Progress on a single topic. Owned exclusively by one [`ConceptProgress`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicProgress {
    pub topic_id: TopicId,
    pub completed: bool,
    pub time_spent_seconds: u64,
}

impl TopicProgress {
    pub fn new(topic_id: TopicId) -> Self {
        Self {
            topic_id,
            completed: false,
            time_spent_seconds: 0,
        }
    }
}

/// Progress on a concept: the topic records plus the derived percentage.
///
/// Invariant: `progress == 100 * completed_topics / total_topics` where
/// `total_topics` comes from the course structure, and
/// `completed == (progress >= 100)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConceptProgress {
    pub concept_id: ConceptId,
    pub topics: Vec<TopicProgress>,
    /// Percentage of topics completed, 0-100.
    pub progress: f64,
    pub completed: bool,
}

impl ConceptProgress {
    pub fn new(concept_id: ConceptId) -> Self {
        Self {
            concept_id,
            topics: Vec::new(),
            progress: 0.0,
            completed: false,
        }
    }

    /// Find the record for a topic, creating it if this is the first
    /// activity on that topic.
    pub fn topic_mut(&mut self, topic_id: &TopicId) -> &mut TopicProgress {
        if let Some(idx) = self.topics.iter().position(|t| &t.topic_id == topic_id) {
            return &mut self.topics[idx];
        }
        self.topics.push(TopicProgress::new(topic_id.clone()));
        self.topics.last_mut().expect("just pushed")
    }

    /// Number of completed topic records.
    pub fn completed_topics(&self) -> usize {
        self.topics.iter().filter(|t| t.completed).count()
    }

    /// Recompute `progress` and `completed` from the topic records.
    ///
    /// `total_topics` is the topic count from the course structure, not
    /// `self.topics.len()` - records are created lazily so the local list
    /// may be shorter than the real topic set.
    pub fn recompute(&mut self, total_topics: usize) {
        self.progress = if total_topics == 0 {
            0.0
        } else {
            100.0 * self.completed_topics() as f64 / total_topics as f64
        };
        self.completed = self.progress >= 100.0;
    }

    /// Total time spent across this concept's topics.
    pub fn time_spent_seconds(&self) -> u64 {
        self.topics.iter().map(|t| t.time_spent_seconds).sum()
    }
}

/// A user's progress in one course. One logical document per
/// (user, course) pair; saved and loaded as a whole.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseProgress {
    pub user_id: UserId,
    pub course_id: CourseId,
    pub concepts: Vec<ConceptProgress>,
    /// Topic-count-weighted mean of concept progresses, 0-100.
    pub overall_progress: f64,
    pub last_accessed_at: DateTime<Utc>,
}

impl CourseProgress {
    pub fn new(user_id: UserId, course_id: CourseId, now: DateTime<Utc>) -> Self {
        Self {
            user_id,
            course_id,
            concepts: Vec::new(),
            overall_progress: 0.0,
            last_accessed_at: now,
        }
    }

    /// Find the record for a concept, creating it on first activity.
    pub fn concept_mut(&mut self, concept_id: &ConceptId) -> &mut ConceptProgress {
        if let Some(idx) = self
            .concepts
            .iter()
            .position(|c| &c.concept_id == concept_id)
        {
            return &mut self.concepts[idx];
        }
        self.concepts.push(ConceptProgress::new(concept_id.clone()));
        self.concepts.last_mut().expect("just pushed")
    }

    /// Look up a concept's progress without creating it.
    pub fn concept(&self, concept_id: &ConceptId) -> Option<&ConceptProgress> {
        self.concepts.iter().find(|c| &c.concept_id == concept_id)
    }

    /// Recompute `overall_progress` as the topic-count-weighted mean across
    /// all concepts in the course structure.
    ///
    /// A concept with more topics contributes proportionally more; concepts
    /// the user has not touched yet contribute zero progress but full
    /// weight.
    pub fn recompute_overall(&mut self, structure: &CourseStructure) {
        let mut weighted = 0.0;
        let mut weight = 0usize;
        for concept in &structure.concepts {
            let count = concept.topics.len();
            weight += count;
            if let Some(cp) = self.concept(&concept.concept_id) {
                weighted += cp.progress * count as f64;
            }
        }
        self.overall_progress = if weight == 0 {
            0.0
        } else {
            weighted / weight as f64
        };
    }

    /// Whether every concept in the course is complete.
    pub fn completed(&self) -> bool {
        self.overall_progress >= 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structure::CourseStructure;

    fn structure() -> CourseStructure {
        CourseStructure::new(
            CourseId::new("c1"),
            [
                (
                    ConceptId::new("a"),
                    vec![TopicId::new("a1"), TopicId::new("a2"), TopicId::new("a3")],
                ),
                (ConceptId::new("b"), vec![TopicId::new("b1")]),
            ],
        )
    }

    #[test]
    fn concept_progress_is_ratio_of_structure_topics() {
        let mut cp = ConceptProgress::new(ConceptId::new("a"));
        cp.topic_mut(&TopicId::new("a1")).completed = true;
        cp.recompute(3);
        assert!((cp.progress - 100.0 / 3.0).abs() < 1e-9);
        assert!(!cp.completed);
    }

    #[test]
    fn concept_completes_only_when_all_topics_complete() {
        let mut cp = ConceptProgress::new(ConceptId::new("a"));
        for t in ["a1", "a2", "a3"] {
            cp.topic_mut(&TopicId::new(t)).completed = true;
        }
        cp.recompute(3);
        assert_eq!(cp.progress, 100.0);
        assert!(cp.completed);
    }

    #[test]
    fn empty_concept_has_zero_progress() {
        let mut cp = ConceptProgress::new(ConceptId::new("a"));
        cp.recompute(0);
        assert_eq!(cp.progress, 0.0);
        assert!(!cp.completed);
    }

    #[test]
    fn overall_progress_is_topic_weighted() {
        let s = structure();
        let mut progress =
            CourseProgress::new(UserId::new("u1"), CourseId::new("c1"), Utc::now());

        // Complete the single topic of concept b: worth 1 of 4 topics.
        {
            let cp = progress.concept_mut(&ConceptId::new("b"));
            cp.topic_mut(&TopicId::new("b1")).completed = true;
            cp.recompute(1);
        }
        progress.recompute_overall(&s);

        // Concept-count-weighted would be 50; topic-count-weighted is 25.
        assert!((progress.overall_progress - 25.0).abs() < 1e-9);
    }

    #[test]
    fn untouched_concepts_still_carry_weight() {
        let s = structure();
        let mut progress =
            CourseProgress::new(UserId::new("u1"), CourseId::new("c1"), Utc::now());

        {
            let cp = progress.concept_mut(&ConceptId::new("a"));
            for t in ["a1", "a2", "a3"] {
                cp.topic_mut(&TopicId::new(t)).completed = true;
            }
            cp.recompute(3);
        }
        progress.recompute_overall(&s);

        assert!((progress.overall_progress - 75.0).abs() < 1e-9);
        assert!(!progress.completed());
    }

    #[test]
    fn topic_mut_creates_lazily_and_reuses() {
        let mut cp = ConceptProgress::new(ConceptId::new("a"));
        cp.topic_mut(&TopicId::new("a1")).time_spent_seconds = 10;
        cp.topic_mut(&TopicId::new("a1")).time_spent_seconds += 5;
        assert_eq!(cp.topics.len(), 1);
        assert_eq!(cp.topics[0].time_spent_seconds, 15);
    }
}
