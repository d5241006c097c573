//! Course structure - the read-only shape of a course.
//!
//! The structural tree (course → concepts → topics) is reference data owned
//! by the catalog collaborator. The engine only reads it, to validate
//! incoming events and to weight progress roll-ups.

use serde::{Deserialize, Serialize};

use crate::types::{ConceptId, CourseId, TopicId};

/// The topics making up one concept, in presentation order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConceptStructure {
    pub concept_id: ConceptId,
    pub topics: Vec<TopicId>,
}

/// The structural tree of a course.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseStructure {
    pub course_id: CourseId,
    pub concepts: Vec<ConceptStructure>,
}

impl CourseStructure {
    /// Build a structure from (concept, topics) pairs.
    pub fn new(
        course_id: CourseId,
        concepts: impl IntoIterator<Item = (ConceptId, Vec<TopicId>)>,
    ) -> Self {
        Self {
            course_id,
            concepts: concepts
                .into_iter()
                .map(|(concept_id, topics)| ConceptStructure { concept_id, topics })
                .collect(),
        }
    }

    /// Look up a concept's structure.
    pub fn concept(&self, concept_id: &ConceptId) -> Option<&ConceptStructure> {
        self.concepts.iter().find(|c| &c.concept_id == concept_id)
    }

    /// Whether the (concept, topic) pair exists in this course.
    pub fn contains(&self, concept_id: &ConceptId, topic_id: &TopicId) -> bool {
        self.concept(concept_id)
            .is_some_and(|c| c.topics.contains(topic_id))
    }

    /// Number of topics under a concept, or `None` if the concept is unknown.
    pub fn topic_count(&self, concept_id: &ConceptId) -> Option<usize> {
        self.concept(concept_id).map(|c| c.topics.len())
    }

    /// Total number of topics across the whole course.
    pub fn total_topics(&self) -> usize {
        self.concepts.iter().map(|c| c.topics.len()).sum()
    }
}
