//! Typed identifiers shared across the engine.
//!
//! All identifiers are opaque strings as far as the engine is concerned;
//! the newtypes exist so that a user id cannot be passed where a course id
//! is expected.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies a learner.
///
/// Every core call takes the user explicitly; there is no ambient
/// "current user" anywhere in the engine.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

/// Identifies a course.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CourseId(String);

/// Identifies a concept within a course.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConceptId(String);

/// Identifies a topic within a concept.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TopicId(String);

/// Identifies an achievement definition.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AchievementId(String);

/// Identifies a mock test.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TestId(String);

/// Identifies a learning path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PathId(String);

macro_rules! id_impls {
    ($($ty:ident),+) => {
        $(
            impl $ty {
                /// Create a new identifier from any string-like value.
                pub fn new(id: impl Into<String>) -> Self {
                    Self(id.into())
                }

                /// Get the identifier as a string slice.
                pub fn as_str(&self) -> &str {
                    &self.0
                }
            }

            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    write!(f, "{}", self.0)
                }
            }

            impl From<&str> for $ty {
                fn from(s: &str) -> Self {
                    Self(s.to_string())
                }
            }
        )+
    };
}

id_impls!(UserId, CourseId, ConceptId, TopicId, AchievementId, TestId, PathId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_display_matches_inner_string() {
        let id = UserId::new("user-42");
        assert_eq!(id.to_string(), "user-42");
        assert_eq!(id.as_str(), "user-42");
    }

    #[test]
    fn id_serializes_transparently() {
        let id = CourseId::new("dsa-101");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"dsa-101\"");

        let parsed: CourseId = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn ids_of_same_string_are_distinct_types() {
        // Compile-time property really, but keep the equality semantics honest
        let a = TopicId::from("x");
        let b = TopicId::from("x");
        assert_eq!(a, b);
    }
}
