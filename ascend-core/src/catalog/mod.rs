//! Course-structure lookup
//!
//! The catalog is an external collaborator: the engine only reads the
//! structural tree of a course through this trait, to validate events and
//! weight roll-ups. Reads are bounded by a timeout at the call site.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use ascend_models::{CourseId, CourseStructure};

use crate::error::NotFoundError;

/// Read-only course-structure lookup.
#[async_trait]
pub trait CourseCatalog: Send + Sync {
    /// The structural tree (concept → ordered topics) of a course.
    async fn structure(&self, course_id: &CourseId) -> Result<CourseStructure, NotFoundError>;
}

/// In-memory implementation of CourseCatalog.
///
/// Used by tests and as the composition default; a production deployment
/// would back this trait with the content service.
#[derive(Default)]
pub struct MemoryCatalog {
    courses: RwLock<HashMap<CourseId, CourseStructure>>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a course structure, replacing any existing entry.
    pub async fn insert(&self, structure: CourseStructure) {
        self.courses
            .write()
            .await
            .insert(structure.course_id.clone(), structure);
    }
}

#[async_trait]
impl CourseCatalog for MemoryCatalog {
    async fn structure(&self, course_id: &CourseId) -> Result<CourseStructure, NotFoundError> {
        self.courses
            .read()
            .await
            .get(course_id)
            .cloned()
            .ok_or_else(|| NotFoundError::Course(course_id.clone()))
    }
}
