//! Learning paths - ordered course steps rolled up from course progress.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::DefinitionError;
use crate::types::{CourseId, PathId, UserId};

/// One step of a learning path, pointing at a course.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathStep {
    pub id: String,
    pub title: String,
    pub course_id: CourseId,
    /// Step ids that must be completed before this step unlocks.
    #[serde(default)]
    pub prerequisites: Vec<String>,
    /// Minimum mean concept mastery (0-100) required to count the step as
    /// complete, on top of course completion.
    #[serde(default)]
    pub minimum_mastery: Option<f64>,
}

/// A learning-path definition. Immutable reference data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearningPath {
    pub id: PathId,
    pub title: String,
    pub steps: Vec<PathStep>,
}

impl LearningPath {
    /// Validate the definition: unique step ids, prerequisites resolve.
    pub fn validate(&self) -> Result<(), DefinitionError> {
        let mut ids = HashSet::new();
        for step in &self.steps {
            if !ids.insert(step.id.as_str()) {
                return Err(DefinitionError::DuplicateStep {
                    path: self.id.clone(),
                    step: step.id.clone(),
                });
            }
        }
        for step in &self.steps {
            for prerequisite in &step.prerequisites {
                if !ids.contains(prerequisite.as_str()) {
                    return Err(DefinitionError::UnknownPrerequisite {
                        path: self.id.clone(),
                        step: step.id.clone(),
                        prerequisite: prerequisite.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}

/// Derived status of one path step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    /// Prerequisites not yet met.
    Locked,
    /// Unlocked, no activity yet.
    Available,
    InProgress,
    Completed,
}

/// Derived progress of one path step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepProgress {
    pub step_id: String,
    pub status: StepStatus,
    /// Course progress percentage behind this step, 0-100.
    pub percent: f64,
}

/// A user's derived progress through a learning path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathProgress {
    pub path_id: PathId,
    pub user_id: UserId,
    pub steps: Vec<StepProgress>,
    /// Completed steps over total steps, 0-100.
    pub overall_progress: f64,
    pub completed: bool,
}
