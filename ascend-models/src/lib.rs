//! ascend-models: Domain model for the ascend learning engine
//!
//! This crate defines the data the engine computes over:
//!
//! - **Activity events** - [`ActivitySubmission`] and [`ActivityEvent`],
//!   the append-only facts everything else is derived from
//! - **Progress records** - [`TopicProgress`], [`ConceptProgress`], and
//!   [`CourseProgress`] with their roll-up invariants
//! - **Achievements** - [`Achievement`] definitions (validated at load
//!   time) and the per-user [`UserAchievement`] projection
//! - **Assessments** - [`MockTest`] definitions and [`GradedAttempt`]
//!   results
//! - **Streaks and stats** - [`StreakState`], [`UserStatSnapshot`], and
//!   the daily/periodic rollup rows
//! - **Learning paths** - [`LearningPath`] definitions and derived
//!   [`PathProgress`]
//!
//! All types serialize with serde; definitions carry `validate()` methods
//! so malformed reference data is rejected when loaded, not when evaluated.

pub mod achievement;
pub mod activity;
pub mod assessment;
pub mod error;
pub mod path;
pub mod progress;
pub mod stats;
pub mod streak;
pub mod structure;
pub mod types;

// Re-export key types for convenience
pub use achievement::{
    Achievement, AchievementStatus, Condition, ConditionValue, Criteria, CriterionKind, Operator,
    ProgressStep, Reward, StepReward, Timeframe, UserAchievement,
};
pub use activity::{ActivityDetail, ActivityEvent, ActivityKind, ActivitySubmission};
pub use assessment::{
    AttemptAnalysis, GradedAttempt, GradedResponse, MockTest, Question, QuestionBody, Response,
    ResponseAnswer, TestCase, TestCaseResult, TopicPerformance,
};
pub use error::DefinitionError;
pub use path::{LearningPath, PathProgress, PathStep, StepProgress, StepStatus};
pub use progress::{ConceptProgress, CourseProgress, TopicProgress};
pub use stats::{DailyStats, Period, PeriodStats, UserStatSnapshot};
pub use streak::StreakState;
pub use structure::{ConceptStructure, CourseStructure};
pub use types::{AchievementId, ConceptId, CourseId, PathId, TestId, TopicId, UserId};
