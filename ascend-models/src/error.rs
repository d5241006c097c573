//! Definition-time validation errors.
//!
//! Achievement, test, and path definitions are shared reference data; they
//! are validated once when loaded, so the evaluators can assume
//! well-formed input.

use thiserror::Error;

use crate::types::{AchievementId, PathId, TestId};

/// A malformed achievement, test, or learning-path definition.
#[derive(Error, Debug)]
pub enum DefinitionError {
    #[error("achievement {achievement}: step at position {position} is numbered {step}, steps must run 1..=n without gaps")]
    StepNumberGap {
        achievement: AchievementId,
        step: u32,
        position: usize,
    },

    #[error("achievement {achievement}: step {step} target {target} does not increase over {previous}")]
    StepTargetNotIncreasing {
        achievement: AchievementId,
        step: u32,
        target: f64,
        previous: f64,
    },

    #[error("achievement {achievement}: criteria target must be positive, got {target}")]
    NonPositiveTarget {
        achievement: AchievementId,
        target: f64,
    },

    #[error("test {test}: passing score must be within 0-100, got {score}")]
    PassingScoreOutOfRange { test: TestId, score: f64 },

    #[error("test {test}: duplicate question id {question}")]
    DuplicateQuestion { test: TestId, question: String },

    #[error("test {test}: question {question} is worth zero points")]
    QuestionWithoutPoints { test: TestId, question: String },

    #[error("test {test}: question {question} answer index {index} is out of range")]
    AnswerIndexOutOfRange {
        test: TestId,
        question: String,
        index: usize,
    },

    #[error("test {test}: coding question {question} has no test cases")]
    NoTestCases { test: TestId, question: String },

    #[error("path {path}: duplicate step id {step}")]
    DuplicateStep { path: PathId, step: String },

    #[error("path {path}: step {step} references unknown prerequisite {prerequisite}")]
    UnknownPrerequisite {
        path: PathId,
        step: String,
        prerequisite: String,
    },
}
