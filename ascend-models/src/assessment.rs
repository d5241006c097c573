//! Mock-test definitions, attempt responses, and graded results.

use std::collections::{BTreeSet, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DefinitionError;
use crate::types::{TestId, UserId};

/// One test case of a coding question. Hidden cases count the same as
/// visible ones when grading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestCase {
    pub input: String,
    pub expected_output: String,
    #[serde(default)]
    pub hidden: bool,
}

/// Kind-specific body of a question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QuestionBody {
    /// Single-answer multiple choice.
    Mcq {
        options: Vec<String>,
        correct_answers: BTreeSet<usize>,
    },

    /// Multiple-select: every correct option and nothing else.
    MultipleSelect {
        options: Vec<String>,
        correct_answers: BTreeSet<usize>,
    },

    TrueFalse { answer: bool },

    Coding { test_cases: Vec<TestCase> },
}

/// A question in a mock test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub prompt: String,
    pub points: u32,
    /// Topic label used for per-topic performance analysis.
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(flatten)]
    pub body: QuestionBody,
}

/// A mock-test definition. Immutable reference data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MockTest {
    pub id: TestId,
    pub title: String,
    /// Minimum total score (0-100) to pass.
    pub passing_score: f64,
    /// 0 means unlimited attempts.
    #[serde(default)]
    pub max_attempts: u32,
    pub questions: Vec<Question>,
}

impl MockTest {
    /// Sum of points across all questions.
    pub fn max_points(&self) -> u32 {
        self.questions.iter().map(|q| q.points).sum()
    }

    /// Validate the definition. Run once at load time.
    pub fn validate(&self) -> Result<(), DefinitionError> {
        if !(0.0..=100.0).contains(&self.passing_score) {
            return Err(DefinitionError::PassingScoreOutOfRange {
                test: self.id.clone(),
                score: self.passing_score,
            });
        }

        let mut seen = HashSet::new();
        for question in &self.questions {
            if !seen.insert(question.id.as_str()) {
                return Err(DefinitionError::DuplicateQuestion {
                    test: self.id.clone(),
                    question: question.id.clone(),
                });
            }
            if question.points == 0 {
                return Err(DefinitionError::QuestionWithoutPoints {
                    test: self.id.clone(),
                    question: question.id.clone(),
                });
            }
            match &question.body {
                QuestionBody::Mcq {
                    options,
                    correct_answers,
                }
                | QuestionBody::MultipleSelect {
                    options,
                    correct_answers,
                } => {
                    for &index in correct_answers {
                        if index >= options.len() {
                            return Err(DefinitionError::AnswerIndexOutOfRange {
                                test: self.id.clone(),
                                question: question.id.clone(),
                                index,
                            });
                        }
                    }
                }
                QuestionBody::TrueFalse { .. } => {}
                QuestionBody::Coding { test_cases } => {
                    if test_cases.is_empty() {
                        return Err(DefinitionError::NoTestCases {
                            test: self.id.clone(),
                            question: question.id.clone(),
                        });
                    }
                }
            }
        }
        Ok(())
    }
}

/// Outcome of running one coding test case, as reported by the execution
/// sandbox (out of scope here).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestCaseResult {
    pub passed: bool,
    #[serde(default)]
    pub actual_output: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// A learner's answer to one question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResponseAnswer {
    /// Selected option indexes, for mcq/multiple-select.
    Selected { indexes: BTreeSet<usize> },

    Boolean { answer: bool },

    /// Submitted code plus the sandbox results, one per test case.
    Code {
        code: String,
        language: String,
        test_results: Vec<TestCaseResult>,
    },
}

/// One response within an attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub question_id: String,
    #[serde(flatten)]
    pub answer: ResponseAnswer,
}

/// A graded response: binary credit, no partial scoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradedResponse {
    pub question_id: String,
    pub correct: bool,
    pub points_earned: u32,
    pub max_points: u32,
}

/// Per-topic accuracy within one attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicPerformance {
    pub topic: String,
    pub attempted: u32,
    pub correct: u32,
    /// Percentage, 0-100.
    pub accuracy: f64,
}

/// Strengths/weaknesses breakdown of an attempt.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AttemptAnalysis {
    pub topics: Vec<TopicPerformance>,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
}

/// A graded mock-test attempt. Immutable once graded; `attempt_number` is
/// strictly increasing per (user, test), starting at 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradedAttempt {
    pub user_id: UserId,
    pub test_id: TestId,
    pub attempt_number: u32,
    pub responses: Vec<GradedResponse>,
    /// Percentage, 0-100.
    pub total_score: f64,
    pub passed: bool,
    /// Rank against prior attempts on the same test, frozen at submission.
    pub percentile: f64,
    pub submitted_at: DateTime<Utc>,
    pub analysis: AttemptAnalysis,
}
