//! Cumulative stat snapshots and time-bucketed activity rollups.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::achievement::{ConditionValue, CriterionKind};
use crate::types::UserId;

/// A user's cumulative counters, fed to the achievement evaluator after
/// every event. One logical document per user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserStatSnapshot {
    pub user_id: UserId,
    pub problems_solved: u64,
    pub concepts_completed: u64,
    pub courses_completed: u64,
    pub quizzes_passed: u64,
    pub time_spent_seconds: u64,
    pub current_streak: u32,
    pub longest_streak: u32,
    /// Best quiz score seen so far, 0-100.
    pub best_quiz_score: f64,
    /// Context fields addressable by achievement condition filters,
    /// e.g. `course.category`.
    #[serde(default)]
    pub context: BTreeMap<String, ConditionValue>,
}

impl UserStatSnapshot {
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            problems_solved: 0,
            concepts_completed: 0,
            courses_completed: 0,
            quizzes_passed: 0,
            time_spent_seconds: 0,
            current_streak: 0,
            longest_streak: 0,
            best_quiz_score: 0.0,
            context: BTreeMap::new(),
        }
    }

    /// The all-time counter backing a criterion kind.
    pub fn counter(&self, kind: CriterionKind) -> f64 {
        match kind {
            CriterionKind::CourseCompletion => self.courses_completed as f64,
            CriterionKind::ConceptCompletion => self.concepts_completed as f64,
            CriterionKind::Streak => self.current_streak as f64,
            CriterionKind::Score => self.best_quiz_score,
            CriterionKind::TimeSpent => self.time_spent_seconds as f64,
            CriterionKind::ProblemsSolved => self.problems_solved as f64,
        }
    }
}

/// One user's activity counters for one local calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyStats {
    pub user_id: UserId,
    pub date: NaiveDate,
    pub time_spent_seconds: u64,
    pub videos_watched: u32,
    pub articles_read: u32,
    pub problems_solved: u32,
    pub quizzes_taken: u32,
    pub quizzes_passed: u32,
    pub concepts_completed: u32,
    pub courses_completed: u32,
    /// Best quiz score of the day, 0-100.
    pub best_quiz_score: f64,
    /// Sum of quiz scores, for period averaging.
    pub quiz_score_total: f64,
}

impl DailyStats {
    pub fn new(user_id: UserId, date: NaiveDate) -> Self {
        Self {
            user_id,
            date,
            time_spent_seconds: 0,
            videos_watched: 0,
            articles_read: 0,
            problems_solved: 0,
            quizzes_taken: 0,
            quizzes_passed: 0,
            concepts_completed: 0,
            courses_completed: 0,
            best_quiz_score: 0.0,
            quiz_score_total: 0.0,
        }
    }
}

/// Aggregation window for periodic rollups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Period {
    Week,
    Month,
}

/// Weekly/monthly rollup derived from the daily rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodStats {
    pub user_id: UserId,
    pub period: Period,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Days in the window with any recorded activity.
    pub active_days: u32,
    pub time_spent_seconds: u64,
    pub videos_watched: u32,
    pub articles_read: u32,
    pub problems_solved: u32,
    pub quizzes_taken: u32,
    pub concepts_completed: u32,
    pub courses_completed: u32,
    /// Mean quiz score across the window's quizzes, 0-100.
    pub average_quiz_score: f64,
}
