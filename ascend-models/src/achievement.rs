//! Achievement definitions and per-user unlock state.
//!
//! Definitions are immutable reference data shared by all users; the only
//! mutable per-user projection is [`UserAchievement`]. Criteria kinds,
//! operators, and condition values are closed enums rather than free-form
//! strings and mixed-type maps.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DefinitionError;
use crate::types::{AchievementId, UserId};

/// The cumulative stat an achievement's criteria tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CriterionKind {
    CourseCompletion,
    ConceptCompletion,
    Streak,
    Score,
    TimeSpent,
    ProblemsSolved,
}

/// The window the criteria counter is measured over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Timeframe {
    Daily,
    Weekly,
    Monthly,
    #[default]
    AllTime,
}

/// Comparison operator for condition filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    Equals,
    NotEquals,
    GreaterThan,
    LessThan,
    In,
}

/// A condition value: number, string, or list of strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConditionValue {
    Number(f64),
    Text(String),
    List(Vec<String>),
}

/// A single field filter. All of an achievement's conditions must hold for
/// the achievement to be eligible at all.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    /// Context field the filter addresses, e.g. `course.category`.
    pub field: String,
    pub operator: Operator,
    pub value: ConditionValue,
}

/// Unlock criteria for an achievement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Criteria {
    pub kind: CriterionKind,
    pub target: f64,
    #[serde(default)]
    pub timeframe: Timeframe,
    #[serde(default)]
    pub conditions: Vec<Condition>,
}

/// Reward granted when an achievement completes.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Reward {
    #[serde(default)]
    pub experience_points: u32,
    #[serde(default)]
    pub badge: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub unlocks: Vec<String>,
}

/// Reward granted when a progressive step is crossed.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StepReward {
    #[serde(default)]
    pub experience_points: u32,
    #[serde(default)]
    pub badge: Option<String>,
}

/// One milestone of a progressive achievement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressStep {
    pub step: u32,
    #[serde(default)]
    pub title: Option<String>,
    pub target: f64,
    #[serde(default)]
    pub reward: StepReward,
}

/// An achievement definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Achievement {
    pub id: AchievementId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub criteria: Criteria,
    #[serde(default)]
    pub reward: Reward,
    /// Ordered milestone steps; empty for single-target achievements.
    #[serde(default)]
    pub steps: Vec<ProgressStep>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    /// Hidden from listings until unlocked.
    #[serde(default)]
    pub is_secret: bool,
    #[serde(default)]
    pub display_order: u32,
}

fn default_true() -> bool {
    true
}

impl Achievement {
    /// Whether this achievement unlocks via milestone steps.
    pub fn is_progressive(&self) -> bool {
        !self.steps.is_empty()
    }

    /// Validate the definition. Run once at load time; the evaluator
    /// assumes a validated definition.
    ///
    /// Steps must be numbered `1..=n` without gaps and strictly increasing
    /// by target, so "all newly crossed steps in ascending order" is
    /// well-defined.
    pub fn validate(&self) -> Result<(), DefinitionError> {
        if self.criteria.target <= 0.0 {
            return Err(DefinitionError::NonPositiveTarget {
                achievement: self.id.clone(),
                target: self.criteria.target,
            });
        }

        let mut previous_target = 0.0;
        for (position, step) in self.steps.iter().enumerate() {
            if step.step as usize != position + 1 {
                return Err(DefinitionError::StepNumberGap {
                    achievement: self.id.clone(),
                    step: step.step,
                    position,
                });
            }
            if step.target <= previous_target {
                return Err(DefinitionError::StepTargetNotIncreasing {
                    achievement: self.id.clone(),
                    step: step.step,
                    target: step.target,
                    previous: previous_target,
                });
            }
            previous_target = step.target;
        }
        Ok(())
    }
}

/// Unlock status of a user's achievement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AchievementStatus {
    Locked,
    InProgress,
    Completed,
}

/// A user's progress toward one achievement. Created lazily on the first
/// relevant event; one logical document per (user, achievement).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserAchievement {
    pub user_id: UserId,
    pub achievement_id: AchievementId,
    pub current_progress: f64,
    pub status: AchievementStatus,
    /// Step numbers already unlocked, for progressive achievements.
    #[serde(default)]
    pub completed_steps: BTreeSet<u32>,
    pub unlocked_at: Option<DateTime<Utc>>,
    pub first_progress_at: Option<DateTime<Utc>>,
    pub last_progress_at: Option<DateTime<Utc>>,
}

impl UserAchievement {
    pub fn new(user_id: UserId, achievement_id: AchievementId) -> Self {
        Self {
            user_id,
            achievement_id,
            current_progress: 0.0,
            status: AchievementStatus::Locked,
            completed_steps: BTreeSet::new(),
            unlocked_at: None,
            first_progress_at: None,
            last_progress_at: None,
        }
    }

    /// Record the observed counter value. Progress never regresses, and a
    /// completed achievement stays completed.
    pub fn record_progress(&mut self, value: f64, now: DateTime<Utc>) {
        if value > self.current_progress {
            self.current_progress = value;
            if self.first_progress_at.is_none() {
                self.first_progress_at = Some(now);
            }
            self.last_progress_at = Some(now);
            if self.status == AchievementStatus::Locked && value > 0.0 {
                self.status = AchievementStatus::InProgress;
            }
        }
    }

    /// Transition to completed. Idempotent: returns `false` if already
    /// completed, so an unlock is never emitted twice.
    pub fn complete(&mut self, now: DateTime<Utc>) -> bool {
        if self.status == AchievementStatus::Completed {
            return false;
        }
        self.status = AchievementStatus::Completed;
        self.unlocked_at = Some(now);
        true
    }

    /// Mark a progressive step as unlocked. Returns `false` if the step was
    /// already in `completed_steps`.
    pub fn complete_step(&mut self, step: u32) -> bool {
        self.completed_steps.insert(step)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn progressive(steps: &[(u32, f64)]) -> Achievement {
        Achievement {
            id: AchievementId::new("problem-master"),
            title: "Problem Solving Master".into(),
            description: String::new(),
            criteria: Criteria {
                kind: CriterionKind::ProblemsSolved,
                target: 500.0,
                timeframe: Timeframe::AllTime,
                conditions: Vec::new(),
            },
            reward: Reward::default(),
            steps: steps
                .iter()
                .map(|&(step, target)| ProgressStep {
                    step,
                    title: None,
                    target,
                    reward: StepReward::default(),
                })
                .collect(),
            is_active: true,
            is_secret: false,
            display_order: 0,
        }
    }

    #[test]
    fn valid_progressive_definition_passes() {
        let a = progressive(&[(1, 10.0), (2, 50.0), (3, 150.0), (4, 500.0)]);
        assert!(a.validate().is_ok());
        assert!(a.is_progressive());
    }

    #[test]
    fn step_number_gap_is_rejected() {
        let a = progressive(&[(1, 10.0), (3, 50.0)]);
        assert!(matches!(
            a.validate(),
            Err(DefinitionError::StepNumberGap { step: 3, .. })
        ));
    }

    #[test]
    fn non_increasing_targets_are_rejected() {
        let a = progressive(&[(1, 50.0), (2, 50.0)]);
        assert!(matches!(
            a.validate(),
            Err(DefinitionError::StepTargetNotIncreasing { step: 2, .. })
        ));
    }

    #[test]
    fn zero_target_is_rejected() {
        let mut a = progressive(&[]);
        a.criteria.target = 0.0;
        assert!(matches!(
            a.validate(),
            Err(DefinitionError::NonPositiveTarget { .. })
        ));
    }

    #[test]
    fn complete_is_monotonic() {
        let mut ua = UserAchievement::new(UserId::new("u1"), AchievementId::new("a1"));
        let now = Utc::now();
        assert!(ua.complete(now));
        assert!(!ua.complete(now));
        assert_eq!(ua.status, AchievementStatus::Completed);
    }

    #[test]
    fn record_progress_never_regresses() {
        let mut ua = UserAchievement::new(UserId::new("u1"), AchievementId::new("a1"));
        let now = Utc::now();
        ua.record_progress(10.0, now);
        ua.record_progress(5.0, now);
        assert_eq!(ua.current_progress, 10.0);
        assert_eq!(ua.status, AchievementStatus::InProgress);
    }

    #[test]
    fn complete_step_reports_first_insert_only() {
        let mut ua = UserAchievement::new(UserId::new("u1"), AchievementId::new("a1"));
        assert!(ua.complete_step(1));
        assert!(!ua.complete_step(1));
    }

    #[test]
    fn condition_value_deserializes_untagged() {
        let n: ConditionValue = serde_json::from_str("42.0").unwrap();
        assert_eq!(n, ConditionValue::Number(42.0));

        let s: ConditionValue = serde_json::from_str("\"dsa\"").unwrap();
        assert_eq!(s, ConditionValue::Text("dsa".into()));

        let l: ConditionValue = serde_json::from_str(r#"["dsa", "web"]"#).unwrap();
        assert_eq!(l, ConditionValue::List(vec!["dsa".into(), "web".into()]));
    }

    #[test]
    fn achievement_deserializes_with_defaults() {
        let json = r#"{
            "id": "first-course",
            "title": "First Steps",
            "criteria": { "kind": "course_completion", "target": 1 }
        }"#;
        let a: Achievement = serde_json::from_str(json).unwrap();
        assert!(a.is_active);
        assert!(!a.is_progressive());
        assert_eq!(a.criteria.timeframe, Timeframe::AllTime);
        assert!(a.validate().is_ok());
    }
}
