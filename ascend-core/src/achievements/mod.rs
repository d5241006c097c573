//! Achievement evaluation - criteria checks against cumulative stats
//!
//! The evaluator runs after every event, over every active definition
//! whose stat could have moved. All mutations of [`UserAchievement`] go
//! through its monotonic transition methods, which is what makes repeated
//! evaluation with the same snapshot emit nothing the second time.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use ascend_models::{
    Achievement, AchievementId, AchievementStatus, Condition, ConditionValue, Criteria,
    CriterionKind, DailyStats, Operator, Timeframe, UserAchievement, UserId, UserStatSnapshot,
};

/// One newly granted unlock: either a whole achievement or one progressive
/// step of it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unlock {
    pub achievement_id: AchievementId,
    pub title: String,
    /// `None` for single-target achievements; the step number otherwise.
    pub step: Option<u32>,
    pub experience_points: u32,
    pub badge: Option<String>,
}

/// The stat inputs one evaluation pass reads: the all-time snapshot plus
/// the daily rows backing timeframe-scoped criteria.
pub struct StatContext<'a> {
    pub snapshot: &'a UserStatSnapshot,
    /// Daily rows covering at least the current calendar month.
    pub recent_days: &'a [DailyStats],
    /// Today in the user's timezone.
    pub today: NaiveDate,
}

impl StatContext<'_> {
    /// The counter value a criteria reads, measured over its timeframe.
    ///
    /// Streaks are day-granular already, so the timeframe does not change
    /// what a streak criterion reads.
    pub fn progress_value(&self, criteria: &Criteria) -> f64 {
        if criteria.kind == CriterionKind::Streak || criteria.timeframe == Timeframe::AllTime {
            return self.snapshot.counter(criteria.kind);
        }

        let days = self.window(criteria.timeframe);
        match criteria.kind {
            CriterionKind::ProblemsSolved => {
                days.map(|d| d.problems_solved as f64).sum()
            }
            CriterionKind::ConceptCompletion => {
                days.map(|d| d.concepts_completed as f64).sum()
            }
            CriterionKind::CourseCompletion => {
                days.map(|d| d.courses_completed as f64).sum()
            }
            CriterionKind::TimeSpent => days.map(|d| d.time_spent_seconds as f64).sum(),
            CriterionKind::Score => days.map(|d| d.best_quiz_score).fold(0.0, f64::max),
            // Handled above; kept for exhaustiveness
            CriterionKind::Streak => self.snapshot.counter(criteria.kind),
        }
    }

    fn window(&self, timeframe: Timeframe) -> impl Iterator<Item = &DailyStats> {
        let today = self.today;
        let start = match timeframe {
            Timeframe::Daily => today,
            Timeframe::Weekly => today
                .checked_sub_days(Days::new(6))
                .unwrap_or(NaiveDate::MIN),
            Timeframe::Monthly => today.with_day(1).unwrap_or(today),
            Timeframe::AllTime => NaiveDate::MIN,
        };
        self.recent_days
            .iter()
            .filter(move |d| d.date >= start && d.date <= today)
    }
}

/// Evaluate every definition against the stats, lazily creating
/// per-achievement state on first relevant progress.
///
/// Returns the unlocks in definition order, progressive steps ascending.
pub fn evaluate(
    definitions: &[Achievement],
    states: &mut BTreeMap<AchievementId, UserAchievement>,
    user_id: &UserId,
    stats: &StatContext<'_>,
    now: DateTime<Utc>,
) -> Vec<Unlock> {
    let mut unlocks = Vec::new();
    for def in definitions.iter().filter(|d| d.is_active) {
        if !conditions_met(&def.criteria.conditions, stats.snapshot) {
            continue;
        }
        let value = stats.progress_value(&def.criteria);
        if value <= 0.0 && !states.contains_key(&def.id) {
            // Nothing relevant has happened yet; stay lazy.
            continue;
        }
        let state = states
            .entry(def.id.clone())
            .or_insert_with(|| UserAchievement::new(user_id.clone(), def.id.clone()));
        unlocks.extend(evaluate_one(def, state, value, now));
    }
    unlocks
}

/// Evaluate one definition against its per-user state, given the already
/// computed progress value.
pub fn evaluate_one(
    def: &Achievement,
    state: &mut UserAchievement,
    value: f64,
    now: DateTime<Utc>,
) -> Vec<Unlock> {
    // A completed achievement is never re-evaluated or re-emitted.
    if state.status == AchievementStatus::Completed {
        return Vec::new();
    }

    state.record_progress(value, now);
    let mut unlocks = Vec::new();

    if def.is_progressive() {
        let final_step = def.steps.len() as u32;
        // Steps are validated ascending, so a bulk jump emits every newly
        // crossed step in order within this single call.
        for step in &def.steps {
            if value >= step.target && state.complete_step(step.step) {
                info!(
                    achievement = %def.id,
                    step = step.step,
                    "progressive step unlocked"
                );
                unlocks.push(Unlock {
                    achievement_id: def.id.clone(),
                    title: def.title.clone(),
                    step: Some(step.step),
                    experience_points: step.reward.experience_points,
                    badge: step.reward.badge.clone(),
                });
                if step.step == final_step {
                    state.complete(now);
                }
            }
        }
    } else if value >= def.criteria.target && state.complete(now) {
        info!(achievement = %def.id, "achievement unlocked");
        unlocks.push(Unlock {
            achievement_id: def.id.clone(),
            title: def.title.clone(),
            step: None,
            experience_points: def.reward.experience_points,
            badge: def.reward.badge.clone(),
        });
    }

    if unlocks.is_empty() {
        debug!(achievement = %def.id, value, "no new unlocks");
    }
    unlocks
}

/// All condition filters must hold (logical AND). A field absent from the
/// snapshot context fails its condition, making the achievement
/// ineligible before any progress comparison.
pub fn conditions_met(conditions: &[Condition], snapshot: &UserStatSnapshot) -> bool {
    conditions.iter().all(|condition| {
        snapshot
            .context
            .get(&condition.field)
            .is_some_and(|value| condition_holds(condition.operator, &condition.value, value))
    })
}

fn condition_holds(operator: Operator, expected: &ConditionValue, actual: &ConditionValue) -> bool {
    use ConditionValue::*;
    match (operator, expected, actual) {
        (Operator::Equals, e, a) => e == a,
        (Operator::NotEquals, e, a) => e != a,
        (Operator::GreaterThan, Number(e), Number(a)) => a > e,
        (Operator::LessThan, Number(e), Number(a)) => a < e,
        (Operator::In, List(list), Text(a)) => list.iter().any(|item| item == a),
        _ => false,
    }
}
