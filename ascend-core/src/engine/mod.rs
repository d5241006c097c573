//! Engine orchestration - the full apply pipeline
//!
//! One accepted event flows ingest → progress → streak → rollups →
//! snapshot → achievements → notifications. Every mutated document is
//! saved with optimistic locking; a conflicted save reloads and reapplies,
//! which is safe because every mutation is idempotent or monotonic.
//! Notifications go out only after their underlying save succeeded, and
//! never roll anything back.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{Days, FixedOffset, NaiveDate, Utc};
use tracing::warn;

use ascend_models::{
    Achievement, ActivityDetail, ActivityEvent, ActivitySubmission, ConceptId, ConceptProgress,
    CourseId, CourseProgress, CourseStructure, DailyStats, DefinitionError, GradedAttempt,
    LearningPath, MockTest, PathProgress, Period, PeriodStats, Response, StreakState,
    UserAchievement, UserId, UserStatSnapshot,
};

use crate::achievements::{self, StatContext, Unlock};
use crate::analytics;
use crate::assessment;
use crate::catalog::CourseCatalog;
use crate::config::EngineConfig;
use crate::error::{EngineError, ValidationError};
use crate::history::PerformanceHistory;
use crate::ingest::EventIngest;
use crate::mastery::{self, MasteryScore};
use crate::notify::{EngineNotification, Notifier};
use crate::paths::{self, StepInput};
use crate::progress::{self, ProgressDelta};
use crate::store::{AchievementStore, AttemptStore, ProgressStore, StatsStore, StreakStore};
use crate::streaks::{self, StreakChange};

/// The collaborators the engine is composed from.
pub struct EngineDeps {
    pub catalog: Arc<dyn CourseCatalog>,
    pub progress: Arc<dyn ProgressStore>,
    pub streaks: Arc<dyn StreakStore>,
    pub achievements: Arc<dyn AchievementStore>,
    pub attempts: Arc<dyn AttemptStore>,
    pub stats: Arc<dyn StatsStore>,
    pub history: Arc<dyn PerformanceHistory>,
    pub notifier: Arc<dyn Notifier>,
}

/// What one submitted event ended up changing.
#[derive(Debug, Clone)]
pub struct ApplyOutcome {
    pub event: ActivityEvent,
    /// Course overall progress after application, 0-100.
    pub overall_progress: f64,
    /// Concepts that newly completed in this application.
    pub concepts_completed: Vec<ConceptId>,
    pub course_completed: bool,
    /// Mastery of the touched concept, recomputed after application.
    pub mastery: MasteryScore,
    pub streak: StreakState,
    pub unlocks: Vec<Unlock>,
}

/// The progress, mastery, and achievement computation engine.
pub struct LearningEngine {
    ingest: EventIngest,
    progress: Arc<dyn ProgressStore>,
    streaks: Arc<dyn StreakStore>,
    achievements: Arc<dyn AchievementStore>,
    attempts: Arc<dyn AttemptStore>,
    stats: Arc<dyn StatsStore>,
    history: Arc<dyn PerformanceHistory>,
    notifier: Arc<dyn Notifier>,
    definitions: Vec<Achievement>,
    config: EngineConfig,
}

impl LearningEngine {
    /// Compose an engine. Achievement definitions are validated here, at
    /// load time; the evaluator assumes well-formed step lists.
    pub fn new(
        deps: EngineDeps,
        definitions: Vec<Achievement>,
        config: EngineConfig,
    ) -> Result<Self, DefinitionError> {
        for definition in &definitions {
            definition.validate()?;
        }
        let ingest = EventIngest::new(
            deps.catalog,
            Duration::from_millis(config.catalog_timeout_ms),
        );
        Ok(Self {
            ingest,
            progress: deps.progress,
            streaks: deps.streaks,
            achievements: deps.achievements,
            attempts: deps.attempts,
            stats: deps.stats,
            history: deps.history,
            notifier: deps.notifier,
            definitions,
            config,
        })
    }

    /// Run the full pipeline for one activity submission.
    ///
    /// `timezone` is the submitting user's configured offset; it decides
    /// which local calendar day the activity lands on for streaks and
    /// daily rollups.
    pub async fn submit(
        &self,
        submission: ActivitySubmission,
        timezone: FixedOffset,
    ) -> Result<ApplyOutcome, EngineError> {
        let (event, structure) = self.ingest.normalize(submission).await?;
        let local_day = event.occurred_at.with_timezone(&timezone).date_naive();

        let (course_progress, delta) = self.apply_progress(&event, &structure).await?;
        let streak = self.apply_streak(&event, timezone).await?;
        self.apply_daily(&event, &delta, local_day).await?;
        let snapshot = self.apply_snapshot(&event, &delta, &streak).await?;

        let window_start = local_day
            .checked_sub_days(Days::new(self.config.stats_window_days as u64))
            .unwrap_or(NaiveDate::MIN);
        let recent_days = self
            .stats
            .load_days(&event.user_id, window_start, local_day)
            .await?;
        let unlocks = self
            .evaluate_achievements(&event.user_id, &snapshot, &recent_days, local_day)
            .await?;

        let mastery = self
            .concept_mastery_of(&course_progress, &event.user_id, &event.concept_id)
            .await;

        self.send_notifications(&event, &delta, &unlocks).await;

        Ok(ApplyOutcome {
            overall_progress: course_progress.overall_progress,
            concepts_completed: delta.concepts_completed,
            course_completed: delta.course_completed,
            mastery,
            streak,
            unlocks,
            event,
        })
    }

    /// Grade and record a mock-test attempt.
    ///
    /// The percentile is a snapshot against the attempts recorded before
    /// this one; concurrent submissions make it best-effort, never wrong
    /// by more than the race.
    pub async fn grade_attempt(
        &self,
        test: &MockTest,
        responses: &[Response],
        user_id: UserId,
    ) -> Result<GradedAttempt, EngineError> {
        test.validate()?;

        let attempt_number = self
            .attempts
            .next_attempt_number(&user_id, &test.id)
            .await?;
        if test.max_attempts > 0 && attempt_number > test.max_attempts {
            return Err(ValidationError::AttemptLimitReached {
                test: test.id.clone(),
                max: test.max_attempts,
            }
            .into());
        }

        let prior_scores = self.attempts.prior_scores(&test.id).await?;
        let graded = assessment::grade_attempt(
            test,
            responses,
            &prior_scores,
            user_id,
            attempt_number,
            Utc::now(),
        );
        self.attempts.record(&graded).await?;
        Ok(graded)
    }

    /// Mastery of one concept, recomputed on every read.
    pub async fn concept_mastery(
        &self,
        user_id: &UserId,
        course_id: &CourseId,
        concept_id: &ConceptId,
    ) -> Result<MasteryScore, EngineError> {
        let loaded = self.progress.load(user_id, course_id).await?;
        let course_progress = loaded.map(|v| v.value).unwrap_or_else(|| {
            CourseProgress::new(user_id.clone(), course_id.clone(), Utc::now())
        });
        Ok(self
            .concept_mastery_of(&course_progress, user_id, concept_id)
            .await)
    }

    /// A user's derived progress through a learning path.
    pub async fn path_progress(
        &self,
        path: &LearningPath,
        user_id: &UserId,
    ) -> Result<PathProgress, EngineError> {
        path.validate()?;

        let mut inputs = HashMap::new();
        for step in &path.steps {
            let Some(loaded) = self.progress.load(user_id, &step.course_id).await? else {
                continue;
            };
            let course_progress = loaded.value;

            let mut scores = Vec::with_capacity(course_progress.concepts.len());
            for concept in &course_progress.concepts {
                let performance = self
                    .history
                    .concept_performance(user_id, &concept.concept_id)
                    .await;
                scores.push(mastery::compute_mastery(concept, &performance).score as f64);
            }
            let mastery_mean = if scores.is_empty() {
                None
            } else {
                Some(scores.iter().sum::<f64>() / scores.len() as f64)
            };

            inputs.insert(
                step.course_id.clone(),
                StepInput {
                    progress: course_progress.overall_progress,
                    mastery: mastery_mean,
                },
            );
        }
        Ok(paths::path_progress(path, user_id.clone(), &inputs))
    }

    /// Weekly or monthly activity rollup ending on the user-local `today`.
    pub async fn period_stats(
        &self,
        user_id: &UserId,
        period: Period,
        today: NaiveDate,
    ) -> Result<PeriodStats, EngineError> {
        let (from, to) = analytics::period_range(period, today);
        let days = self.stats.load_days(user_id, from, to).await?;
        Ok(analytics::aggregate(user_id.clone(), period, &days, today))
    }

    /// All of one user's achievement states, for listings.
    pub async fn achievement_states(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<UserAchievement>, EngineError> {
        Ok(self.achievements.load_user(user_id).await?)
    }

    async fn concept_mastery_of(
        &self,
        course_progress: &CourseProgress,
        user_id: &UserId,
        concept_id: &ConceptId,
    ) -> MasteryScore {
        let performance = self.history.concept_performance(user_id, concept_id).await;
        match course_progress.concept(concept_id) {
            Some(concept) => mastery::compute_mastery(concept, &performance),
            None => mastery::compute_mastery(
                &ConceptProgress::new(concept_id.clone()),
                &performance,
            ),
        }
    }

    async fn apply_progress(
        &self,
        event: &ActivityEvent,
        structure: &CourseStructure,
    ) -> Result<(CourseProgress, ProgressDelta), EngineError> {
        let mut attempts = 0u32;
        loop {
            let loaded = self.progress.load(&event.user_id, &event.course_id).await?;
            let (mut document, version) = match loaded {
                Some(v) => (v.value, v.version),
                None => (
                    CourseProgress::new(event.user_id.clone(), event.course_id.clone(), Utc::now()),
                    0,
                ),
            };

            let delta = progress::apply_event(&mut document, structure, event, Utc::now())?;
            match self.progress.save(&document, version).await {
                Ok(_) => return Ok((document, delta)),
                Err(e) => {
                    self.classify_conflict(e, &mut attempts, "progress", &event.user_id)?;
                }
            }
        }
    }

    async fn apply_streak(
        &self,
        event: &ActivityEvent,
        timezone: FixedOffset,
    ) -> Result<StreakState, EngineError> {
        let mut attempts = 0u32;
        loop {
            let loaded = self.streaks.load(&event.user_id).await?;
            let (mut state, version) = match loaded {
                Some(v) => (v.value, v.version),
                None => (StreakState::new(event.user_id.clone()), 0),
            };

            let change = streaks::record_activity(&mut state, event.occurred_at, timezone);
            if change == StreakChange::Unchanged && version > 0 {
                // Same-day repeat: nothing to save.
                return Ok(state);
            }
            match self.streaks.save(&state, version).await {
                Ok(_) => return Ok(state),
                Err(e) => {
                    self.classify_conflict(e, &mut attempts, "streak", &event.user_id)?;
                }
            }
        }
    }

    async fn apply_daily(
        &self,
        event: &ActivityEvent,
        delta: &ProgressDelta,
        local_day: NaiveDate,
    ) -> Result<(), EngineError> {
        let mut attempts = 0u32;
        loop {
            let loaded = self.stats.load_day(&event.user_id, local_day).await?;
            let (mut row, version) = match loaded {
                Some(v) => (v.value, v.version),
                None => (DailyStats::new(event.user_id.clone(), local_day), 0),
            };

            analytics::fold_event(&mut row, event, delta);
            match self.stats.save_day(&row, version).await {
                Ok(_) => return Ok(()),
                Err(e) => {
                    self.classify_conflict(e, &mut attempts, "daily-stats", &event.user_id)?;
                }
            }
        }
    }

    async fn apply_snapshot(
        &self,
        event: &ActivityEvent,
        delta: &ProgressDelta,
        streak: &StreakState,
    ) -> Result<UserStatSnapshot, EngineError> {
        let mut attempts = 0u32;
        loop {
            let loaded = self.stats.load_snapshot(&event.user_id).await?;
            let (mut snapshot, version) = match loaded {
                Some(v) => (v.value, v.version),
                None => (UserStatSnapshot::new(event.user_id.clone()), 0),
            };

            update_snapshot(&mut snapshot, event, delta, streak);
            match self.stats.save_snapshot(&snapshot, version).await {
                Ok(_) => return Ok(snapshot),
                Err(e) => {
                    self.classify_conflict(e, &mut attempts, "snapshot", &event.user_id)?;
                }
            }
        }
    }

    async fn evaluate_achievements(
        &self,
        user_id: &UserId,
        snapshot: &UserStatSnapshot,
        recent_days: &[DailyStats],
        today: NaiveDate,
    ) -> Result<Vec<Unlock>, EngineError> {
        let context = StatContext {
            snapshot,
            recent_days,
            today,
        };
        let now = Utc::now();
        let mut unlocks = Vec::new();

        for definition in self.definitions.iter().filter(|d| d.is_active) {
            if !achievements::conditions_met(&definition.criteria.conditions, snapshot) {
                continue;
            }
            let value = context.progress_value(&definition.criteria);

            let mut attempts = 0u32;
            loop {
                let loaded = self.achievements.load(user_id, &definition.id).await?;
                if loaded.is_none() && value <= 0.0 {
                    // Nothing relevant has happened yet; stay lazy.
                    break;
                }
                let (mut state, version, original) = match loaded {
                    Some(v) => (v.value.clone(), v.version, Some(v.value)),
                    None => (
                        UserAchievement::new(user_id.clone(), definition.id.clone()),
                        0,
                        None,
                    ),
                };

                let new_unlocks = achievements::evaluate_one(definition, &mut state, value, now);
                if original.as_ref() == Some(&state) {
                    // No state change: retried evaluation emits nothing.
                    break;
                }
                match self.achievements.save(&state, version).await {
                    Ok(_) => {
                        // Unlocks count only once their state is durable.
                        unlocks.extend(new_unlocks);
                        break;
                    }
                    Err(e) => {
                        self.classify_conflict(e, &mut attempts, "achievement", user_id)?;
                    }
                }
            }
        }
        Ok(unlocks)
    }

    async fn send_notifications(
        &self,
        event: &ActivityEvent,
        delta: &ProgressDelta,
        unlocks: &[Unlock],
    ) {
        for concept_id in &delta.concepts_completed {
            self.notifier
                .notify(
                    &event.user_id,
                    EngineNotification::ConceptCompleted {
                        course_id: event.course_id.clone(),
                        concept_id: concept_id.clone(),
                    },
                )
                .await;
        }
        if delta.course_completed {
            self.notifier
                .notify(
                    &event.user_id,
                    EngineNotification::CourseCompleted {
                        course_id: event.course_id.clone(),
                    },
                )
                .await;
        }
        for unlock in unlocks {
            self.notifier
                .notify(
                    &event.user_id,
                    EngineNotification::AchievementUnlocked {
                        achievement_id: unlock.achievement_id.clone(),
                        title: unlock.title.clone(),
                        step: unlock.step,
                        experience_points: unlock.experience_points,
                        badge: unlock.badge.clone(),
                    },
                )
                .await;
        }
    }

    /// Conflicts are retried up to the configured bound; anything else
    /// (and an exhausted bound) fails the request.
    fn classify_conflict(
        &self,
        error: crate::error::StoreError,
        attempts: &mut u32,
        key_kind: &str,
        user_id: &UserId,
    ) -> Result<(), EngineError> {
        if !error.is_conflict() {
            return Err(error.into());
        }
        *attempts += 1;
        if *attempts > self.config.max_save_retries {
            return Err(EngineError::Concurrency {
                key: format!("{key_kind}:{user_id}"),
                attempts: *attempts,
            });
        }
        warn!(
            user = %user_id,
            key_kind,
            attempt = *attempts,
            "version conflict, retrying apply cycle"
        );
        Ok(())
    }
}

/// Fold one event's effects into the cumulative snapshot.
fn update_snapshot(
    snapshot: &mut UserStatSnapshot,
    event: &ActivityEvent,
    delta: &ProgressDelta,
    streak: &StreakState,
) {
    snapshot.time_spent_seconds += event.time_spent_seconds;
    match &event.detail {
        ActivityDetail::Coding { solved: true, .. } => snapshot.problems_solved += 1,
        ActivityDetail::Quiz { score, passed } => {
            snapshot.best_quiz_score = snapshot.best_quiz_score.max(*score);
            if *passed {
                snapshot.quizzes_passed += 1;
            }
        }
        _ => {}
    }
    snapshot.concepts_completed += delta.concepts_completed.len() as u64;
    if delta.course_completed {
        snapshot.courses_completed += 1;
    }
    snapshot.current_streak = streak.current_streak;
    snapshot.longest_streak = streak.longest_streak;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_folds_solved_problems_and_quizzes() {
        let user = UserId::new("u1");
        let mut snapshot = UserStatSnapshot::new(user.clone());
        let streak = StreakState::new(user.clone());
        let delta = ProgressDelta::default();

        let mut event = ActivityEvent {
            event_id: uuid::Uuid::new_v4(),
            user_id: user.clone(),
            course_id: CourseId::new("c1"),
            concept_id: ConceptId::new("arrays"),
            topic_id: ascend_models::TopicId::new("t1"),
            detail: ActivityDetail::Coding {
                attempts: 1,
                hints_used: 0,
                solved: true,
            },
            completed: true,
            time_spent_seconds: 100,
            occurred_at: Utc::now(),
        };
        update_snapshot(&mut snapshot, &event, &delta, &streak);
        assert_eq!(snapshot.problems_solved, 1);
        assert_eq!(snapshot.time_spent_seconds, 100);

        event.detail = ActivityDetail::Quiz {
            score: 88.0,
            passed: true,
        };
        update_snapshot(&mut snapshot, &event, &delta, &streak);
        assert_eq!(snapshot.quizzes_passed, 1);
        assert_eq!(snapshot.best_quiz_score, 88.0);
    }

    #[test]
    fn snapshot_folds_completion_deltas() {
        let user = UserId::new("u1");
        let mut snapshot = UserStatSnapshot::new(user.clone());
        let mut streak = StreakState::new(user.clone());
        streak.current_streak = 4;
        streak.longest_streak = 9;
        let delta = ProgressDelta {
            topic_completed: true,
            concepts_completed: vec![ConceptId::new("arrays")],
            course_completed: true,
        };

        let event = ActivityEvent {
            event_id: uuid::Uuid::new_v4(),
            user_id: user.clone(),
            course_id: CourseId::new("c1"),
            concept_id: ConceptId::new("arrays"),
            topic_id: ascend_models::TopicId::new("t1"),
            detail: ActivityDetail::Video {
                watch_percentage: 100.0,
            },
            completed: true,
            time_spent_seconds: 60,
            occurred_at: Utc::now(),
        };
        update_snapshot(&mut snapshot, &event, &delta, &streak);

        assert_eq!(snapshot.concepts_completed, 1);
        assert_eq!(snapshot.courses_completed, 1);
        assert_eq!(snapshot.current_streak, 4);
        assert_eq!(snapshot.longest_streak, 9);
    }
}
