//! Repository traits - the narrow persistence seam
//!
//! Each aggregate is one logical document saved with optimistic locking:
//! `save` takes the version the caller loaded and fails with
//! [`StoreError::VersionConflict`] if the document moved underneath it.
//! A new document is created by saving with `expected_version == 0`.

use async_trait::async_trait;
use chrono::NaiveDate;

use ascend_models::{
    AchievementId, CourseId, CourseProgress, DailyStats, GradedAttempt, StreakState, TestId,
    UserAchievement, UserId, UserStatSnapshot,
};

use crate::error::StoreError;

mod memory;
pub use memory::{
    MemoryAchievementStore, MemoryAttemptStore, MemoryProgressStore, MemoryStatsStore,
    MemoryStreakStore,
};

/// A document plus the version it was read at.
#[derive(Debug, Clone, PartialEq)]
pub struct Versioned<T> {
    pub version: u64,
    pub value: T,
}

/// Per-(user, course) progress documents.
#[async_trait]
pub trait ProgressStore: Send + Sync {
    async fn load(
        &self,
        user_id: &UserId,
        course_id: &CourseId,
    ) -> Result<Option<Versioned<CourseProgress>>, StoreError>;

    /// Save with a version check; returns the new version.
    async fn save(&self, progress: &CourseProgress, expected_version: u64)
    -> Result<u64, StoreError>;
}

/// Per-user streak documents.
#[async_trait]
pub trait StreakStore: Send + Sync {
    async fn load(&self, user_id: &UserId) -> Result<Option<Versioned<StreakState>>, StoreError>;

    async fn save(&self, state: &StreakState, expected_version: u64) -> Result<u64, StoreError>;
}

/// Per-(user, achievement) unlock-state documents.
#[async_trait]
pub trait AchievementStore: Send + Sync {
    async fn load(
        &self,
        user_id: &UserId,
        achievement_id: &AchievementId,
    ) -> Result<Option<Versioned<UserAchievement>>, StoreError>;

    /// All of one user's achievement states, for listings.
    async fn load_user(&self, user_id: &UserId) -> Result<Vec<UserAchievement>, StoreError>;

    async fn save(&self, state: &UserAchievement, expected_version: u64)
    -> Result<u64, StoreError>;
}

/// Graded mock-test attempts, append-only.
#[async_trait]
pub trait AttemptStore: Send + Sync {
    /// Scores of all completed attempts on a test, in submission order.
    async fn prior_scores(&self, test_id: &TestId) -> Result<Vec<f64>, StoreError>;

    /// The next attempt number for this (user, test) pair; starts at 1.
    async fn next_attempt_number(
        &self,
        user_id: &UserId,
        test_id: &TestId,
    ) -> Result<u32, StoreError>;

    async fn record(&self, attempt: &GradedAttempt) -> Result<(), StoreError>;
}

/// Stat snapshots and daily rollup rows.
#[async_trait]
pub trait StatsStore: Send + Sync {
    async fn load_snapshot(
        &self,
        user_id: &UserId,
    ) -> Result<Option<Versioned<UserStatSnapshot>>, StoreError>;

    async fn save_snapshot(
        &self,
        snapshot: &UserStatSnapshot,
        expected_version: u64,
    ) -> Result<u64, StoreError>;

    async fn load_day(
        &self,
        user_id: &UserId,
        date: NaiveDate,
    ) -> Result<Option<Versioned<DailyStats>>, StoreError>;

    async fn save_day(&self, stats: &DailyStats, expected_version: u64)
    -> Result<u64, StoreError>;

    /// Daily rows in `[from, to]`, ascending by date.
    async fn load_days(
        &self,
        user_id: &UserId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<DailyStats>, StoreError>;
}
