//! In-memory store implementations
//!
//! Used by tests and as the composition default. All of them share the
//! same versioned-map shape: a `RwLock<HashMap>` of documents with a
//! compare-and-swap save, which is exactly the contract a document store
//! with optimistic locking provides.

use std::collections::HashMap;
use std::hash::Hash;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::RwLock;

use ascend_models::{
    AchievementId, CourseId, CourseProgress, DailyStats, GradedAttempt, StreakState, TestId,
    UserAchievement, UserId, UserStatSnapshot,
};

use super::{
    AchievementStore, AttemptStore, ProgressStore, StatsStore, StreakStore, Versioned,
};
use crate::error::StoreError;

/// A versioned document map with compare-and-swap saves.
struct VersionedMap<K, V> {
    documents: RwLock<HashMap<K, Versioned<V>>>,
}

impl<K, V> VersionedMap<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    fn new() -> Self {
        Self {
            documents: RwLock::new(HashMap::new()),
        }
    }

    async fn load(&self, key: &K) -> Option<Versioned<V>> {
        self.documents.read().await.get(key).cloned()
    }

    /// Save iff the stored version matches `expected`. Version 0 means
    /// "create"; it conflicts when the document already exists.
    async fn save(&self, key: K, value: V, expected: u64) -> Result<u64, StoreError> {
        let mut documents = self.documents.write().await;
        let current = documents.get(&key).map(|v| v.version).unwrap_or(0);
        if current != expected {
            return Err(StoreError::VersionConflict {
                expected,
                found: current,
            });
        }
        let version = current + 1;
        documents.insert(key, Versioned { version, value });
        Ok(version)
    }
}

/// In-memory implementation of ProgressStore.
pub struct MemoryProgressStore {
    map: VersionedMap<(UserId, CourseId), CourseProgress>,
}

impl MemoryProgressStore {
    pub fn new() -> Self {
        Self {
            map: VersionedMap::new(),
        }
    }
}

impl Default for MemoryProgressStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProgressStore for MemoryProgressStore {
    async fn load(
        &self,
        user_id: &UserId,
        course_id: &CourseId,
    ) -> Result<Option<Versioned<CourseProgress>>, StoreError> {
        Ok(self.map.load(&(user_id.clone(), course_id.clone())).await)
    }

    async fn save(
        &self,
        progress: &CourseProgress,
        expected_version: u64,
    ) -> Result<u64, StoreError> {
        self.map
            .save(
                (progress.user_id.clone(), progress.course_id.clone()),
                progress.clone(),
                expected_version,
            )
            .await
    }
}

/// In-memory implementation of StreakStore.
pub struct MemoryStreakStore {
    map: VersionedMap<UserId, StreakState>,
}

impl MemoryStreakStore {
    pub fn new() -> Self {
        Self {
            map: VersionedMap::new(),
        }
    }
}

impl Default for MemoryStreakStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StreakStore for MemoryStreakStore {
    async fn load(&self, user_id: &UserId) -> Result<Option<Versioned<StreakState>>, StoreError> {
        Ok(self.map.load(user_id).await)
    }

    async fn save(&self, state: &StreakState, expected_version: u64) -> Result<u64, StoreError> {
        self.map
            .save(state.user_id.clone(), state.clone(), expected_version)
            .await
    }
}

/// In-memory implementation of AchievementStore.
pub struct MemoryAchievementStore {
    map: VersionedMap<(UserId, AchievementId), UserAchievement>,
}

impl MemoryAchievementStore {
    pub fn new() -> Self {
        Self {
            map: VersionedMap::new(),
        }
    }
}

impl Default for MemoryAchievementStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AchievementStore for MemoryAchievementStore {
    async fn load(
        &self,
        user_id: &UserId,
        achievement_id: &AchievementId,
    ) -> Result<Option<Versioned<UserAchievement>>, StoreError> {
        Ok(self
            .map
            .load(&(user_id.clone(), achievement_id.clone()))
            .await)
    }

    async fn load_user(&self, user_id: &UserId) -> Result<Vec<UserAchievement>, StoreError> {
        let documents = self.map.documents.read().await;
        let mut states: Vec<UserAchievement> = documents
            .iter()
            .filter(|((user, _), _)| user == user_id)
            .map(|(_, v)| v.value.clone())
            .collect();
        states.sort_by(|a, b| a.achievement_id.cmp(&b.achievement_id));
        Ok(states)
    }

    async fn save(
        &self,
        state: &UserAchievement,
        expected_version: u64,
    ) -> Result<u64, StoreError> {
        self.map
            .save(
                (state.user_id.clone(), state.achievement_id.clone()),
                state.clone(),
                expected_version,
            )
            .await
    }
}

/// In-memory implementation of AttemptStore.
#[derive(Default)]
pub struct MemoryAttemptStore {
    attempts: RwLock<Vec<GradedAttempt>>,
}

impl MemoryAttemptStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AttemptStore for MemoryAttemptStore {
    async fn prior_scores(&self, test_id: &TestId) -> Result<Vec<f64>, StoreError> {
        Ok(self
            .attempts
            .read()
            .await
            .iter()
            .filter(|a| &a.test_id == test_id)
            .map(|a| a.total_score)
            .collect())
    }

    async fn next_attempt_number(
        &self,
        user_id: &UserId,
        test_id: &TestId,
    ) -> Result<u32, StoreError> {
        let count = self
            .attempts
            .read()
            .await
            .iter()
            .filter(|a| &a.user_id == user_id && &a.test_id == test_id)
            .count();
        Ok(count as u32 + 1)
    }

    async fn record(&self, attempt: &GradedAttempt) -> Result<(), StoreError> {
        self.attempts.write().await.push(attempt.clone());
        Ok(())
    }
}

/// In-memory implementation of StatsStore.
pub struct MemoryStatsStore {
    snapshots: VersionedMap<UserId, UserStatSnapshot>,
    days: VersionedMap<(UserId, NaiveDate), DailyStats>,
}

impl MemoryStatsStore {
    pub fn new() -> Self {
        Self {
            snapshots: VersionedMap::new(),
            days: VersionedMap::new(),
        }
    }
}

impl Default for MemoryStatsStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StatsStore for MemoryStatsStore {
    async fn load_snapshot(
        &self,
        user_id: &UserId,
    ) -> Result<Option<Versioned<UserStatSnapshot>>, StoreError> {
        Ok(self.snapshots.load(user_id).await)
    }

    async fn save_snapshot(
        &self,
        snapshot: &UserStatSnapshot,
        expected_version: u64,
    ) -> Result<u64, StoreError> {
        self.snapshots
            .save(snapshot.user_id.clone(), snapshot.clone(), expected_version)
            .await
    }

    async fn load_day(
        &self,
        user_id: &UserId,
        date: NaiveDate,
    ) -> Result<Option<Versioned<DailyStats>>, StoreError> {
        Ok(self.days.load(&(user_id.clone(), date)).await)
    }

    async fn save_day(
        &self,
        stats: &DailyStats,
        expected_version: u64,
    ) -> Result<u64, StoreError> {
        self.days
            .save(
                (stats.user_id.clone(), stats.date),
                stats.clone(),
                expected_version,
            )
            .await
    }

    async fn load_days(
        &self,
        user_id: &UserId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<DailyStats>, StoreError> {
        let documents = self.days.documents.read().await;
        let mut rows: Vec<DailyStats> = documents
            .iter()
            .filter(|((user, date), _)| user == user_id && *date >= from && *date <= to)
            .map(|(_, v)| v.value.clone())
            .collect();
        rows.sort_by_key(|r| r.date);
        Ok(rows)
    }
}
