//! ascend-core: Core library for the ascend learning engine
//!
//! This crate derives a learner's completion percentage, mastery level,
//! streaks, and unlocked achievements from a stream of discrete activity
//! events, and keeps the aggregates consistent across topic → concept →
//! course → learning path and across daily/weekly/monthly rollups:
//!
//! - **Event ingest** - [`EventIngest`] validates and normalizes
//!   submissions against the course structure
//! - **Progress aggregation** - [`progress::apply_event`] rolls one event
//!   up through topic, concept, and course records
//! - **Mastery scoring** - [`mastery::compute_mastery`], a pure blend of
//!   completion and performance, recomputed on every read
//! - **Streak tracking** - [`streaks::record_activity`] with per-user
//!   timezone normalization
//! - **Achievement evaluation** - [`achievements::evaluate`] over typed
//!   criteria, with progressive milestone steps
//! - **Assessment scoring** - [`assessment::grade_attempt`] with a
//!   percentile snapshot against prior attempts
//! - **Orchestration** - [`LearningEngine`] wires the pipeline over the
//!   repository traits with per-document optimistic locking
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use ascend_core::engine::{EngineDeps, LearningEngine};
//! use ascend_core::catalog::MemoryCatalog;
//! use ascend_core::history::MemoryHistory;
//! use ascend_core::notify::LogNotifier;
//! use ascend_core::store::{
//!     MemoryAchievementStore, MemoryAttemptStore, MemoryProgressStore, MemoryStatsStore,
//!     MemoryStreakStore,
//! };
//! use ascend_core::EngineConfig;
//!
//! let deps = EngineDeps {
//!     catalog: Arc::new(MemoryCatalog::new()),
//!     progress: Arc::new(MemoryProgressStore::new()),
//!     streaks: Arc::new(MemoryStreakStore::new()),
//!     achievements: Arc::new(MemoryAchievementStore::new()),
//!     attempts: Arc::new(MemoryAttemptStore::new()),
//!     stats: Arc::new(MemoryStatsStore::new()),
//!     history: Arc::new(MemoryHistory::new()),
//!     notifier: Arc::new(LogNotifier),
//! };
//! let engine = LearningEngine::new(deps, Vec::new(), EngineConfig::default()).unwrap();
//! ```

pub mod achievements;
pub mod analytics;
pub mod assessment;
pub mod catalog;
pub mod config;
pub mod engine;
pub mod error;
pub mod history;
pub mod ingest;
pub mod mastery;
pub mod notify;
pub mod paths;
pub mod progress;
pub mod store;
pub mod streaks;

// Re-export key types for convenience
pub use achievements::{StatContext, Unlock};
pub use catalog::{CourseCatalog, MemoryCatalog};
pub use config::EngineConfig;
pub use engine::{ApplyOutcome, EngineDeps, LearningEngine};
pub use error::{EngineError, NotFoundError, StoreError, ValidationError};
pub use history::{ConceptPerformance, MemoryHistory, PerformanceHistory};
pub use ingest::EventIngest;
pub use mastery::{MasteryBand, MasteryScore};
pub use notify::{EngineNotification, LogNotifier, MemoryNotifier, Notifier};
pub use progress::ProgressDelta;
pub use store::{
    AchievementStore, AttemptStore, MemoryAchievementStore, MemoryAttemptStore,
    MemoryProgressStore, MemoryStatsStore, MemoryStreakStore, ProgressStore, StatsStore,
    StreakStore, Versioned,
};
pub use streaks::StreakChange;
