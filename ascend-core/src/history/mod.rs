//! Performance history - the read-only quiz/problem feed
//!
//! The mastery scorer consumes per-concept quiz scores and problem solve
//! counts through this trait. The engine never writes through it; the
//! feed is owned by whatever records quiz and problem outcomes.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use ascend_models::{ConceptId, UserId};

/// Per-concept performance facts for one user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConceptPerformance {
    /// Scores (0-100) of this concept's quiz attempts, oldest first.
    pub quiz_scores: Vec<f64>,
    pub problems_solved: u32,
    pub problems_attempted: u32,
}

/// Read-only feed of per-concept performance.
#[async_trait]
pub trait PerformanceHistory: Send + Sync {
    /// This user's performance on one concept. Unknown pairs yield the
    /// empty record, which the mastery blend treats as "no data yet".
    async fn concept_performance(
        &self,
        user_id: &UserId,
        concept_id: &ConceptId,
    ) -> ConceptPerformance;
}

/// In-memory implementation of PerformanceHistory.
#[derive(Default)]
pub struct MemoryHistory {
    records: RwLock<HashMap<(UserId, ConceptId), ConceptPerformance>>,
}

impl MemoryHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a quiz score for a concept.
    pub async fn record_quiz_score(&self, user_id: &UserId, concept_id: &ConceptId, score: f64) {
        let mut records = self.records.write().await;
        records
            .entry((user_id.clone(), concept_id.clone()))
            .or_default()
            .quiz_scores
            .push(score);
    }

    /// Record a problem attempt, solved or not.
    pub async fn record_problem(&self, user_id: &UserId, concept_id: &ConceptId, solved: bool) {
        let mut records = self.records.write().await;
        let record = records
            .entry((user_id.clone(), concept_id.clone()))
            .or_default();
        record.problems_attempted += 1;
        if solved {
            record.problems_solved += 1;
        }
    }
}

#[async_trait]
impl PerformanceHistory for MemoryHistory {
    async fn concept_performance(
        &self,
        user_id: &UserId,
        concept_id: &ConceptId,
    ) -> ConceptPerformance {
        self.records
            .read()
            .await
            .get(&(user_id.clone(), concept_id.clone()))
            .cloned()
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unknown_pair_yields_empty_record() {
        let history = MemoryHistory::new();
        let perf = history
            .concept_performance(&UserId::new("u1"), &ConceptId::new("arrays"))
            .await;
        assert_eq!(perf, ConceptPerformance::default());
    }

    #[tokio::test]
    async fn records_accumulate_per_pair() {
        let history = MemoryHistory::new();
        let user = UserId::new("u1");
        let concept = ConceptId::new("arrays");

        history.record_quiz_score(&user, &concept, 80.0).await;
        history.record_quiz_score(&user, &concept, 90.0).await;
        history.record_problem(&user, &concept, true).await;
        history.record_problem(&user, &concept, false).await;

        let perf = history.concept_performance(&user, &concept).await;
        assert_eq!(perf.quiz_scores, vec![80.0, 90.0]);
        assert_eq!(perf.problems_solved, 1);
        assert_eq!(perf.problems_attempted, 2);

        // Other concepts are unaffected
        let other = history
            .concept_performance(&user, &ConceptId::new("graphs"))
            .await;
        assert_eq!(other, ConceptPerformance::default());
    }
}
