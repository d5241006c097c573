//! Notification emitter - fire-and-forget unlock/completion signals
//!
//! The engine announces unlocked achievements and completed items through
//! this trait. Delivery is best-effort: a failing notifier must never roll
//! back the progress mutation that triggered it, so the trait is
//! infallible and implementations swallow (and log) their own errors.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::info;

use ascend_models::{AchievementId, ConceptId, CourseId, UserId};

/// An outbound notification about something the user just earned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EngineNotification {
    AchievementUnlocked {
        achievement_id: AchievementId,
        title: String,
        /// Progressive step number, when the unlock is one milestone.
        step: Option<u32>,
        experience_points: u32,
        badge: Option<String>,
    },

    ConceptCompleted {
        course_id: CourseId,
        concept_id: ConceptId,
    },

    CourseCompleted { course_id: CourseId },
}

/// Fire-and-forget notification sink.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, user_id: &UserId, notification: EngineNotification);
}

/// Notifier that only logs. The composition default when no delivery
/// channel is wired up.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, user_id: &UserId, notification: EngineNotification) {
        info!(user = %user_id, ?notification, "notification");
    }
}

/// In-memory notifier that records everything sent, for tests.
#[derive(Default)]
pub struct MemoryNotifier {
    sent: RwLock<Vec<(UserId, EngineNotification)>>,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything notified so far, in order.
    pub async fn sent(&self) -> Vec<(UserId, EngineNotification)> {
        self.sent.read().await.clone()
    }
}

#[async_trait]
impl Notifier for MemoryNotifier {
    async fn notify(&self, user_id: &UserId, notification: EngineNotification) {
        self.sent
            .write()
            .await
            .push((user_id.clone(), notification));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_notifier_records_in_order() {
        let notifier = MemoryNotifier::new();
        let user = UserId::new("u1");

        notifier
            .notify(
                &user,
                EngineNotification::CourseCompleted {
                    course_id: CourseId::new("c1"),
                },
            )
            .await;
        notifier
            .notify(
                &user,
                EngineNotification::ConceptCompleted {
                    course_id: CourseId::new("c1"),
                    concept_id: ConceptId::new("arrays"),
                },
            )
            .await;

        let sent = notifier.sent().await;
        assert_eq!(sent.len(), 2);
        assert!(matches!(
            sent[0].1,
            EngineNotification::CourseCompleted { .. }
        ));
    }

    #[test]
    fn notification_serializes_with_type_tag() {
        let n = EngineNotification::AchievementUnlocked {
            achievement_id: AchievementId::new("a1"),
            title: "First Steps".into(),
            step: Some(2),
            experience_points: 100,
            badge: None,
        };
        let json = serde_json::to_string(&n).unwrap();
        assert!(json.contains("\"type\":\"achievement_unlocked\""));
    }
}
