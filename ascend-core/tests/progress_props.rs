//! Property-based tests for the progress roll-up.
//!
//! 1. Overall progress stays in [0, 100] and equals the topic-count-
//!    weighted mean for arbitrary topic distributions.
//! 2. Replaying a completion event any number of times is idempotent for
//!    flags while time accumulates linearly.
//!
//! Run with: cargo test --test progress_props

use chrono::Utc;
use proptest::prelude::*;
use uuid::Uuid;

use ascend_core::progress::apply_event;
use ascend_models::{
    ActivityDetail, ActivityEvent, ConceptId, CourseId, CourseProgress, CourseStructure, TopicId,
    UserId,
};

fn structure_with(topic_counts: &[usize]) -> CourseStructure {
    CourseStructure::new(
        CourseId::new("c1"),
        topic_counts.iter().enumerate().map(|(i, &count)| {
            (
                ConceptId::new(format!("concept-{i}")),
                (0..count)
                    .map(|t| TopicId::new(format!("topic-{i}-{t}")))
                    .collect(),
            )
        }),
    )
}

fn completion_event(concept: usize, topic: usize, seconds: u64) -> ActivityEvent {
    ActivityEvent {
        event_id: Uuid::new_v4(),
        user_id: UserId::new("u1"),
        course_id: CourseId::new("c1"),
        concept_id: ConceptId::new(format!("concept-{concept}")),
        topic_id: TopicId::new(format!("topic-{concept}-{topic}")),
        detail: ActivityDetail::Video {
            watch_percentage: 100.0,
        },
        completed: true,
        time_spent_seconds: seconds,
        occurred_at: Utc::now(),
    }
}

proptest! {
    /// For random topic distributions and random completion subsets, the
    /// overall progress is bounded and equals the weighted mean computed
    /// independently.
    #[test]
    fn overall_progress_is_the_topic_weighted_mean(
        topic_counts in prop::collection::vec(1_usize..8, 1..6),
        completion_seed in prop::collection::vec(any::<bool>(), 0..48),
    ) {
        let structure = structure_with(&topic_counts);
        let mut progress =
            CourseProgress::new(UserId::new("u1"), CourseId::new("c1"), Utc::now());

        // Complete a pseudo-random subset of topics
        let mut seed = completion_seed.iter().copied().cycle();
        let mut completed_per_concept = vec![0_usize; topic_counts.len()];
        for (concept, &count) in topic_counts.iter().enumerate() {
            for topic in 0..count {
                if seed.next().unwrap_or(false) {
                    let event = completion_event(concept, topic, 10);
                    apply_event(&mut progress, &structure, &event, Utc::now()).unwrap();
                    completed_per_concept[concept] += 1;
                }
            }
        }

        prop_assert!(progress.overall_progress >= 0.0);
        prop_assert!(progress.overall_progress <= 100.0);

        // Independent computation of the weighted mean
        let total_topics: usize = topic_counts.iter().sum();
        let expected: f64 = topic_counts
            .iter()
            .zip(&completed_per_concept)
            .map(|(&count, &done)| 100.0 * done as f64 / count as f64 * count as f64)
            .sum::<f64>()
            / total_topics as f64;
        prop_assert!((progress.overall_progress - expected).abs() < 1e-9,
            "got {}, expected {}", progress.overall_progress, expected);
    }

    /// A concept is complete exactly when every one of its topics is.
    #[test]
    fn concept_completes_iff_all_topics_do(
        count in 1_usize..8,
        completed in prop::collection::vec(any::<bool>(), 8),
    ) {
        let structure = structure_with(&[count]);
        let mut progress =
            CourseProgress::new(UserId::new("u1"), CourseId::new("c1"), Utc::now());

        let mut all = true;
        for topic in 0..count {
            let done = completed[topic];
            all &= done;
            if done {
                let event = completion_event(0, topic, 1);
                apply_event(&mut progress, &structure, &event, Utc::now()).unwrap();
            }
        }

        match progress.concept(&ConceptId::new("concept-0")) {
            Some(concept) => {
                prop_assert_eq!(concept.completed, all);
                prop_assert_eq!(concept.progress == 100.0, all);
            }
            None => prop_assert!(!all, "no record implies not all topics completed"),
        }
    }

    /// N replays of the same completion leave flags at the one-application
    /// value while time spent sums across all applications.
    #[test]
    fn replay_is_idempotent_for_flags_and_additive_for_time(
        replays in 1_u32..10,
        seconds in 1_u64..1000,
    ) {
        let structure = structure_with(&[2]);
        let mut progress =
            CourseProgress::new(UserId::new("u1"), CourseId::new("c1"), Utc::now());
        let event = completion_event(0, 0, seconds);

        for _ in 0..replays {
            apply_event(&mut progress, &structure, &event, Utc::now()).unwrap();
        }

        let concept = progress.concept(&ConceptId::new("concept-0")).unwrap();
        prop_assert_eq!(concept.progress, 50.0);
        prop_assert!(concept.topics[0].completed);
        prop_assert_eq!(
            concept.topics[0].time_spent_seconds,
            seconds * replays as u64
        );
    }
}
