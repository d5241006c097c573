//! Assessment scoring - grading mock-test attempts
//!
//! Grading is binary per question: exact-set-match for objective kinds,
//! all-test-cases-pass for coding. Percentile is frozen at submission
//! against the prior attempts on the same test; earlier attempts are
//! never restated.

use chrono::{DateTime, Utc};
use tracing::debug;

use ascend_models::{
    AttemptAnalysis, GradedAttempt, GradedResponse, MockTest, Question, QuestionBody, Response,
    ResponseAnswer, TopicPerformance, UserId,
};

const STRENGTH_ACCURACY: f64 = 70.0;
const WEAKNESS_ACCURACY: f64 = 50.0;

/// Grade one attempt against a validated test definition.
///
/// Unanswered questions earn zero. `prior_scores` is the distribution of
/// all previously completed attempts on this test, for the percentile
/// snapshot.
pub fn grade_attempt(
    test: &MockTest,
    responses: &[Response],
    prior_scores: &[f64],
    user_id: UserId,
    attempt_number: u32,
    now: DateTime<Utc>,
) -> GradedAttempt {
    let mut graded = Vec::with_capacity(test.questions.len());
    let mut earned = 0u32;

    for question in &test.questions {
        let response = responses.iter().find(|r| r.question_id == question.id);
        let correct = response.is_some_and(|r| is_correct(question, r));
        let points_earned = if correct { question.points } else { 0 };
        earned += points_earned;
        graded.push(GradedResponse {
            question_id: question.id.clone(),
            correct,
            points_earned,
            max_points: question.points,
        });
    }

    let max = test.max_points();
    let total_score = if max == 0 {
        0.0
    } else {
        100.0 * earned as f64 / max as f64
    };
    let passed = total_score >= test.passing_score;
    let percentile = percentile_of(total_score, prior_scores);

    debug!(
        test = %test.id,
        user = %user_id,
        attempt_number,
        total_score,
        percentile,
        "attempt graded"
    );

    GradedAttempt {
        user_id,
        test_id: test.id.clone(),
        attempt_number,
        analysis: analyze(test, &graded),
        responses: graded,
        total_score,
        passed,
        percentile,
        submitted_at: now,
    }
}

/// Percentile of a score within the prior distribution: the share of
/// prior attempts with a strictly lower score. The first attempt on a
/// test tops the empty distribution.
pub fn percentile_of(score: f64, prior_scores: &[f64]) -> f64 {
    if prior_scores.is_empty() {
        return 100.0;
    }
    let lower = prior_scores.iter().filter(|&&s| s < score).count();
    100.0 * lower as f64 / prior_scores.len() as f64
}

fn is_correct(question: &Question, response: &Response) -> bool {
    match (&question.body, &response.answer) {
        (
            QuestionBody::Mcq { correct_answers, .. }
            | QuestionBody::MultipleSelect { correct_answers, .. },
            ResponseAnswer::Selected { indexes },
        ) => indexes == correct_answers,

        (QuestionBody::TrueFalse { answer }, ResponseAnswer::Boolean { answer: given }) => {
            answer == given
        }

        (QuestionBody::Coding { test_cases }, ResponseAnswer::Code { test_results, .. }) => {
            // Every case counts, hidden or visible; a missing result set
            // cannot be correct.
            test_results.len() == test_cases.len() && test_results.iter().all(|r| r.passed)
        }

        // A response of the wrong shape for its question is wrong.
        _ => false,
    }
}

fn analyze(test: &MockTest, graded: &[GradedResponse]) -> AttemptAnalysis {
    let mut topics: Vec<TopicPerformance> = Vec::new();

    for (question, response) in test.questions.iter().zip(graded) {
        let Some(topic) = &question.topic else {
            continue;
        };
        let entry = match topics.iter_mut().find(|t| &t.topic == topic) {
            Some(entry) => entry,
            None => {
                topics.push(TopicPerformance {
                    topic: topic.clone(),
                    attempted: 0,
                    correct: 0,
                    accuracy: 0.0,
                });
                topics.last_mut().expect("just pushed")
            }
        };
        entry.attempted += 1;
        if response.correct {
            entry.correct += 1;
        }
    }

    for entry in &mut topics {
        entry.accuracy = 100.0 * entry.correct as f64 / entry.attempted as f64;
    }

    let strengths = topics
        .iter()
        .filter(|t| t.accuracy >= STRENGTH_ACCURACY)
        .map(|t| t.topic.clone())
        .collect();
    let weaknesses = topics
        .iter()
        .filter(|t| t.accuracy < WEAKNESS_ACCURACY)
        .map(|t| t.topic.clone())
        .collect();

    AttemptAnalysis {
        topics,
        strengths,
        weaknesses,
    }
}
