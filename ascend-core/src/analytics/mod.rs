//! Daily and periodic activity rollups
//!
//! Each accepted event folds into the user's row for its local calendar
//! day; weekly and monthly rollups are derived from the daily rows on
//! demand. The daily rows also back timeframe-scoped achievement criteria.

use chrono::{Datelike, Days, NaiveDate};

use ascend_models::{ActivityDetail, ActivityEvent, DailyStats, Period, PeriodStats, UserId};

use crate::progress::ProgressDelta;

/// Fold one event (and what it changed) into a daily row.
///
/// Counting is event-based: replays of the same completion event are
/// guarded upstream by the aggregator's delta, which reports a concept or
/// course completion only the first time it happens.
pub fn fold_event(daily: &mut DailyStats, event: &ActivityEvent, delta: &ProgressDelta) {
    daily.time_spent_seconds += event.time_spent_seconds;

    match &event.detail {
        ActivityDetail::Video { .. } => {
            if event.completed {
                daily.videos_watched += 1;
            }
        }
        ActivityDetail::Article { .. } => {
            if event.completed {
                daily.articles_read += 1;
            }
        }
        ActivityDetail::Coding { solved, .. } => {
            if *solved {
                daily.problems_solved += 1;
            }
        }
        ActivityDetail::Quiz { score, passed } => {
            daily.quizzes_taken += 1;
            daily.quiz_score_total += score;
            daily.best_quiz_score = daily.best_quiz_score.max(*score);
            if *passed {
                daily.quizzes_passed += 1;
            }
        }
    }

    daily.concepts_completed += delta.concepts_completed.len() as u32;
    if delta.course_completed {
        daily.courses_completed += 1;
    }
}

/// The date range a period covers, relative to the user-local `today`.
pub fn period_range(period: Period, today: NaiveDate) -> (NaiveDate, NaiveDate) {
    match period {
        Period::Week => (
            today.checked_sub_days(Days::new(6)).unwrap_or(NaiveDate::MIN),
            today,
        ),
        Period::Month => (today.with_day(1).unwrap_or(today), today),
    }
}

/// Aggregate daily rows into a periodic rollup ending today.
pub fn aggregate(
    user_id: UserId,
    period: Period,
    days: &[DailyStats],
    today: NaiveDate,
) -> PeriodStats {
    let (start_date, end_date) = period_range(period, today);
    let window: Vec<&DailyStats> = days
        .iter()
        .filter(|d| d.date >= start_date && d.date <= end_date)
        .collect();

    let quizzes_taken: u32 = window.iter().map(|d| d.quizzes_taken).sum();
    let quiz_score_total: f64 = window.iter().map(|d| d.quiz_score_total).sum();

    PeriodStats {
        user_id,
        period,
        start_date,
        end_date,
        active_days: window.len() as u32,
        time_spent_seconds: window.iter().map(|d| d.time_spent_seconds).sum(),
        videos_watched: window.iter().map(|d| d.videos_watched).sum(),
        articles_read: window.iter().map(|d| d.articles_read).sum(),
        problems_solved: window.iter().map(|d| d.problems_solved).sum(),
        quizzes_taken,
        concepts_completed: window.iter().map(|d| d.concepts_completed).sum(),
        courses_completed: window.iter().map(|d| d.courses_completed).sum(),
        average_quiz_score: if quizzes_taken == 0 {
            0.0
        } else {
            quiz_score_total / quizzes_taken as f64
        },
    }
}
