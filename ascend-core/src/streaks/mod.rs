//! Streak tracking - consecutive active days in the user's timezone
//!
//! Day comparison happens after shifting the instant into the user's
//! configured offset: a session crossing midnight UTC but not local
//! midnight must not break a streak.

use chrono::{DateTime, Days, FixedOffset, Utc};
use tracing::debug;

use ascend_models::StreakState;

/// How one activity changed the streak.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreakChange {
    /// Repeat activity on an already-counted day.
    Unchanged,
    /// First activity ever, or activity after a gap of more than one day.
    Started,
    /// Consecutive-day activity.
    Extended,
}

/// Record one activity instant against the streak state.
///
/// Idempotent for same-day repeats; the state mutates at most once per
/// local calendar day.
pub fn record_activity(
    state: &mut StreakState,
    occurred_at: DateTime<Utc>,
    timezone: FixedOffset,
) -> StreakChange {
    let day = occurred_at.with_timezone(&timezone).date_naive();

    let change = match state.last_active_date {
        Some(last) if day == last => StreakChange::Unchanged,
        // Out-of-order delivery of an older event; never regress.
        Some(last) if day < last => StreakChange::Unchanged,
        Some(last) if Some(day) == last.checked_add_days(Days::new(1)) => {
            state.current_streak += 1;
            StreakChange::Extended
        }
        _ => {
            state.current_streak = 1;
            StreakChange::Started
        }
    };

    if change != StreakChange::Unchanged {
        state.longest_streak = state.longest_streak.max(state.current_streak);
        state.last_active_date = Some(day);
        debug!(
            user = %state.user_id,
            day = %day,
            current = state.current_streak,
            "streak updated"
        );
    }
    change
}
