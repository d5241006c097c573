//! Daily-activity streak state.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::types::UserId;

/// A user's streak of consecutive active calendar days.
///
/// `last_active_date` is a date in the user's configured timezone; the
/// tracker normalizes instants before comparing. Mutated at most once per
/// calendar day per user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakState {
    pub user_id: UserId,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub last_active_date: Option<NaiveDate>,
}

impl StreakState {
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            current_streak: 0,
            longest_streak: 0,
            last_active_date: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_streak_is_empty() {
        let s = StreakState::new(UserId::new("u1"));
        assert_eq!(s.current_streak, 0);
        assert_eq!(s.longest_streak, 0);
        assert!(s.last_active_date.is_none());
    }
}
