//! Streak state and the completion events that drive it.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One day's outcome for a single goal, as recorded by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionEvent {
    pub user_id: String,
    pub goal_id: String,
    pub date: NaiveDate,
    /// Whether the goal was met that day. Missed days reach the streak
    /// engine only as gaps between achieved dates.
    pub achieved: bool,
}

impl CompletionEvent {
    /// Convenience constructor for an achieved day.
    pub fn achieved(user_id: impl Into<String>, goal_id: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            user_id: user_id.into(),
            goal_id: goal_id.into(),
            date,
            achieved: true,
        }
    }

    /// Convenience constructor for a missed day.
    pub fn missed(user_id: impl Into<String>, goal_id: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            achieved: false,
            ..Self::achieved(user_id, goal_id, date)
        }
    }

    pub fn key(&self) -> StreakKey {
        StreakKey::new(&self.user_id, &self.goal_id)
    }
}

/// Identifies the streak of one user on one goal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StreakKey {
    pub user_id: String,
    pub goal_id: String,
}

impl StreakKey {
    pub fn new(user_id: impl Into<String>, goal_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            goal_id: goal_id.into(),
        }
    }
}

impl fmt::Display for StreakKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.user_id, self.goal_id)
    }
}

/// Streak counters for one (user, goal) pair.
///
/// Created on the first achieved day and afterwards only replaced by the
/// engine. After every engine call `current_streak <= longest_streak` and
/// `grace_days_used <= max_grace_days`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakState {
    pub user_id: String,
    pub goal_id: String,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub last_completed_date: NaiveDate,
    pub grace_days_used: u32,
    pub max_grace_days: u32,
    pub streak_start_date: NaiveDate,
    /// Perfect-week bonus days earned during the current streak.
    #[serde(default)]
    pub bonus_grace_days: u32,
}

impl StreakState {
    /// A fresh one-day streak starting on `date`.
    pub fn start(key: &StreakKey, date: NaiveDate, max_grace_days: u32) -> Self {
        Self {
            user_id: key.user_id.clone(),
            goal_id: key.goal_id.clone(),
            current_streak: 1,
            longest_streak: 1,
            last_completed_date: date,
            grace_days_used: 0,
            max_grace_days,
            streak_start_date: date,
            bonus_grace_days: 0,
        }
    }

    pub fn key(&self) -> StreakKey {
        StreakKey::new(&self.user_id, &self.goal_id)
    }

    /// Grace days still available to bridge a gap.
    pub fn grace_days_available(&self) -> u32 {
        self.max_grace_days.saturating_sub(self.grace_days_used)
    }

    /// Whole days between the last completion and `date` (negative when
    /// `date` lies before it).
    pub fn days_since_last(&self, date: NaiveDate) -> i64 {
        (date - self.last_completed_date).num_days()
    }

    /// Whether a completion on `date` would extend this streak rather than
    /// reset it.
    pub fn can_extend_on(&self, date: NaiveDate) -> bool {
        let diff = self.days_since_last(date);
        diff >= 1 && diff <= 1 + i64::from(self.grace_days_available())
    }

    /// Whether the streak is still alive as of `today`: either already
    /// completed today, or extendable by a completion today.
    pub fn is_active_on(&self, today: NaiveDate) -> bool {
        self.current_streak > 0 && (self.days_since_last(today) == 0 || self.can_extend_on(today))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_start_state() {
        let key = StreakKey::new("u1", "walk");
        let state = StreakState::start(&key, date(2024, 1, 1), 1);
        assert_eq!(state.current_streak, 1);
        assert_eq!(state.longest_streak, 1);
        assert_eq!(state.streak_start_date, date(2024, 1, 1));
        assert_eq!(state.grace_days_available(), 1);
        assert_eq!(state.key(), key);
    }

    #[test]
    fn test_is_active_on() {
        let key = StreakKey::new("u1", "walk");
        let state = StreakState::start(&key, date(2024, 1, 1), 1);

        assert!(state.is_active_on(date(2024, 1, 1)));
        assert!(state.is_active_on(date(2024, 1, 2)));
        // One missed day, one grace day left
        assert!(state.is_active_on(date(2024, 1, 3)));
        assert!(!state.is_active_on(date(2024, 1, 4)));
        assert!(!state.is_active_on(date(2023, 12, 31)));
    }

    #[test]
    fn test_missed_event_constructor() {
        let event = CompletionEvent::missed("u1", "walk", date(2024, 1, 1));
        assert!(!event.achieved);
        assert_eq!(event.key().to_string(), "u1/walk");
    }

    #[test]
    fn test_state_deserializes_without_bonus_field() {
        let json = r#"{
            "user_id": "u1", "goal_id": "walk",
            "current_streak": 3, "longest_streak": 5,
            "last_completed_date": "2024-01-03",
            "grace_days_used": 0, "max_grace_days": 1,
            "streak_start_date": "2024-01-01"
        }"#;
        let state: StreakState = serde_json::from_str(json).unwrap();
        assert_eq!(state.bonus_grace_days, 0);
        assert_eq!(state.longest_streak, 5);
    }
}
