//! Grace-day budget policy.
//!
//! Runs after every streak transition and recomputes `max_grace_days` from
//! the new streak length. Kept apart from the transition itself so either
//! step can be tested on its own.

use serde::{Deserialize, Serialize};

use super::engine::StreakTransition;
use super::state::StreakState;

/// Length of a streak "week" for budget growth and perfect-week bonuses.
pub const DAYS_PER_WEEK: u32 = 7;

/// How the grace-day budget grows with a streak.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GracePolicy {
    /// Grace days every streak starts with.
    #[serde(default = "default_base_grace_days")]
    pub base_grace_days: u32,
    /// Extra grace days earned per full week of streak.
    #[serde(default = "default_weekly_allowance")]
    pub weekly_allowance: u32,
    /// Upper bound for `max_grace_days`.
    #[serde(default = "default_max_grace_days_cap")]
    pub max_grace_days_cap: u32,
}

fn default_base_grace_days() -> u32 {
    1
}
fn default_weekly_allowance() -> u32 {
    1
}
fn default_max_grace_days_cap() -> u32 {
    5
}

impl Default for GracePolicy {
    fn default() -> Self {
        Self {
            base_grace_days: default_base_grace_days(),
            weekly_allowance: default_weekly_allowance(),
            max_grace_days_cap: default_max_grace_days_cap(),
        }
    }
}

impl GracePolicy {
    /// A policy with a fixed budget that never grows.
    pub fn fixed(grace_days: u32) -> Self {
        Self {
            base_grace_days: grace_days,
            weekly_allowance: 0,
            max_grace_days_cap: grace_days,
        }
    }

    /// Budget a brand-new streak starts with.
    pub fn initial_budget(&self) -> u32 {
        self.base_grace_days.min(self.max_grace_days_cap)
    }

    /// Recompute the grace budget of `state` after `transition`.
    ///
    /// A perfect-week bonus is granted only when the transition advanced the
    /// streak onto a multiple of seven without any grace day spent, so
    /// applying the policy twice to the same update grants it once.
    pub fn apply(&self, mut state: StreakState, transition: &StreakTransition) -> StreakState {
        if transition.advanced()
            && state.current_streak > 0
            && state.current_streak % DAYS_PER_WEEK == 0
            && state.grace_days_used == 0
        {
            state.bonus_grace_days += 1;
            tracing::debug!(
                key = %state.key(),
                streak = state.current_streak,
                bonus = state.bonus_grace_days,
                "perfect week bonus granted"
            );
        }

        let earned = (state.current_streak / DAYS_PER_WEEK).saturating_mul(self.weekly_allowance);
        let budget = self
            .base_grace_days
            .saturating_add(earned)
            .saturating_add(state.bonus_grace_days)
            .min(self.max_grace_days_cap);

        state.max_grace_days = budget.max(state.grace_days_used);
        state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::streak::state::StreakKey;
    use chrono::NaiveDate;

    fn state_with_streak(current: u32, used: u32) -> StreakState {
        let day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let mut state = StreakState::start(&StreakKey::new("u1", "walk"), day, 1);
        state.current_streak = current;
        state.longest_streak = current;
        state.grace_days_used = used;
        state
    }

    #[test]
    fn test_budget_unchanged_before_first_week() {
        let policy = GracePolicy::default();
        let state = policy.apply(state_with_streak(6, 0), &StreakTransition::Extended);
        assert_eq!(state.max_grace_days, 1);
        assert_eq!(state.bonus_grace_days, 0);
    }

    #[test]
    fn test_perfect_week_grants_bonus_and_weekly_allowance() {
        let policy = GracePolicy::default();
        let state = policy.apply(state_with_streak(7, 0), &StreakTransition::Extended);
        // base 1 + one week earned + perfect week bonus
        assert_eq!(state.bonus_grace_days, 1);
        assert_eq!(state.max_grace_days, 3);
    }

    #[test]
    fn test_no_bonus_when_grace_was_used() {
        let policy = GracePolicy::default();
        let state = policy.apply(
            state_with_streak(7, 1),
            &StreakTransition::Bridged {
                grace_days_consumed: 1,
            },
        );
        assert_eq!(state.bonus_grace_days, 0);
        assert_eq!(state.max_grace_days, 2);
    }

    #[test]
    fn test_reapplying_does_not_double_bonus() {
        let policy = GracePolicy::default();
        let once = policy.apply(state_with_streak(7, 0), &StreakTransition::Extended);
        let twice = policy.apply(once.clone(), &StreakTransition::GraceApplied);
        assert_eq!(once.bonus_grace_days, twice.bonus_grace_days);
        assert_eq!(once.max_grace_days, twice.max_grace_days);
    }

    #[test]
    fn test_budget_is_capped() {
        let policy = GracePolicy::default();
        let state = policy.apply(state_with_streak(70, 0), &StreakTransition::Extended);
        assert_eq!(state.max_grace_days, 5);
    }

    #[test]
    fn test_budget_never_below_used() {
        let policy = GracePolicy::fixed(1);
        let state = policy.apply(
            state_with_streak(3, 2),
            &StreakTransition::Bridged {
                grace_days_consumed: 1,
            },
        );
        assert_eq!(state.max_grace_days, 2);
        assert_eq!(state.grace_days_available(), 0);
    }

    #[test]
    fn test_fixed_policy_never_grows() {
        let policy = GracePolicy::fixed(2);
        let state = policy.apply(state_with_streak(28, 0), &StreakTransition::Extended);
        assert_eq!(state.max_grace_days, 2);
    }
}
