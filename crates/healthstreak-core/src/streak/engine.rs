//! Streak state machine.
//!
//! Turns one chronological completion into an updated [`StreakState`],
//! bridging short gaps with grace days instead of always resetting to zero.
//! Each call is a pure function of the prior state and the completion date;
//! the host serializes calls per key.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::policy::GracePolicy;
use super::state::{StreakKey, StreakState};

/// Why a streak went back to one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum ResetReason {
    /// More days were missed than the grace budget could cover.
    GapExceedsGrace { days_missed: u32, grace_available: u32 },
    /// Completion dated on or before the last completion.
    NonChronological { days_diff: i64 },
}

/// What a single engine step did to a streak.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum StreakTransition {
    /// First completion for this key.
    Started,
    /// Completion on the day after the last one.
    Extended,
    /// Gap covered by grace days; the streak still advances by one.
    Bridged { grace_days_consumed: u32 },
    /// Streak restarted at one.
    Reset { reason: ResetReason },
    /// A missed day was bridged manually without advancing the streak.
    GraceApplied,
}

impl StreakTransition {
    /// Whether the streak counter went up.
    pub fn advanced(&self) -> bool {
        matches!(
            self,
            StreakTransition::Started | StreakTransition::Extended | StreakTransition::Bridged { .. }
        )
    }
}

/// Result of one engine step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakUpdate {
    pub state: StreakState,
    pub transition: StreakTransition,
}

/// Streak state machine configured with a grace policy.
#[derive(Debug, Clone, Default)]
pub struct StreakEngine {
    policy: GracePolicy,
}

impl StreakEngine {
    /// Create an engine with the default grace policy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an engine with a custom grace policy.
    pub fn with_policy(policy: GracePolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &GracePolicy {
        &self.policy
    }

    /// Apply one completion and return the new state.
    ///
    /// Duplicate or out-of-order dates reset the streak rather than fail.
    pub fn record_completion(
        &self,
        prior: Option<&StreakState>,
        key: &StreakKey,
        completion_date: NaiveDate,
    ) -> StreakState {
        self.step(prior, key, completion_date).state
    }

    /// Apply one completion, returning the new state together with the
    /// transition taken.
    pub fn step(
        &self,
        prior: Option<&StreakState>,
        key: &StreakKey,
        completion_date: NaiveDate,
    ) -> StreakUpdate {
        let (state, transition) = self.advance(prior, key, completion_date);
        let state = self.policy.apply(state, &transition);
        StreakUpdate { state, transition }
    }

    /// The transition step alone: advances or resets the counters and spends
    /// grace days, but leaves the budget as it was.
    pub fn advance(
        &self,
        prior: Option<&StreakState>,
        key: &StreakKey,
        completion_date: NaiveDate,
    ) -> (StreakState, StreakTransition) {
        let Some(prior) = prior else {
            tracing::debug!(%key, date = %completion_date, "streak started");
            return (
                StreakState::start(key, completion_date, self.policy.initial_budget()),
                StreakTransition::Started,
            );
        };

        let mut state = prior.clone();
        let days_diff = prior.days_since_last(completion_date);
        let available = prior.grace_days_available();

        let transition = if days_diff == 1 {
            state.current_streak += 1;
            state.last_completed_date = completion_date;
            StreakTransition::Extended
        } else if days_diff > 1 && days_diff <= 1 + i64::from(available) {
            // Bounded by `available` above, so the cast cannot truncate
            let consumed = (days_diff - 1) as u32;
            state.grace_days_used += consumed;
            state.current_streak += 1;
            state.last_completed_date = completion_date;
            StreakTransition::Bridged {
                grace_days_consumed: consumed,
            }
        } else {
            let reason = if days_diff <= 0 {
                tracing::warn!(
                    %key,
                    date = %completion_date,
                    last = %prior.last_completed_date,
                    "non-chronological completion, resetting streak"
                );
                ResetReason::NonChronological { days_diff }
            } else {
                ResetReason::GapExceedsGrace {
                    days_missed: u32::try_from(days_diff - 1).unwrap_or(u32::MAX),
                    grace_available: available,
                }
            };
            state.current_streak = 1;
            state.grace_days_used = 0;
            state.bonus_grace_days = 0;
            state.streak_start_date = completion_date;
            state.last_completed_date = completion_date;
            StreakTransition::Reset { reason }
        };

        state.longest_streak = state.longest_streak.max(state.current_streak);

        tracing::debug!(
            %key,
            date = %completion_date,
            current = state.current_streak,
            longest = state.longest_streak,
            ?transition,
            "streak advanced"
        );

        (state, transition)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(n: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, n).unwrap()
    }

    fn key() -> StreakKey {
        StreakKey::new("u1", "hydrate")
    }

    fn run(engine: &StreakEngine, days: &[u32]) -> StreakState {
        let key = key();
        let mut state: Option<StreakState> = None;
        for &d in days {
            state = Some(engine.record_completion(state.as_ref(), &key, day(d)));
        }
        state.unwrap()
    }

    #[test]
    fn test_first_completion_starts_streak() {
        let engine = StreakEngine::new();
        let update = engine.step(None, &key(), day(5));
        assert_eq!(update.transition, StreakTransition::Started);
        assert_eq!(update.state.current_streak, 1);
        assert_eq!(update.state.longest_streak, 1);
        assert_eq!(update.state.streak_start_date, day(5));
        assert_eq!(update.state.last_completed_date, day(5));
    }

    #[test]
    fn test_seven_consecutive_days() {
        let engine = StreakEngine::new();
        let state = run(&engine, &[1, 2, 3, 4, 5, 6, 7]);
        assert_eq!(state.current_streak, 7);
        assert_eq!(state.longest_streak, 7);
    }

    #[test]
    fn test_single_missed_day_consumes_grace() {
        let engine = StreakEngine::with_policy(GracePolicy::fixed(1));
        let state = run(&engine, &[1, 2, 4]);
        assert_eq!(state.current_streak, 3);
        assert_eq!(state.grace_days_used, 1);
        assert_eq!(state.last_completed_date, day(4));
        assert_eq!(state.streak_start_date, day(1));
    }

    #[test]
    fn test_gap_beyond_budget_resets() {
        let engine = StreakEngine::with_policy(GracePolicy::fixed(1));
        let state = run(&engine, &[1, 2, 4]);
        assert_eq!(state.grace_days_used, 1);

        // Three missed days, nothing left to bridge them with
        let update = engine.step(Some(&state), &key(), day(8));
        assert_eq!(update.state.current_streak, 1);
        assert_eq!(update.state.grace_days_used, 0);
        assert_eq!(update.state.streak_start_date, day(8));
        assert_eq!(update.state.longest_streak, 3);
        assert!(matches!(
            update.transition,
            StreakTransition::Reset {
                reason: ResetReason::GapExceedsGrace { days_missed: 3, .. }
            }
        ));
    }

    #[test]
    fn test_multi_day_gap_advances_by_one() {
        let engine = StreakEngine::with_policy(GracePolicy::fixed(3));
        let state = run(&engine, &[1, 2, 5]);
        assert_eq!(state.current_streak, 3);
        assert_eq!(state.grace_days_used, 2);
    }

    #[test]
    fn test_duplicate_date_resets() {
        let engine = StreakEngine::new();
        let state = run(&engine, &[1, 2, 3]);
        let update = engine.step(Some(&state), &key(), day(3));
        assert_eq!(update.state.current_streak, 1);
        assert_eq!(update.state.longest_streak, 3);
        assert!(matches!(
            update.transition,
            StreakTransition::Reset {
                reason: ResetReason::NonChronological { days_diff: 0 }
            }
        ));
    }

    #[test]
    fn test_out_of_order_date_resets() {
        let engine = StreakEngine::new();
        let state = run(&engine, &[10, 11]);
        let update = engine.step(Some(&state), &key(), day(9));
        assert_eq!(update.state.current_streak, 1);
        assert_eq!(update.state.last_completed_date, day(9));
    }

    #[test]
    fn test_advance_leaves_budget_untouched() {
        let engine = StreakEngine::new();
        let state = run(&engine, &[1, 2, 3, 4, 5, 6]);
        assert_eq!(state.max_grace_days, 1);

        let (advanced, transition) = engine.advance(Some(&state), &key(), day(7));
        assert_eq!(transition, StreakTransition::Extended);
        assert_eq!(advanced.current_streak, 7);
        assert_eq!(advanced.max_grace_days, 1);

        let applied = engine.policy().apply(advanced, &transition);
        assert_eq!(applied.max_grace_days, 3);
    }

    #[test]
    fn test_budget_grows_over_long_streak() {
        let engine = StreakEngine::new();
        let days: Vec<u32> = (1..=14).collect();
        let state = run(&engine, &days);
        assert_eq!(state.current_streak, 14);
        // base 1 + two weeks earned + two perfect weeks, capped at 5
        assert_eq!(state.bonus_grace_days, 2);
        assert_eq!(state.max_grace_days, 5);
    }

    #[test]
    fn test_reset_clears_bonus() {
        let engine = StreakEngine::new();
        let days: Vec<u32> = (1..=7).collect();
        let state = run(&engine, &days);
        assert_eq!(state.bonus_grace_days, 1);

        let update = engine.step(Some(&state), &key(), day(20));
        assert_eq!(update.state.bonus_grace_days, 0);
        assert_eq!(update.state.max_grace_days, 1);
    }

    #[test]
    fn test_longest_survives_reset_and_regrowth() {
        let engine = StreakEngine::with_policy(GracePolicy::fixed(0));
        let state = run(&engine, &[1, 2, 3, 4, 10, 11]);
        assert_eq!(state.current_streak, 2);
        assert_eq!(state.longest_streak, 4);
    }
}
