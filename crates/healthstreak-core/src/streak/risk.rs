//! At-risk streak detection for the reminder scheduler.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::engine::StreakEngine;
use super::state::StreakState;

/// A streak that has missed at least one day but can still be saved by a
/// completion today.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakAtRisk {
    pub user_id: String,
    pub goal_id: String,
    pub current_streak: u32,
    pub days_missed: u32,
    pub grace_days_available: u32,
}

impl StreakAtRisk {
    /// Grace days left over if the user completes today.
    pub fn spare_grace_days(&self) -> u32 {
        self.grace_days_available.saturating_sub(self.days_missed)
    }
}

impl StreakEngine {
    /// Streaks with a gap that is still inside the grace window as of `today`.
    ///
    /// Ordered most urgent first: fewest spare grace days, then by key.
    pub fn streaks_at_risk<'a, I>(&self, states: I, today: NaiveDate) -> Vec<StreakAtRisk>
    where
        I: IntoIterator<Item = &'a StreakState>,
    {
        let mut at_risk: Vec<StreakAtRisk> = states
            .into_iter()
            .filter(|state| state.days_since_last(today) > 1 && state.can_extend_on(today))
            .map(|state| StreakAtRisk {
                user_id: state.user_id.clone(),
                goal_id: state.goal_id.clone(),
                current_streak: state.current_streak,
                days_missed: u32::try_from(state.days_since_last(today) - 1).unwrap_or(u32::MAX),
                grace_days_available: state.grace_days_available(),
            })
            .collect();

        at_risk.sort_by(|a, b| {
            a.spare_grace_days()
                .cmp(&b.spare_grace_days())
                .then_with(|| a.user_id.cmp(&b.user_id))
                .then_with(|| a.goal_id.cmp(&b.goal_id))
        });

        if !at_risk.is_empty() {
            tracing::debug!(count = at_risk.len(), %today, "streaks at risk");
        }

        at_risk
    }
}
