//! Manual grace-day requests.
//!
//! A user who knows they missed yesterday can spend a grace day on it
//! before logging today's completion. The request never advances the streak
//! counter; it only moves `last_completed_date` forward so the next
//! completion counts as consecutive.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::engine::{StreakEngine, StreakTransition};
use super::state::StreakState;

/// Business-rule rejections for a grace-day request.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum GraceRejection {
    #[error("No active streak to apply a grace day to")]
    NoActiveStreak,

    #[error("Grace day must cover {expected}, the day after the last completion (got {missed_date})")]
    InvalidGraceRequest {
        missed_date: NaiveDate,
        expected: NaiveDate,
    },

    #[error("No grace days remaining ({used} of {max} used)")]
    NoGraceDaysRemaining { used: u32, max: u32 },
}

/// Wire shape of a grace-day request result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraceOutcome {
    pub success: bool,
    pub message: String,
    /// Updated state when the request succeeded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<StreakState>,
}

impl From<Result<StreakState, GraceRejection>> for GraceOutcome {
    fn from(result: Result<StreakState, GraceRejection>) -> Self {
        match result {
            Ok(state) => GraceOutcome {
                success: true,
                message: format!(
                    "Grace day applied. {} grace day(s) left.",
                    state.grace_days_available()
                ),
                state: Some(state),
            },
            Err(rejection) => GraceOutcome {
                success: false,
                message: rejection.to_string(),
                state: None,
            },
        }
    }
}

impl StreakEngine {
    /// Bridge exactly one missed day without advancing the streak.
    ///
    /// `missed_date` must be the day right after `last_completed_date`.
    pub fn use_grace_day(
        &self,
        state: Option<&StreakState>,
        missed_date: NaiveDate,
    ) -> Result<StreakState, GraceRejection> {
        let state = state.ok_or(GraceRejection::NoActiveStreak)?;

        let expected = state.last_completed_date.succ_opt().unwrap_or(NaiveDate::MAX);
        if missed_date != expected {
            return Err(GraceRejection::InvalidGraceRequest {
                missed_date,
                expected,
            });
        }

        if state.grace_days_used >= state.max_grace_days {
            return Err(GraceRejection::NoGraceDaysRemaining {
                used: state.grace_days_used,
                max: state.max_grace_days,
            });
        }

        let mut updated = state.clone();
        updated.grace_days_used += 1;
        updated.last_completed_date = missed_date;

        tracing::debug!(
            key = %updated.key(),
            missed = %missed_date,
            used = updated.grace_days_used,
            "grace day applied"
        );

        Ok(self.policy().apply(updated, &StreakTransition::GraceApplied))
    }
}
