//! Aggregated inputs for achievement evaluation.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::streak::StreakState;

/// Kinds of user activity counted toward achievements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    GoalCompleted,
    MedicationLogged,
    AppointmentAttended,
    MetricRecorded,
}

impl ActivityKind {
    pub const ALL: [ActivityKind; 4] = [
        ActivityKind::GoalCompleted,
        ActivityKind::MedicationLogged,
        ActivityKind::AppointmentAttended,
        ActivityKind::MetricRecorded,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityKind::GoalCompleted => "goal_completed",
            ActivityKind::MedicationLogged => "medication_logged",
            ActivityKind::AppointmentAttended => "appointment_attended",
            ActivityKind::MetricRecorded => "metric_recorded",
        }
    }
}

impl fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActivityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ActivityKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| format!("unknown activity kind: {s}"))
    }
}

/// Snapshot of everything achievement predicates may look at.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AchievementSignals {
    /// Longest streak reached on any goal.
    pub max_streak: u32,
    /// Count per activity kind; missing kinds count as zero.
    #[serde(default)]
    pub activity_counts: BTreeMap<ActivityKind, u32>,
    /// Streaks still alive at evaluation time.
    pub active_streaks: u32,
}

impl AchievementSignals {
    /// Derive signals from a user's streak states plus host-supplied counts.
    pub fn from_states(
        states: &[StreakState],
        activity_counts: BTreeMap<ActivityKind, u32>,
        today: NaiveDate,
    ) -> Self {
        let max_streak = states
            .iter()
            .map(|state| state.longest_streak)
            .max()
            .unwrap_or(0);
        let active_streaks = states.iter().filter(|state| state.is_active_on(today)).count();

        Self {
            max_streak,
            activity_counts,
            active_streaks: u32::try_from(active_streaks).unwrap_or(u32::MAX),
        }
    }

    pub fn count(&self, kind: ActivityKind) -> u32 {
        self.activity_counts.get(&kind).copied().unwrap_or(0)
    }

    /// Builder-style setter, handy in tests and simple hosts.
    pub fn with_count(mut self, kind: ActivityKind, count: u32) -> Self {
        self.activity_counts.insert(kind, count);
        self
    }
}
