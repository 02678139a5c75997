//! Adherence pattern reports for coaching summaries.
//!
//! Combines per-goal adherence, consistency scores and the weekly pattern
//! of one user over a date range into an [`AdherencePattern`]. Reports are
//! recomputed per request and never stored.

use chrono::{NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::consistency::{ConsistencyScorer, DailyRecord, WeeklyPattern};
use crate::streak::CompletionEvent;

/// Inclusive date range a report covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdherencePeriod {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl AdherencePeriod {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// Number of calendar days covered (0 for an inverted range).
    pub fn days(&self) -> u32 {
        u32::try_from((self.end - self.start).num_days() + 1).unwrap_or(0)
    }
}

/// Adherence of one goal over the period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalAdherence {
    pub goal_id: String,
    pub total_days: u32,
    pub achieved_days: u32,
    /// Percentage of recorded days achieved (0.0 to 100.0)
    pub adherence_rate: f64,
    /// Contiguity-weighted score (0 to 100)
    pub consistency_score: u8,
}

/// Observations surfaced alongside the numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum AdherenceInsight {
    StrongestDay { weekday: Weekday, rate: f64 },
    WeakestDay { weekday: Weekday, rate: f64 },
    TopGoal { goal_id: String, adherence_rate: f64 },
    NeedsAttention { goal_id: String, adherence_rate: f64 },
    ExcellentAdherence { overall_adherence: f64 },
}

impl fmt::Display for AdherenceInsight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdherenceInsight::StrongestDay { weekday, rate } => write!(
                f,
                "Strongest on {} ({:.0}% of days achieved)",
                weekday_name(*weekday),
                rate * 100.0
            ),
            AdherenceInsight::WeakestDay { weekday, rate } => write!(
                f,
                "Weakest on {} ({:.0}% of days achieved)",
                weekday_name(*weekday),
                rate * 100.0
            ),
            AdherenceInsight::TopGoal {
                goal_id,
                adherence_rate,
            } => write!(f, "Best adherence on '{goal_id}' ({adherence_rate:.0}%)"),
            AdherenceInsight::NeedsAttention {
                goal_id,
                adherence_rate,
            } => write!(f, "'{goal_id}' needs attention ({adherence_rate:.0}%)"),
            AdherenceInsight::ExcellentAdherence { overall_adherence } => {
                write!(f, "Excellent overall adherence ({overall_adherence:.0}%)")
            }
        }
    }
}

fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// Complete adherence report for one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdherencePattern {
    pub user_id: String,
    pub period: AdherencePeriod,
    /// Percentage of recorded goal-days achieved (0.0 to 100.0)
    pub overall_adherence: f64,
    pub per_goal: Vec<GoalAdherence>,
    pub weekly_pattern: WeeklyPattern,
    pub insights: Vec<AdherenceInsight>,
}

/// Thresholds for insight generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdherenceConfig {
    /// Goals below this adherence percentage are flagged.
    #[serde(default = "default_attention_threshold")]
    pub attention_threshold_percent: f64,
    /// Overall adherence at or above this percentage is called out.
    #[serde(default = "default_excellent_threshold")]
    pub excellent_threshold_percent: f64,
}

fn default_attention_threshold() -> f64 {
    50.0
}
fn default_excellent_threshold() -> f64 {
    80.0
}

impl Default for AdherenceConfig {
    fn default() -> Self {
        Self {
            attention_threshold_percent: default_attention_threshold(),
            excellent_threshold_percent: default_excellent_threshold(),
        }
    }
}

/// Builds [`AdherencePattern`] reports.
#[derive(Debug, Clone, Default)]
pub struct AdherenceAnalyzer {
    scorer: ConsistencyScorer,
    config: AdherenceConfig,
}

impl AdherenceAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(scorer: ConsistencyScorer, config: AdherenceConfig) -> Self {
        Self { scorer, config }
    }

    /// Build the report for `user_id` from `events` within `period`.
    ///
    /// Events of other users or outside the period are ignored. Several
    /// events for the same goal and day collapse into one day, achieved if
    /// any of them was.
    pub fn analyze(
        &self,
        user_id: &str,
        period: AdherencePeriod,
        events: &[CompletionEvent],
    ) -> AdherencePattern {
        let mut by_goal: BTreeMap<&str, BTreeMap<NaiveDate, bool>> = BTreeMap::new();
        for event in events
            .iter()
            .filter(|e| e.user_id == user_id && period.contains(e.date))
        {
            let achieved = by_goal
                .entry(event.goal_id.as_str())
                .or_default()
                .entry(event.date)
                .or_insert(false);
            *achieved |= event.achieved;
        }

        let mut all_records: Vec<DailyRecord> = Vec::new();
        let mut per_goal: Vec<GoalAdherence> = Vec::with_capacity(by_goal.len());
        let mut total_days: u32 = 0;
        let mut achieved_days: u32 = 0;

        for (goal_id, days) in &by_goal {
            let records: Vec<DailyRecord> = days
                .iter()
                .map(|(&date, &achieved)| DailyRecord { date, achieved })
                .collect();
            let history: Vec<bool> = records.iter().map(|r| r.achieved).collect();

            let goal_total = u32::try_from(records.len()).unwrap_or(u32::MAX);
            let goal_achieved = u32::try_from(history.iter().filter(|&&a| a).count()).unwrap_or(u32::MAX);

            per_goal.push(GoalAdherence {
                goal_id: goal_id.to_string(),
                total_days: goal_total,
                achieved_days: goal_achieved,
                adherence_rate: percent(goal_achieved, goal_total),
                consistency_score: self.scorer.score(&history),
            });

            total_days += goal_total;
            achieved_days += goal_achieved;
            all_records.extend(records);
        }

        let overall_adherence = percent(achieved_days, total_days);
        let weekly_pattern = self.scorer.weekly_pattern(&all_records);
        let insights = self.insights(overall_adherence, &per_goal, &weekly_pattern);

        tracing::debug!(
            user_id,
            goals = per_goal.len(),
            overall_adherence,
            "adherence pattern computed"
        );

        AdherencePattern {
            user_id: user_id.to_string(),
            period,
            overall_adherence,
            per_goal,
            weekly_pattern,
            insights,
        }
    }

    fn insights(
        &self,
        overall_adherence: f64,
        per_goal: &[GoalAdherence],
        weekly_pattern: &WeeklyPattern,
    ) -> Vec<AdherenceInsight> {
        let mut insights = Vec::new();

        if let (Some(strongest), Some(weakest)) =
            (weekly_pattern.strongest_day(), weekly_pattern.weakest_day())
        {
            if strongest.weekday != weakest.weekday && strongest.rate > weakest.rate {
                insights.push(AdherenceInsight::StrongestDay {
                    weekday: strongest.weekday,
                    rate: strongest.rate,
                });
                insights.push(AdherenceInsight::WeakestDay {
                    weekday: weakest.weekday,
                    rate: weakest.rate,
                });
            }
        }

        if per_goal.len() > 1 {
            let top = per_goal.iter().fold(None, |best: Option<&GoalAdherence>, g| match best {
                Some(b) if b.adherence_rate >= g.adherence_rate => Some(b),
                _ => Some(g),
            });
            if let Some(top) = top.filter(|g| g.achieved_days > 0) {
                insights.push(AdherenceInsight::TopGoal {
                    goal_id: top.goal_id.clone(),
                    adherence_rate: top.adherence_rate,
                });
            }
        }

        for goal in per_goal
            .iter()
            .filter(|g| g.adherence_rate < self.config.attention_threshold_percent)
        {
            insights.push(AdherenceInsight::NeedsAttention {
                goal_id: goal.goal_id.clone(),
                adherence_rate: goal.adherence_rate,
            });
        }

        if !per_goal.is_empty() && overall_adherence >= self.config.excellent_threshold_percent {
            insights.push(AdherenceInsight::ExcellentAdherence { overall_adherence });
        }

        insights
    }
}

fn percent(part: u32, total: u32) -> f64 {
    if total == 0 {
        return 0.0;
    }
    f64::from(part) / f64::from(total) * 100.0
}
