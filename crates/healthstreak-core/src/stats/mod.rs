//! Statistics for coaching summaries
//!
//! This module provides adherence and trend analytics over goal and metric
//! histories: contiguity-weighted consistency scoring, day-of-week
//! adherence buckets, short-window trend labels and per-user adherence
//! reports.

mod adherence;
mod consistency;
mod trend;

pub use adherence::{
    AdherenceAnalyzer, AdherenceConfig, AdherenceInsight, AdherencePattern, AdherencePeriod,
    GoalAdherence,
};

pub use consistency::{
    ConsistencyConfig, ConsistencyScorer, DailyRecord, WeekdayAdherence, WeeklyPattern,
};

pub use trend::{
    parse_metric_value, MetricPolarity, MetricSample, TrendClassifier, TrendConfig, TrendLabel,
    TrendResult,
};
