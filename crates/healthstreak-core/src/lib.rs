//! # Healthstreak Core Library
//!
//! This library provides the engagement logic behind the healthstreak
//! tracker: goal streaks with grace days, achievement unlocking and
//! adherence analytics. All operations are available via the standalone
//! `healthstreak` CLI, which is a thin layer over this crate.
//!
//! ## Architecture
//!
//! - **Streak Engine**: Pure state transitions over `(user, goal)` streaks.
//!   The engine never touches storage; callers inject a [`StreakRepository`]
//! - **Achievements**: A declarative catalog evaluated against snapshot signals
//! - **Stats**: Consistency scoring, trend labels and adherence reports
//! - **Storage**: SQLite-based history and TOML-based configuration
//!
//! ## Key Components
//!
//! - [`StreakEngine`]: Streak state machine and grace-day rules
//! - [`StreakTracker`]: Load → transition → save glue over a repository
//! - [`AchievementEvaluator`]: Progress and unlock computation
//! - [`AdherenceAnalyzer`]: Per-user adherence reports with insights
//! - [`Database`]: History and state persistence
//! - [`Config`]: Engine configuration management

pub mod achievements;
pub mod error;
pub mod stats;
pub mod storage;
pub mod streak;
pub mod tracker;

pub use achievements::{
    AchievementCategory, AchievementDefinition, AchievementEvaluation, AchievementEvaluator,
    AchievementProgress, AchievementSignals, ActivityKind, CATALOG,
};
pub use error::{ConfigError, CoreError, DatabaseError, ValidationError};
pub use stats::{
    AdherenceAnalyzer, AdherenceInsight, AdherencePattern, AdherencePeriod, ConsistencyScorer,
    MetricPolarity, TrendClassifier, TrendLabel, TrendResult,
};
pub use storage::{Config, Database};
pub use streak::{
    CompletionEvent, GraceOutcome, GracePolicy, InMemoryStreakRepository, StreakAtRisk,
    StreakEngine, StreakKey, StreakRepository, StreakState, StreakTransition,
};
pub use tracker::StreakTracker;
