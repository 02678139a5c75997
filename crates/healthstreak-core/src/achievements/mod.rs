//! Gamified achievements derived from streak and activity signals.

mod catalog;
mod evaluator;
mod signals;

pub use catalog::{find, AchievementCategory, AchievementDefinition, CATALOG};
pub use evaluator::{AchievementEvaluation, AchievementEvaluator, AchievementProgress};
pub use signals::{AchievementSignals, ActivityKind};
