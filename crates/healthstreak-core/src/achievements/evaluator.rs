//! Achievement evaluation.
//!
//! Maps an [`AchievementSignals`] snapshot onto a catalog. Progress is
//! clamped to each definition's target, and completion plus the unlock
//! timestamp are carried over from the previous evaluation so they never
//! revert.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::catalog::{AchievementDefinition, CATALOG};
use super::signals::AchievementSignals;

/// Progress of one user on one achievement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AchievementProgress {
    pub achievement_id: String,
    pub progress: u32,
    pub max_progress: u32,
    pub completed: bool,
    pub unlocked_at: Option<DateTime<Utc>>,
}

impl AchievementProgress {
    /// Progress as a fraction in [0.0, 1.0].
    pub fn ratio(&self) -> f64 {
        if self.max_progress == 0 {
            return 0.0;
        }
        f64::from(self.progress) / f64::from(self.max_progress)
    }
}

/// Output of one evaluation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AchievementEvaluation {
    /// One entry per catalog definition, in catalog order.
    pub progress: Vec<AchievementProgress>,
    /// Ids that went from incomplete to complete in this pass.
    pub newly_unlocked: Vec<String>,
}

/// Evaluates signals against an achievement catalog.
#[derive(Debug, Clone, Copy)]
pub struct AchievementEvaluator<'a> {
    catalog: &'a [AchievementDefinition],
}

impl Default for AchievementEvaluator<'static> {
    fn default() -> Self {
        Self { catalog: CATALOG }
    }
}

impl AchievementEvaluator<'static> {
    /// Evaluator over the built-in catalog.
    pub fn new() -> Self {
        Self::default()
    }
}

impl<'a> AchievementEvaluator<'a> {
    /// Evaluator over a custom catalog.
    pub fn with_catalog(catalog: &'a [AchievementDefinition]) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &'a [AchievementDefinition] {
        self.catalog
    }

    /// Evaluate every definition.
    ///
    /// `previous` is the result of the last evaluation for the same user
    /// (possibly empty); `now` stamps achievements unlocked in this pass.
    pub fn evaluate(
        &self,
        signals: &AchievementSignals,
        previous: &[AchievementProgress],
        now: DateTime<Utc>,
    ) -> AchievementEvaluation {
        let previous: HashMap<&str, &AchievementProgress> = previous
            .iter()
            .map(|p| (p.achievement_id.as_str(), p))
            .collect();

        let mut evaluation = AchievementEvaluation::default();

        for def in self.catalog {
            let prior = previous.get(def.id).copied();
            let progress = evaluate_one(def, signals, prior, now);

            let was_completed = prior.is_some_and(|p| p.completed);
            if progress.completed && !was_completed {
                tracing::info!(achievement = def.id, "achievement unlocked");
                evaluation.newly_unlocked.push(def.id.to_string());
            }

            evaluation.progress.push(progress);
        }

        evaluation
    }
}

fn evaluate_one(
    def: &AchievementDefinition,
    signals: &AchievementSignals,
    prior: Option<&AchievementProgress>,
    now: DateTime<Utc>,
) -> AchievementProgress {
    let raw = (def.progress)(signals);
    let was_completed = prior.is_some_and(|p| p.completed);
    let completed = was_completed || raw >= def.max_progress;

    // Completed achievements stay full even if the signal later drops
    let progress = if completed {
        def.max_progress
    } else {
        raw.min(def.max_progress)
    };

    let unlocked_at = match prior.and_then(|p| p.unlocked_at) {
        Some(at) => Some(at),
        None if completed => Some(now),
        None => None,
    };

    AchievementProgress {
        achievement_id: def.id.to_string(),
        progress,
        max_progress: def.max_progress,
        completed,
        unlocked_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::achievements::signals::ActivityKind;
    use chrono::TimeZone;

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, day, 12, 0, 0).unwrap()
    }

    fn find<'a>(eval: &'a AchievementEvaluation, id: &str) -> &'a AchievementProgress {
        eval.progress
            .iter()
            .find(|p| p.achievement_id == id)
            .unwrap()
    }

    #[test]
    fn test_one_entry_per_definition() {
        let eval = AchievementEvaluator::new().evaluate(&AchievementSignals::default(), &[], at(1));
        assert_eq!(eval.progress.len(), CATALOG.len());
        assert!(eval.newly_unlocked.is_empty());
        assert!(eval.progress.iter().all(|p| p.progress == 0 && !p.completed));
    }

    #[test]
    fn test_progress_clamped_to_target() {
        let signals = AchievementSignals {
            max_streak: 45,
            ..Default::default()
        };
        let eval = AchievementEvaluator::new().evaluate(&signals, &[], at(1));

        let week = find(&eval, "week_warrior");
        assert_eq!(week.progress, 7);
        assert!(week.completed);

        let century = find(&eval, "century_club");
        assert_eq!(century.progress, 45);
        assert!(!century.completed);
        assert!((century.ratio() - 0.45).abs() < 1e-9);
    }

    #[test]
    fn test_unlock_sets_timestamp_once() {
        let evaluator = AchievementEvaluator::new();
        let signals = AchievementSignals::default().with_count(ActivityKind::GoalCompleted, 1);

        let first = evaluator.evaluate(&signals, &[], at(1));
        assert_eq!(first.newly_unlocked, vec!["first_step".to_string()]);
        assert_eq!(find(&first, "first_step").unlocked_at, Some(at(1)));

        let second = evaluator.evaluate(&signals, &first.progress, at(5));
        assert!(second.newly_unlocked.is_empty());
        assert_eq!(find(&second, "first_step").unlocked_at, Some(at(1)));
    }

    #[test]
    fn test_completion_never_reverts() {
        let evaluator = AchievementEvaluator::new();
        let busy = AchievementSignals {
            active_streaks: 3,
            ..Default::default()
        };
        let first = evaluator.evaluate(&busy, &[], at(1));
        assert!(find(&first, "multitasker").completed);

        let quiet = AchievementSignals::default();
        let second = evaluator.evaluate(&quiet, &first.progress, at(2));
        let multitasker = find(&second, "multitasker");
        assert!(multitasker.completed);
        assert_eq!(multitasker.progress, 3);
        assert_eq!(multitasker.unlocked_at, Some(at(1)));
    }

    #[test]
    fn test_custom_catalog() {
        fn always_two(_: &AchievementSignals) -> u32 {
            2
        }
        let catalog = [AchievementDefinition {
            id: "pair",
            title: "Pair",
            description: "Always two",
            category: crate::achievements::AchievementCategory::Milestone,
            max_progress: 2,
            progress: always_two,
        }];

        let eval = AchievementEvaluator::with_catalog(&catalog).evaluate(
            &AchievementSignals::default(),
            &[],
            at(3),
        );
        assert_eq!(eval.progress.len(), 1);
        assert_eq!(eval.newly_unlocked, vec!["pair".to_string()]);
    }

    #[test]
    fn test_unknown_previous_entries_ignored() {
        let stale = AchievementProgress {
            achievement_id: "retired".into(),
            progress: 1,
            max_progress: 1,
            completed: true,
            unlocked_at: Some(at(1)),
        };
        let eval = AchievementEvaluator::new().evaluate(&AchievementSignals::default(), &[stale], at(2));
        assert!(eval.progress.iter().all(|p| p.achievement_id != "retired"));
    }
}
