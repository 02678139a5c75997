//! Static achievement catalog.
//!
//! Each entry carries its own progress function over [`AchievementSignals`],
//! so adding an achievement means adding a row here and nothing else.

use serde::{Deserialize, Serialize};

use super::signals::{AchievementSignals, ActivityKind};

/// Grouping used by clients to lay out the achievement board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AchievementCategory {
    Milestone,
    Streak,
    Health,
    Tracking,
    Consistency,
}

/// One catalog entry.
#[derive(Debug, Clone, Copy)]
pub struct AchievementDefinition {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub category: AchievementCategory,
    pub max_progress: u32,
    /// Raw progress before clamping; may overshoot `max_progress`.
    pub progress: fn(&AchievementSignals) -> u32,
}

fn max_streak(signals: &AchievementSignals) -> u32 {
    signals.max_streak
}

fn goals_completed(signals: &AchievementSignals) -> u32 {
    signals.count(ActivityKind::GoalCompleted)
}

fn medications_logged(signals: &AchievementSignals) -> u32 {
    signals.count(ActivityKind::MedicationLogged)
}

fn appointments_attended(signals: &AchievementSignals) -> u32 {
    signals.count(ActivityKind::AppointmentAttended)
}

fn metrics_recorded(signals: &AchievementSignals) -> u32 {
    signals.count(ActivityKind::MetricRecorded)
}

fn active_streaks(signals: &AchievementSignals) -> u32 {
    signals.active_streaks
}

/// Built-in achievements.
pub static CATALOG: &[AchievementDefinition] = &[
    AchievementDefinition {
        id: "first_step",
        title: "First Step",
        description: "Complete your first goal",
        category: AchievementCategory::Milestone,
        max_progress: 1,
        progress: goals_completed,
    },
    AchievementDefinition {
        id: "goal_getter",
        title: "Goal Getter",
        description: "Complete 25 goals",
        category: AchievementCategory::Milestone,
        max_progress: 25,
        progress: goals_completed,
    },
    AchievementDefinition {
        id: "week_warrior",
        title: "Week Warrior",
        description: "Reach a 7-day streak",
        category: AchievementCategory::Streak,
        max_progress: 7,
        progress: max_streak,
    },
    AchievementDefinition {
        id: "fortnight_focus",
        title: "Fortnight Focus",
        description: "Reach a 14-day streak",
        category: AchievementCategory::Streak,
        max_progress: 14,
        progress: max_streak,
    },
    AchievementDefinition {
        id: "monthly_master",
        title: "Monthly Master",
        description: "Reach a 30-day streak",
        category: AchievementCategory::Streak,
        max_progress: 30,
        progress: max_streak,
    },
    AchievementDefinition {
        id: "century_club",
        title: "Century Club",
        description: "Reach a 100-day streak",
        category: AchievementCategory::Streak,
        max_progress: 100,
        progress: max_streak,
    },
    AchievementDefinition {
        id: "medication_master",
        title: "Medication Master",
        description: "Log 30 medication doses",
        category: AchievementCategory::Health,
        max_progress: 30,
        progress: medications_logged,
    },
    AchievementDefinition {
        id: "checkup_champion",
        title: "Checkup Champion",
        description: "Attend 5 appointments",
        category: AchievementCategory::Health,
        max_progress: 5,
        progress: appointments_attended,
    },
    AchievementDefinition {
        id: "data_driven",
        title: "Data Driven",
        description: "Record 50 health metrics",
        category: AchievementCategory::Tracking,
        max_progress: 50,
        progress: metrics_recorded,
    },
    AchievementDefinition {
        id: "multitasker",
        title: "Multitasker",
        description: "Keep 3 streaks going at once",
        category: AchievementCategory::Consistency,
        max_progress: 3,
        progress: active_streaks,
    },
];

/// Look up a built-in achievement by id.
pub fn find(id: &str) -> Option<&'static AchievementDefinition> {
    CATALOG.iter().find(|def| def.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_catalog_ids_unique() {
        let ids: HashSet<&str> = CATALOG.iter().map(|def| def.id).collect();
        assert_eq!(ids.len(), CATALOG.len());
    }

    #[test]
    fn test_catalog_targets_positive() {
        assert!(CATALOG.iter().all(|def| def.max_progress > 0));
    }

    #[test]
    fn test_find() {
        let def = find("week_warrior").unwrap();
        assert_eq!(def.max_progress, 7);
        assert_eq!(def.category, AchievementCategory::Streak);
        assert!(find("nonexistent").is_none());
    }

    #[test]
    fn test_predicates_read_matching_signal() {
        let signals = AchievementSignals {
            max_streak: 12,
            active_streaks: 2,
            ..Default::default()
        }
        .with_count(ActivityKind::MedicationLogged, 4);

        assert_eq!((find("fortnight_focus").unwrap().progress)(&signals), 12);
        assert_eq!((find("medication_master").unwrap().progress)(&signals), 4);
        assert_eq!((find("multitasker").unwrap().progress)(&signals), 2);
        assert_eq!((find("first_step").unwrap().progress)(&signals), 0);
    }
}
