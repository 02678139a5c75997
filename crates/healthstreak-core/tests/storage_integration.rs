//! Integration tests for on-disk persistence.
//!
//! Tests the host workflow against a real SQLite file: events recorded,
//! streaks tracked through the database repository, achievements and
//! adherence computed from what was stored, then reopened.

use chrono::{NaiveDate, TimeZone, Utc};
use healthstreak_core::{
    AchievementEvaluator, ActivityKind, AdherencePeriod, CompletionEvent, Config, Database,
    StreakKey, StreakRepository, StreakTracker,
};

fn may(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
}

#[test]
fn test_full_tracking_workflow_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("healthstreak.db");

    {
        let db = Database::open_at(&path).unwrap();
        let mut tracker = StreakTracker::new(db);

        // walk every day except the 4th, meds on alternate days
        for d in 1..=10 {
            let walk = CompletionEvent {
                user_id: "u1".into(),
                goal_id: "walk".into(),
                date: may(d),
                achieved: d != 4,
            };
            let meds = CompletionEvent {
                user_id: "u1".into(),
                goal_id: "meds".into(),
                date: may(d),
                achieved: d % 2 == 1,
            };
            for event in [&walk, &meds] {
                tracker.repository().record_event(event).unwrap();
                tracker.record(event).unwrap();
            }
        }

        let db = tracker.into_repository();
        for d in 1..=3 {
            db.record_activity("u1", ActivityKind::MedicationLogged, may(d))
                .unwrap();
        }
    }

    let db = Database::open_at(&path).unwrap();

    let walk = db.load(&StreakKey::new("u1", "walk")).unwrap().unwrap();
    assert_eq!(walk.current_streak, 9);
    assert_eq!(walk.grace_days_used, 1);

    // alternate days never fit the grace budget twice in a row
    let meds = db.load(&StreakKey::new("u1", "meds")).unwrap().unwrap();
    assert_eq!(meds.last_completed_date, may(9));
    assert!(meds.current_streak <= 5);

    let counts = db.activity_counts("u1").unwrap();
    assert_eq!(counts.get(&ActivityKind::GoalCompleted), Some(&14));
    assert_eq!(counts.get(&ActivityKind::MedicationLogged), Some(&3));

    let tracker = StreakTracker::new(db);
    let signals = tracker.signals_for_user("u1", counts, may(10)).unwrap();
    let now = Utc.with_ymd_and_hms(2024, 5, 10, 21, 0, 0).unwrap();
    let evaluation = AchievementEvaluator::new().evaluate(&signals, &[], now);
    assert!(evaluation.newly_unlocked.contains(&"week_warrior".to_string()));

    let db = tracker.into_repository();
    db.save_achievements("u1", &evaluation.progress).unwrap();
    let stored = db.load_achievements("u1").unwrap();
    assert_eq!(stored.len(), evaluation.progress.len());

    let events = db
        .events_for_user("u1", Some(AdherencePeriod::new(may(1), may(10))))
        .unwrap();
    assert_eq!(events.len(), 20);

    let report = Config::default()
        .adherence_analyzer()
        .analyze("u1", AdherencePeriod::new(may(1), may(10)), &events);
    assert!((report.overall_adherence - 70.0).abs() < 1e-9);
    assert_eq!(report.per_goal.len(), 2);
    assert_eq!(report.per_goal[1].goal_id, "walk");
    assert!((report.per_goal[1].adherence_rate - 90.0).abs() < 1e-9);
}
