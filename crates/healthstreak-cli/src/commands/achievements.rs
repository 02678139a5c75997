//! Achievement evaluation command.
//!
//! Re-evaluates the catalog from stored streaks and activity counts, then
//! stores the result so unlock times stay fixed across runs.

use chrono::{NaiveDate, Utc};
use clap::Args;
use healthstreak_core::storage::Database;
use healthstreak_core::{AchievementEvaluator, StreakTracker};

use super::{date_or_today, parse_date};

#[derive(Args)]
pub struct AchievementsArgs {
    /// User ID
    user: String,
    /// Reference day for active streaks (YYYY-MM-DD, default: today)
    #[arg(long, value_parser = parse_date)]
    today: Option<NaiveDate>,
    /// Only list achievements unlocked by this evaluation
    #[arg(long)]
    new_only: bool,
}

pub fn run(args: AchievementsArgs) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let counts = db.activity_counts(&args.user)?;
    let previous = db.load_achievements(&args.user)?;

    let tracker = StreakTracker::new(db);
    let signals = tracker.signals_for_user(&args.user, counts, date_or_today(args.today))?;
    let evaluation = AchievementEvaluator::new().evaluate(&signals, &previous, Utc::now());

    let db = tracker.into_repository();
    db.save_achievements(&args.user, &evaluation.progress)?;

    if args.new_only {
        println!("{}", serde_json::to_string_pretty(&evaluation.newly_unlocked)?);
    } else {
        println!("{}", serde_json::to_string_pretty(&evaluation)?);
    }
    Ok(())
}
