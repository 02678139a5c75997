use chrono::NaiveDate;
use clap::Subcommand;
use healthstreak_core::storage::Database;
use healthstreak_core::ActivityKind;

use super::{date_or_today, parse_date};

#[derive(Subcommand)]
pub enum ActivityAction {
    /// Log one activity
    Log {
        /// User ID
        user: String,
        /// Activity kind: goal_completed, medication_logged,
        /// appointment_attended or metric_recorded
        kind: ActivityKind,
        /// Day of the activity (YYYY-MM-DD, default: today)
        #[arg(long, value_parser = parse_date)]
        date: Option<NaiveDate>,
    },
    /// Activity totals per kind
    Counts {
        /// User ID
        user: String,
    },
}

pub fn run(action: ActivityAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;

    match action {
        ActivityAction::Log { user, kind, date } => {
            let date = date_or_today(date);
            let id = db.record_activity(&user, kind, date)?;
            println!("Activity logged: {id} ({kind} on {date})");
        }
        ActivityAction::Counts { user } => {
            let counts = db.activity_counts(&user)?;
            println!("{}", serde_json::to_string_pretty(&counts)?);
        }
    }
    Ok(())
}
