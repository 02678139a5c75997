//! Streak commands: record completions, spend grace days, inspect state.

use chrono::NaiveDate;
use clap::Subcommand;
use healthstreak_core::storage::Database;
use healthstreak_core::{CompletionEvent, Config, StreakKey, StreakTracker};

use super::{date_or_today, parse_date};

#[derive(Subcommand)]
pub enum StreakAction {
    /// Record a goal result for a day
    Record {
        /// User ID
        user: String,
        /// Goal ID
        goal: String,
        /// Day of the result (YYYY-MM-DD, default: today)
        #[arg(long, value_parser = parse_date)]
        date: Option<NaiveDate>,
        /// Record the day as missed instead of achieved
        #[arg(long)]
        missed: bool,
    },
    /// Spend a grace day on the day after the last completion
    Grace {
        /// User ID
        user: String,
        /// Goal ID
        goal: String,
        /// The missed day (YYYY-MM-DD, default: today)
        #[arg(long, value_parser = parse_date)]
        date: Option<NaiveDate>,
    },
    /// Show streak state
    Show {
        /// User ID
        user: String,
        /// Goal ID (all goals of the user if omitted)
        goal: Option<String>,
    },
    /// List streaks that a completion today would still save
    AtRisk {
        /// Reference day (YYYY-MM-DD, default: today)
        #[arg(long, value_parser = parse_date)]
        today: Option<NaiveDate>,
    },
}

pub fn run(action: StreakAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let mut tracker = StreakTracker::with_engine(config.streak_engine(), Database::open()?);

    match action {
        StreakAction::Record {
            user,
            goal,
            date,
            missed,
        } => {
            let event = CompletionEvent {
                user_id: user,
                goal_id: goal,
                date: date_or_today(date),
                achieved: !missed,
            };
            tracker.repository().record_event(&event)?;
            match tracker.record(&event)? {
                Some(update) => println!("{}", serde_json::to_string_pretty(&update)?),
                None => println!("Missed day recorded for {}", event.key()),
            }
        }
        StreakAction::Grace { user, goal, date } => {
            let key = StreakKey::new(user, goal);
            let outcome = tracker.use_grace_day(&key, date_or_today(date))?;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
        StreakAction::Show { user, goal } => match goal {
            Some(goal) => {
                let key = StreakKey::new(user, goal);
                let state = tracker
                    .state(&key)?
                    .ok_or_else(|| format!("no streak for {key}"))?;
                println!("{}", serde_json::to_string_pretty(&state)?);
            }
            None => {
                let states = tracker.states_for_user(&user)?;
                println!("{}", serde_json::to_string_pretty(&states)?);
            }
        },
        StreakAction::AtRisk { today } => {
            let at_risk = tracker.streaks_at_risk(date_or_today(today))?;
            println!("{}", serde_json::to_string_pretty(&at_risk)?);
        }
    }
    Ok(())
}
