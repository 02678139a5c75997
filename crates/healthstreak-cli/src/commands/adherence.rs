use chrono::{Days, NaiveDate};
use clap::Args;
use healthstreak_core::storage::Database;
use healthstreak_core::{AdherencePeriod, Config};

use super::{date_or_today, parse_date};

#[derive(Args)]
pub struct AdherenceArgs {
    /// User ID
    user: String,
    /// First day of the period (YYYY-MM-DD, default: `--days` before `--to`)
    #[arg(long, value_parser = parse_date)]
    from: Option<NaiveDate>,
    /// Last day of the period (YYYY-MM-DD, default: today)
    #[arg(long, value_parser = parse_date)]
    to: Option<NaiveDate>,
    /// Period length when `--from` is omitted
    #[arg(long, default_value = "30")]
    days: u32,
    /// Print insights as text instead of the JSON report
    #[arg(long)]
    insights: bool,
}

pub fn run(args: AdherenceArgs) -> Result<(), Box<dyn std::error::Error>> {
    let end = date_or_today(args.to);
    let start = match args.from {
        Some(from) => from,
        None => end
            .checked_sub_days(Days::new(u64::from(args.days.max(1)) - 1))
            .ok_or_else(|| format!("period too long: {} days before {end}", args.days))?,
    };
    if start > end {
        return Err(format!("period start {start} is after end {end}").into());
    }

    let period = AdherencePeriod::new(start, end);
    let config = Config::load()?;
    let db = Database::open()?;
    let events = db.events_for_user(&args.user, Some(period))?;
    let report = config.adherence_analyzer().analyze(&args.user, period, &events);

    if args.insights {
        println!(
            "Adherence for {} over {} days ({} to {}): {:.1}%",
            report.user_id,
            period.days(),
            start,
            end,
            report.overall_adherence
        );
        for insight in &report.insights {
            println!("  - {insight}");
        }
    } else {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }
    Ok(())
}
