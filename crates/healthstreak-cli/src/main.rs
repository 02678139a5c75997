use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;

#[derive(Parser)]
#[command(name = "healthstreak", version, about = "Health goal streak tracker")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Goal streaks and grace days
    Streak {
        #[command(subcommand)]
        action: commands::streak::StreakAction,
    },
    /// Activity log (medications, appointments, metrics)
    Activity {
        #[command(subcommand)]
        action: commands::activity::ActivityAction,
    },
    /// Evaluate and store achievement progress
    Achievements(commands::achievements::AchievementsArgs),
    /// Adherence report for a period
    Adherence(commands::adherence::AdherenceArgs),
    /// Classify the direction of a metric series
    Trend(commands::trend::TrendArgs),
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn main() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Streak { action } => commands::streak::run(action),
        Commands::Activity { action } => commands::activity::run(action),
        Commands::Achievements(args) => commands::achievements::run(args),
        Commands::Adherence(args) => commands::adherence::run(args),
        Commands::Trend(args) => commands::trend::run(args),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
