use clap::Args;
use healthstreak_core::stats::parse_metric_value;
use healthstreak_core::{Config, MetricPolarity, ValidationError};

#[derive(Args)]
pub struct TrendArgs {
    /// Metric values, oldest first (e.g. "72.5" or "120/80")
    #[arg(required = true)]
    values: Vec<String>,
    /// Treat falling values as improvement (weight, blood pressure)
    #[arg(long)]
    lower_is_better: bool,
}

pub fn run(args: TrendArgs) -> Result<(), Box<dyn std::error::Error>> {
    let samples = args
        .values
        .iter()
        .map(|raw| {
            parse_metric_value(raw).ok_or_else(|| ValidationError::InvalidValue {
                field: "value".into(),
                message: format!("'{raw}' is not a metric value"),
            })
        })
        .collect::<Result<Vec<f64>, _>>()?;

    let polarity = if args.lower_is_better {
        MetricPolarity::LowerIsBetter
    } else {
        MetricPolarity::HigherIsBetter
    };

    let config = Config::load()?;
    let result = config
        .trend_classifier()
        .classify_with_polarity(&samples, polarity);
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
