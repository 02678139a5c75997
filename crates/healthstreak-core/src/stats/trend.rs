//! Short-window trend classification for health metrics.
//!
//! Compares the mean of the first half of a series with the mean of the
//! second half. Sparse series are labelled stable, and the result says so
//! through `sufficient_data` so callers can tell "no signal yet" apart from
//! "measured as flat".

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Direction of a metric over the sampled window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendLabel {
    Improving,
    Declining,
    Stable,
}

/// Whether a rising value is good news.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricPolarity {
    /// Steps, sleep hours, adherence
    #[default]
    HigherIsBetter,
    /// Blood pressure, resting heart rate, symptom counts
    LowerIsBetter,
}

/// Classification of one series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendResult {
    pub label: TrendLabel,
    /// Change of the second-half mean relative to the first-half mean, in percent.
    pub percent_change: f64,
    pub sample_count: usize,
    /// False when the series was too short to classify.
    pub sufficient_data: bool,
}

/// A dated metric reading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricSample {
    pub recorded_on: NaiveDate,
    pub value: f64,
}

/// Tuning for [`TrendClassifier`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendConfig {
    /// Minimum number of samples before classifying.
    #[serde(default = "default_min_samples")]
    pub min_samples: usize,
    /// Percent change beyond which the trend is not stable.
    #[serde(default = "default_threshold_percent")]
    pub threshold_percent: f64,
}

fn default_min_samples() -> usize {
    6
}
fn default_threshold_percent() -> f64 {
    5.0
}

impl Default for TrendConfig {
    fn default() -> Self {
        Self {
            min_samples: default_min_samples(),
            threshold_percent: default_threshold_percent(),
        }
    }
}

/// Labels a sample series as improving, declining or stable.
#[derive(Debug, Clone, Default)]
pub struct TrendClassifier {
    config: TrendConfig,
}

impl TrendClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: TrendConfig) -> Self {
        Self { config }
    }

    /// Classify a time-ordered series where higher values are better.
    pub fn classify(&self, samples: &[f64]) -> TrendResult {
        self.classify_with_polarity(samples, MetricPolarity::HigherIsBetter)
    }

    /// Classify a time-ordered series, flipping the label for metrics where
    /// lower values are better. `percent_change` keeps its raw sign.
    pub fn classify_with_polarity(&self, samples: &[f64], polarity: MetricPolarity) -> TrendResult {
        let sample_count = samples.len();
        if sample_count < self.config.min_samples.max(2) {
            return TrendResult {
                label: TrendLabel::Stable,
                percent_change: 0.0,
                sample_count,
                sufficient_data: false,
            };
        }

        // Odd-length series drop the middle sample
        let half = sample_count / 2;
        let first_avg = mean(&samples[..half]);
        let second_avg = mean(&samples[sample_count - half..]);

        let percent_change = if first_avg.abs() < f64::EPSILON {
            0.0
        } else {
            (second_avg - first_avg) / first_avg.abs() * 100.0
        };

        let rising = if percent_change > self.config.threshold_percent {
            Some(true)
        } else if percent_change < -self.config.threshold_percent {
            Some(false)
        } else {
            None
        };

        let label = match (rising, polarity) {
            (None, _) => TrendLabel::Stable,
            (Some(true), MetricPolarity::HigherIsBetter)
            | (Some(false), MetricPolarity::LowerIsBetter) => TrendLabel::Improving,
            (Some(false), MetricPolarity::HigherIsBetter)
            | (Some(true), MetricPolarity::LowerIsBetter) => TrendLabel::Declining,
        };

        TrendResult {
            label,
            percent_change,
            sample_count,
            sufficient_data: true,
        }
    }

    /// Classify dated samples, ordering them by date first.
    pub fn classify_dated(&self, samples: &[MetricSample], polarity: MetricPolarity) -> TrendResult {
        let mut sorted = samples.to_vec();
        sorted.sort_by_key(|s| s.recorded_on);
        let values: Vec<f64> = sorted.iter().map(|s| s.value).collect();
        self.classify_with_polarity(&values, polarity)
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Parse a reading as entered by users.
///
/// Compound readings such as blood pressure ("120/80") yield their first
/// (systolic) component.
pub fn parse_metric_value(raw: &str) -> Option<f64> {
    let primary = raw.split('/').next()?.trim();
    primary.parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ten_percent_rise_is_improving() {
        let result = TrendClassifier::new().classify(&[100.0, 100.0, 100.0, 110.0, 110.0, 110.0]);
        assert_eq!(result.label, TrendLabel::Improving);
        assert!((result.percent_change - 10.0).abs() < 1e-9);
        assert!(result.sufficient_data);
    }

    #[test]
    fn test_flat_series_is_stable() {
        let result = TrendClassifier::new().classify(&[70.0; 8]);
        assert_eq!(result.label, TrendLabel::Stable);
        assert_eq!(result.percent_change, 0.0);
        assert!(result.sufficient_data);
    }

    #[test]
    fn test_drop_is_declining() {
        let result = TrendClassifier::new().classify(&[10.0, 10.0, 10.0, 8.0, 8.0, 8.0]);
        assert_eq!(result.label, TrendLabel::Declining);
        assert!((result.percent_change + 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_short_series_is_stable_regardless_of_content() {
        let result = TrendClassifier::new().classify(&[1.0, 50.0, 100.0, 500.0, 1000.0]);
        assert_eq!(result.label, TrendLabel::Stable);
        assert!(!result.sufficient_data);
        assert_eq!(result.sample_count, 5);
    }

    #[test]
    fn test_small_change_within_threshold_is_stable() {
        let result = TrendClassifier::new().classify(&[100.0, 100.0, 100.0, 104.0, 104.0, 104.0]);
        assert_eq!(result.label, TrendLabel::Stable);
    }

    #[test]
    fn test_odd_length_drops_middle() {
        // Middle value 1000 must not affect either half
        let result = TrendClassifier::new().classify(&[10.0, 10.0, 10.0, 1000.0, 10.0, 10.0, 10.0]);
        assert_eq!(result.label, TrendLabel::Stable);
        assert_eq!(result.percent_change, 0.0);
    }

    #[test]
    fn test_zero_baseline_is_stable() {
        let result = TrendClassifier::new().classify(&[0.0, 0.0, 0.0, 5.0, 5.0, 5.0]);
        assert_eq!(result.label, TrendLabel::Stable);
        assert_eq!(result.percent_change, 0.0);
    }

    #[test]
    fn test_lower_is_better_flips_label() {
        let falling_bp = [140.0, 138.0, 141.0, 125.0, 122.0, 120.0];
        let result = TrendClassifier::new().classify_with_polarity(&falling_bp, MetricPolarity::LowerIsBetter);
        assert_eq!(result.label, TrendLabel::Improving);
        assert!(result.percent_change < 0.0);
    }

    #[test]
    fn test_classify_dated_orders_samples() {
        let day = |d| NaiveDate::from_ymd_opt(2024, 2, d).unwrap();
        let samples: Vec<MetricSample> = [(6, 12.0), (1, 10.0), (5, 12.0), (2, 10.0), (4, 12.0), (3, 10.0)]
            .into_iter()
            .map(|(d, value)| MetricSample { recorded_on: day(d), value })
            .collect();

        let result = TrendClassifier::new().classify_dated(&samples, MetricPolarity::HigherIsBetter);
        assert_eq!(result.label, TrendLabel::Improving);
    }

    #[test]
    fn test_custom_min_samples() {
        let classifier = TrendClassifier::with_config(TrendConfig {
            min_samples: 4,
            threshold_percent: 5.0,
        });
        let result = classifier.classify(&[1.0, 1.0, 2.0, 2.0]);
        assert_eq!(result.label, TrendLabel::Improving);
    }

    #[test]
    fn test_parse_metric_value() {
        assert_eq!(parse_metric_value("120/80"), Some(120.0));
        assert_eq!(parse_metric_value(" 72.5 "), Some(72.5));
        assert_eq!(parse_metric_value("n/a"), None);
        assert_eq!(parse_metric_value(""), None);
        assert_eq!(parse_metric_value("NaN"), None);
    }
}
