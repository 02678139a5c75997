//! Contiguity-weighted consistency scoring.
//!
//! A plain adherence rate treats seven scattered hits over a month the same
//! as a seven-day run. The consistency score rewards runs: each achieved day
//! contributes the length of the run it belongs to so far, capped so one long
//! run cannot dominate the score.

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// Tuning for [`ConsistencyScorer`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsistencyConfig {
    /// Maximum contribution of a single achieved day.
    #[serde(default = "default_run_cap")]
    pub run_cap: u32,
    /// Calibration constant: the average per-day contribution that maps to
    /// a score of 100.
    #[serde(default = "default_calibration_divisor")]
    pub calibration_divisor: f64,
}

fn default_run_cap() -> u32 {
    5
}
fn default_calibration_divisor() -> f64 {
    3.0
}

impl Default for ConsistencyConfig {
    fn default() -> Self {
        Self {
            run_cap: default_run_cap(),
            calibration_divisor: default_calibration_divisor(),
        }
    }
}

/// One day of a goal's history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyRecord {
    pub date: NaiveDate,
    pub achieved: bool,
}

/// Achieved rate for one day of the week.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekdayAdherence {
    pub weekday: Weekday,
    /// Recorded days falling on this weekday
    pub total: u32,
    /// Achieved days falling on this weekday
    pub achieved: u32,
    /// Ratio of achieved days (0.0 to 1.0)
    pub rate: f64,
}

/// Adherence bucketed Monday through Sunday.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyPattern {
    /// Always seven entries, Monday first.
    pub days: Vec<WeekdayAdherence>,
}

impl WeeklyPattern {
    /// Weekday with the highest rate among days that have records.
    /// Ties go to the earlier weekday.
    pub fn strongest_day(&self) -> Option<&WeekdayAdherence> {
        self.days
            .iter()
            .filter(|d| d.total > 0)
            .fold(None, |best: Option<&WeekdayAdherence>, d| match best {
                Some(b) if b.rate >= d.rate => Some(b),
                _ => Some(d),
            })
    }

    /// Weekday with the lowest rate among days that have records.
    /// Ties go to the earlier weekday.
    pub fn weakest_day(&self) -> Option<&WeekdayAdherence> {
        self.days
            .iter()
            .filter(|d| d.total > 0)
            .fold(None, |worst: Option<&WeekdayAdherence>, d| match worst {
                Some(w) if w.rate <= d.rate => Some(w),
                _ => Some(d),
            })
    }
}

/// Scores achieved/missed histories.
#[derive(Debug, Clone, Default)]
pub struct ConsistencyScorer {
    config: ConsistencyConfig,
}

impl ConsistencyScorer {
    /// Create a scorer with the default calibration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a scorer with a custom calibration.
    pub fn with_config(config: ConsistencyConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ConsistencyConfig {
        &self.config
    }

    /// Score a chronological history, one entry per day, from 0 to 100.
    ///
    /// An empty history scores 0.
    pub fn score(&self, history: &[bool]) -> u8 {
        self.score_iter(history.iter().copied(), history.len())
    }

    /// Score dated records; they are sorted by date first.
    pub fn score_records(&self, records: &[DailyRecord]) -> u8 {
        let mut sorted = records.to_vec();
        sorted.sort_by_key(|r| r.date);
        self.score_iter(sorted.iter().map(|r| r.achieved), sorted.len())
    }

    fn score_iter(&self, history: impl Iterator<Item = bool>, total_days: usize) -> u8 {
        if total_days == 0 || self.config.calibration_divisor <= 0.0 {
            return 0;
        }

        let mut run: u32 = 0;
        let mut accumulator: u64 = 0;
        for achieved in history {
            if achieved {
                run = run.saturating_add(1);
                accumulator += u64::from(run.min(self.config.run_cap));
            } else {
                run = 0;
            }
        }

        let ratio = accumulator as f64 / (total_days as f64 * self.config.calibration_divisor);
        (ratio * 100.0).round().clamp(0.0, 100.0) as u8
    }

    /// Bucket records by day of week.
    pub fn weekly_pattern(&self, records: &[DailyRecord]) -> WeeklyPattern {
        let mut builders = [WeekdayBuilder::default(); 7];
        for record in records {
            builders[record.date.weekday().num_days_from_monday() as usize].record(record.achieved);
        }

        let days = builders
            .iter()
            .enumerate()
            .map(|(index, builder)| builder.build(weekday_from_monday(index)))
            .collect();

        WeeklyPattern { days }
    }
}

fn weekday_from_monday(index: usize) -> Weekday {
    const WEEK: [Weekday; 7] = [
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
        Weekday::Sat,
        Weekday::Sun,
    ];
    WEEK[index % 7]
}

/// Helper struct for building weekday buckets
#[derive(Debug, Clone, Copy, Default)]
struct WeekdayBuilder {
    total: u32,
    achieved: u32,
}

impl WeekdayBuilder {
    fn record(&mut self, achieved: bool) {
        self.total += 1;
        if achieved {
            self.achieved += 1;
        }
    }

    fn build(&self, weekday: Weekday) -> WeekdayAdherence {
        let rate = if self.total > 0 {
            f64::from(self.achieved) / f64::from(self.total)
        } else {
            0.0
        };

        WeekdayAdherence {
            weekday,
            total: self.total,
            achieved: self.achieved,
            rate,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const T: bool = true;
    const F: bool = false;

    fn record(y: i32, m: u32, d: u32, achieved: bool) -> DailyRecord {
        DailyRecord {
            date: NaiveDate::from_ymd_opt(y, m, d).unwrap(),
            achieved,
        }
    }

    #[test]
    fn test_empty_history_scores_zero() {
        assert_eq!(ConsistencyScorer::new().score(&[]), 0);
    }

    #[test]
    fn test_all_missed_scores_zero() {
        assert_eq!(ConsistencyScorer::new().score(&[F; 10]), 0);
    }

    #[test]
    fn test_contiguous_beats_scattered() {
        let scorer = ConsistencyScorer::new();
        let contiguous = scorer.score(&[T, T, T, F, F, F, F]);
        let scattered = scorer.score(&[T, F, T, F, T, F, F]);
        // (1+2+3) / 21 and 3 / 21
        assert_eq!(contiguous, 29);
        assert_eq!(scattered, 14);
        assert!(contiguous >= scattered);
    }

    #[test]
    fn test_long_run_clamped_to_100() {
        assert_eq!(ConsistencyScorer::new().score(&[T; 30]), 100);
    }

    #[test]
    fn test_run_cap_limits_contribution() {
        let scorer = ConsistencyScorer::with_config(ConsistencyConfig {
            run_cap: 2,
            calibration_divisor: 3.0,
        });
        // 1 + 2 + 2 + 2 = 7 over 4 days
        assert_eq!(scorer.score(&[T, T, T, T]), 58);
    }

    #[test]
    fn test_invalid_divisor_scores_zero() {
        let scorer = ConsistencyScorer::with_config(ConsistencyConfig {
            run_cap: 5,
            calibration_divisor: 0.0,
        });
        assert_eq!(scorer.score(&[T, T]), 0);
    }

    #[test]
    fn test_score_records_sorts_by_date() {
        let scorer = ConsistencyScorer::new();
        let records = vec![
            record(2024, 1, 3, true),
            record(2024, 1, 1, true),
            record(2024, 1, 4, false),
            record(2024, 1, 2, true),
        ];
        assert_eq!(scorer.score_records(&records), scorer.score(&[T, T, T, F]));
    }

    #[test]
    fn test_weekly_pattern_buckets() {
        let scorer = ConsistencyScorer::new();
        // 2024-01-01 is a Monday
        let records = vec![
            record(2024, 1, 1, true),
            record(2024, 1, 8, true),
            record(2024, 1, 2, false),
            record(2024, 1, 9, true),
            record(2024, 1, 6, false),
        ];

        let pattern = scorer.weekly_pattern(&records);
        assert_eq!(pattern.days.len(), 7);
        assert_eq!(pattern.days[0].weekday, Weekday::Mon);
        assert_eq!(pattern.days[0].total, 2);
        assert_eq!(pattern.days[0].rate, 1.0);
        assert_eq!(pattern.days[1].rate, 0.5);
        assert_eq!(pattern.days[2].total, 0);

        assert_eq!(pattern.strongest_day().unwrap().weekday, Weekday::Mon);
        assert_eq!(pattern.weakest_day().unwrap().weekday, Weekday::Sat);
    }

    #[test]
    fn test_weekly_pattern_empty() {
        let pattern = ConsistencyScorer::new().weekly_pattern(&[]);
        assert_eq!(pattern.days.len(), 7);
        assert!(pattern.strongest_day().is_none());
        assert!(pattern.weakest_day().is_none());
    }
}
