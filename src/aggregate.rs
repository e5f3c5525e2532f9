//! Metric aggregation
//!
//! This module reduces daily records into period-level statistics:
//! - Window totals and averages (`Aggregate`)
//! - Per-day means used as the comparison reference
//! - Seven-day buckets for the month view

use crate::types::{Aggregate, DailyAverages, DailyMetricRecord, PeriodWindow, WeeklyBucket};

/// Rows per bucket in the month view
pub const BUCKET_DAYS: usize = 7;

/// Aggregator for reducing daily records
pub struct MetricAggregator;

impl MetricAggregator {
    /// Summarize the rows that fall inside `window` (inclusive on both ends).
    ///
    /// An empty window yields a zero-valued aggregate.
    pub fn aggregate(rows: &[DailyMetricRecord], window: &PeriodWindow) -> Aggregate {
        let in_window = Self::rows_in_window(rows, window);
        summarize(&in_window)
    }

    /// Rows inside `window`, input order preserved
    pub fn rows_in_window(
        rows: &[DailyMetricRecord],
        window: &PeriodWindow,
    ) -> Vec<DailyMetricRecord> {
        rows.iter()
            .filter(|r| window.contains(r.date))
            .copied()
            .collect()
    }

    /// Per-day means over `rows`, or `None` when there are no rows
    pub fn daily_averages(rows: &[DailyMetricRecord]) -> Option<DailyAverages> {
        if rows.is_empty() {
            return None;
        }
        let days = rows.len() as f64;

        let steps: f64 = rows.iter().map(|r| f64::from(r.steps)).sum();
        let calories: f64 = rows.iter().map(|r| r.calories_burned).sum();
        let active: f64 = rows.iter().map(|r| f64::from(r.active_minutes)).sum();
        let distance: f64 = rows.iter().map(|r| r.distance_meters).sum();
        let sleep: f64 = rows.iter().map(|r| r.sleep_hours).sum();

        Some(DailyAverages {
            days: rows.len() as u32,
            steps: round_half_up(steps / days) as i64,
            calories: round_half_up(calories / days) as i64,
            active_minutes: round_half_up(active / days) as i64,
            distance_meters: round_half_up(distance / days) as i64,
            heart_rate: mean_heart_rate(rows) as i64,
            sleep_hours: round_dp(sleep / days, 2),
        })
    }

    /// Split rows into consecutive runs of seven for the month view.
    ///
    /// The last bucket holds whatever remains.
    pub fn weekly_buckets(rows: &[DailyMetricRecord]) -> Vec<WeeklyBucket> {
        rows.chunks(BUCKET_DAYS)
            .enumerate()
            .filter_map(|(i, chunk)| {
                let first = chunk.first()?;
                let last = chunk.last()?;
                let sleep: f64 = chunk.iter().map(|r| r.sleep_hours).sum();
                Some(WeeklyBucket {
                    index: i as u32 + 1,
                    first_date: first.date,
                    last_date: last.date,
                    days: chunk.len() as u32,
                    steps: chunk.iter().map(|r| u64::from(r.steps)).sum(),
                    calories: chunk.iter().map(|r| r.calories_burned).sum(),
                    active_minutes: chunk.iter().map(|r| u64::from(r.active_minutes)).sum(),
                    distance_meters: chunk.iter().map(|r| r.distance_meters).sum(),
                    heart_rate: mean_heart_rate(chunk) as i64,
                    sleep_hours: round_dp(sleep / chunk.len() as f64, 2),
                })
            })
            .collect()
    }
}

fn summarize(rows: &[DailyMetricRecord]) -> Aggregate {
    if rows.is_empty() {
        return Aggregate::default();
    }

    let total_meters: f64 = rows.iter().map(|r| r.distance_meters).sum();
    let total_sleep: f64 = rows.iter().map(|r| r.sleep_hours).sum();

    Aggregate {
        total_steps: rows.iter().map(|r| u64::from(r.steps)).sum(),
        total_distance_km: round_dp(total_meters / 1000.0, 1),
        total_calories: rows.iter().map(|r| r.calories_burned).sum(),
        avg_heart_rate: mean_heart_rate(rows),
        total_active_minutes: rows.iter().map(|r| u64::from(r.active_minutes)).sum(),
        avg_sleep_hours: round_dp(total_sleep / rows.len() as f64, 1),
    }
}

/// Mean heart rate over rows that carry a reading; 0 when none do
fn mean_heart_rate(rows: &[DailyMetricRecord]) -> u32 {
    let (sum, count) = rows
        .iter()
        .filter(|r| r.has_heart_rate())
        .fold((0u64, 0u64), |(sum, count), r| {
            (sum + u64::from(r.heart_rate_avg), count + 1)
        });
    if count == 0 {
        return 0;
    }
    round_half_up(sum as f64 / count as f64) as u32
}

/// Round to the nearest integer, halves toward positive infinity
pub(crate) fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

/// Round to `decimals` places, halves toward positive infinity
pub(crate) fn round_dp(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    round_half_up(value * factor) / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};
    use pretty_assertions::assert_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn make_record(date: NaiveDate, steps: u32, hr: u32, sleep: f64) -> DailyMetricRecord {
        DailyMetricRecord {
            steps,
            active_minutes: 30,
            calories_burned: 400.0,
            distance_meters: 5250.0,
            heart_rate_avg: hr,
            sleep_hours: sleep,
            ..DailyMetricRecord::empty(date)
        }
    }

    fn january_week() -> Vec<DailyMetricRecord> {
        (0..7)
            .map(|i| make_record(date(2024, 1, 1) + Duration::days(i), 8000, 70, 7.0))
            .collect()
    }

    #[test]
    fn test_aggregate_week() {
        let rows = january_week();
        let window = PeriodWindow::new(date(2024, 1, 1), date(2024, 1, 7));
        let agg = MetricAggregator::aggregate(&rows, &window);

        assert_eq!(
            agg,
            Aggregate {
                total_steps: 56_000,
                // 7 * 5.25 km = 36.75 -> 36.8
                total_distance_km: 36.8,
                total_calories: 2800.0,
                avg_heart_rate: 70,
                total_active_minutes: 210,
                avg_sleep_hours: 7.0,
            }
        );
    }

    #[test]
    fn test_window_is_inclusive_on_both_ends() {
        let rows = january_week();
        let window = PeriodWindow::new(date(2024, 1, 2), date(2024, 1, 4));
        let agg = MetricAggregator::aggregate(&rows, &window);
        assert_eq!(agg.total_steps, 24_000);

        let in_window = MetricAggregator::rows_in_window(&rows, &window);
        let dates: Vec<_> = in_window.iter().map(|r| r.date).collect();
        assert_eq!(dates, vec![date(2024, 1, 2), date(2024, 1, 3), date(2024, 1, 4)]);
    }

    #[test]
    fn test_empty_window_is_zero() {
        let rows = january_week();
        let window = PeriodWindow::single(date(2024, 2, 1));
        assert_eq!(MetricAggregator::aggregate(&rows, &window), Aggregate::default());
        assert_eq!(MetricAggregator::aggregate(&[], &window), Aggregate::default());
    }

    #[test]
    fn test_heart_rate_ignores_missing_readings() {
        let rows = vec![
            make_record(date(2024, 1, 1), 1000, 60, 8.0),
            make_record(date(2024, 1, 2), 1000, 0, 8.0),
            make_record(date(2024, 1, 3), 1000, 71, 8.0),
        ];
        let window = PeriodWindow::new(date(2024, 1, 1), date(2024, 1, 3));
        let agg = MetricAggregator::aggregate(&rows, &window);
        // (60 + 71) / 2 = 65.5 -> 66
        assert_eq!(agg.avg_heart_rate, 66);

        let no_readings: Vec<_> = rows
            .iter()
            .map(|r| DailyMetricRecord {
                heart_rate_avg: 0,
                ..*r
            })
            .collect();
        assert_eq!(MetricAggregator::aggregate(&no_readings, &window).avg_heart_rate, 0);
    }

    #[test]
    fn test_sleep_average_counts_every_day() {
        let rows = vec![
            make_record(date(2024, 1, 1), 0, 0, 8.0),
            make_record(date(2024, 1, 2), 0, 0, 0.0),
            make_record(date(2024, 1, 3), 0, 0, 6.5),
        ];
        let window = PeriodWindow::new(date(2024, 1, 1), date(2024, 1, 3));
        // 14.5 / 3 = 4.833 -> 4.8
        assert_eq!(MetricAggregator::aggregate(&rows, &window).avg_sleep_hours, 4.8);
    }

    #[test]
    fn test_aggregate_is_idempotent() {
        let rows = january_week();
        let window = PeriodWindow::new(date(2024, 1, 3), date(2024, 1, 9));
        let first = MetricAggregator::aggregate(&rows, &window);
        let second = MetricAggregator::aggregate(&rows, &window);
        assert_eq!(first, second);
    }

    #[test]
    fn test_total_steps_matches_filtered_sum() {
        let rows: Vec<_> = (0..20)
            .map(|i| {
                make_record(date(2024, 1, 1) + Duration::days(i), 1000 + 37 * i as u32, 0, 0.0)
            })
            .collect();
        let window = PeriodWindow::new(date(2024, 1, 5), date(2024, 1, 12));
        let expected: u64 = rows
            .iter()
            .filter(|r| window.contains(r.date))
            .map(|r| u64::from(r.steps))
            .sum();
        assert_eq!(MetricAggregator::aggregate(&rows, &window).total_steps, expected);
    }

    #[test]
    fn test_daily_averages() {
        let rows = vec![
            make_record(date(2024, 1, 1), 9000, 64, 7.25),
            make_record(date(2024, 1, 2), 10001, 0, 8.0),
        ];
        let avg = MetricAggregator::daily_averages(&rows).unwrap();
        assert_eq!(avg.days, 2);
        // 9500.5 rounds up
        assert_eq!(avg.steps, 9501);
        assert_eq!(avg.calories, 400);
        assert_eq!(avg.heart_rate, 64);
        assert_eq!(avg.distance_meters, 5250);
        // 7.625 -> 7.63
        assert!((avg.sleep_hours - 7.63).abs() < 1e-9);

        assert!(MetricAggregator::daily_averages(&[]).is_none());
    }

    #[test]
    fn test_weekly_buckets_for_a_month() {
        let rows: Vec<_> = (0..31)
            .map(|i| make_record(date(2024, 1, 1) + Duration::days(i), 1000, 60, 7.0))
            .collect();
        let buckets = MetricAggregator::weekly_buckets(&rows);

        assert_eq!(buckets.len(), 5);
        assert_eq!(buckets[0].index, 1);
        assert_eq!(buckets[0].days, 7);
        assert_eq!(buckets[0].steps, 7000);
        assert_eq!(buckets[0].first_date, date(2024, 1, 1));
        assert_eq!(buckets[0].last_date, date(2024, 1, 7));
        assert_eq!(buckets[4].days, 3);
        assert_eq!(buckets[4].first_date, date(2024, 1, 29));
        assert_eq!(buckets[4].last_date, date(2024, 1, 31));
        assert_eq!(buckets[4].heart_rate, 60);
        assert_eq!(buckets[4].sleep_hours, 7.0);
    }

    #[test]
    fn test_rounding_helpers() {
        assert_eq!(round_half_up(2.5), 3.0);
        assert_eq!(round_half_up(-2.5), -2.0);
        assert_eq!(round_half_up(-0.4), 0.0);
        assert_eq!(round_dp(36.75, 1), 36.8);
        assert_eq!(round_dp(4.8333, 1), 4.8);
    }
}
