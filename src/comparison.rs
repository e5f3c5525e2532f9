//! Period-over-period comparison
//!
//! Derives the window immediately before the current one and the percent change
//! between two aggregates. The previous aggregate is always recomputed from the
//! rows; nothing is cached between calls.

use crate::aggregate::{round_half_up, MetricAggregator};
use crate::calendar::ReportingCalendar;
use crate::types::{
    Aggregate, AggregateVariation, DailyMetricRecord, Period, PeriodComparison, PeriodWindow,
};
use chrono::{DateTime, Utc};

/// Comparison engine bound to a reporting calendar
#[derive(Debug, Clone, Copy, Default)]
pub struct ComparisonEngine {
    calendar: ReportingCalendar,
}

impl ComparisonEngine {
    pub fn new(calendar: ReportingCalendar) -> Self {
        Self { calendar }
    }

    /// Window of the period before the one containing `instant`
    pub fn previous_window(&self, period: Period, instant: DateTime<Utc>) -> PeriodWindow {
        self.calendar.previous(period, instant)
    }

    /// Smallest window covering both the previous and the current period.
    ///
    /// Loading exactly this span is enough for `compare`, whatever the month length.
    pub fn fetch_window(&self, period: Period, instant: DateTime<Utc>) -> PeriodWindow {
        let current = self.calendar.resolve(period, instant);
        let previous = self.calendar.previous(period, instant);
        PeriodWindow::new(previous.start, current.end)
    }

    /// Aggregate the current and previous periods and the change between them
    pub fn compare(
        &self,
        rows: &[DailyMetricRecord],
        period: Period,
        instant: DateTime<Utc>,
    ) -> PeriodComparison {
        let current_window = self.calendar.resolve(period, instant);
        let previous_window = self.previous_window(period, instant);
        let current = MetricAggregator::aggregate(rows, &current_window);
        let previous = MetricAggregator::aggregate(rows, &previous_window);

        PeriodComparison {
            period,
            current_window,
            previous_window,
            current,
            previous,
            variation: aggregate_variation(&current, &previous),
        }
    }
}

/// Percent change from `previous` to `current`.
///
/// A zero baseline reports 100 when there is new activity and 0 otherwise.
pub fn variation_percent(current: f64, previous: f64) -> i64 {
    if previous == 0.0 {
        return if current > 0.0 { 100 } else { 0 };
    }
    round_half_up((current - previous) / previous * 100.0) as i64
}

/// Field-by-field variation between two aggregates
pub fn aggregate_variation(current: &Aggregate, previous: &Aggregate) -> AggregateVariation {
    AggregateVariation {
        steps: variation_percent(current.total_steps as f64, previous.total_steps as f64),
        distance: variation_percent(current.total_distance_km, previous.total_distance_km),
        calories: variation_percent(current.total_calories, previous.total_calories),
        heart_rate: variation_percent(
            f64::from(current.avg_heart_rate),
            f64::from(previous.avg_heart_rate),
        ),
        active_minutes: variation_percent(
            current.total_active_minutes as f64,
            previous.total_active_minutes as f64,
        ),
        sleep: variation_percent(current.avg_sleep_hours, previous.avg_sleep_hours),
    }
}
