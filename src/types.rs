//! Core types for the Pulsefit engine
//!
//! This module defines the data structures that flow through the engine: typed
//! daily records, period windows, aggregates, comparisons and the dashboard summary.

use crate::error::EngineError;
use crate::goals::PeriodGoals;
use crate::score::ScoreBand;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One day of metrics for one user, normalized at the ingestion boundary.
///
/// Heart-rate fields use 0 to mean "no reading".
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyMetricRecord {
    /// Reporting-timezone-local calendar date
    pub date: NaiveDate,
    pub steps: u32,
    pub active_minutes: u32,
    /// Calories burned (kcal)
    pub calories_burned: f64,
    pub distance_meters: f64,
    /// Average heart rate (bpm)
    pub heart_rate_avg: u32,
    pub heart_rate_min: u32,
    pub heart_rate_max: u32,
    pub sleep_hours: f64,
}

impl DailyMetricRecord {
    /// An all-zero record for the given date
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            steps: 0,
            active_minutes: 0,
            calories_burned: 0.0,
            distance_meters: 0.0,
            heart_rate_avg: 0,
            heart_rate_min: 0,
            heart_rate_max: 0,
            sleep_hours: 0.0,
        }
    }

    /// Whether the record carries a heart-rate reading
    pub fn has_heart_rate(&self) -> bool {
        self.heart_rate_avg > 0
    }
}

/// Named aggregation granularity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Day,
    Week,
    Month,
}

impl Period {
    pub fn as_str(&self) -> &'static str {
        match self {
            Period::Day => "day",
            Period::Week => "week",
            Period::Month => "month",
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Period {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "day" => Ok(Period::Day),
            "week" => Ok(Period::Week),
            "month" => Ok(Period::Month),
            other => Err(EngineError::ParseError(format!("unknown period '{other}'"))),
        }
    }
}

/// Inclusive calendar-date window in the reporting timezone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl PeriodWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Single-day window
    pub fn single(date: NaiveDate) -> Self {
        Self {
            start: date,
            end: date,
        }
    }

    /// Inclusive on both ends
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Number of calendar days covered
    pub fn days(&self) -> u32 {
        ((self.end - self.start).num_days() + 1).max(0) as u32
    }

    /// Every calendar date in the window, in order
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        self.start.iter_days().take_while(move |d| *d <= end)
    }
}

impl fmt::Display for PeriodWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}..{}",
            self.start.format("%Y-%m-%d"),
            self.end.format("%Y-%m-%d")
        )
    }
}

/// Period-level summary of a window of records
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Aggregate {
    pub total_steps: u64,
    /// Kilometers, rounded to 1 decimal
    pub total_distance_km: f64,
    pub total_calories: f64,
    /// Mean over days with a reading, rounded to whole bpm
    pub avg_heart_rate: u32,
    pub total_active_minutes: u64,
    /// Rounded to 1 decimal
    pub avg_sleep_hours: f64,
}

/// Metric selector used by consistency scoring and trend views
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    Steps,
    Calories,
    ActiveMinutes,
    Sleep,
    Distance,
    HeartRate,
}

impl MetricKind {
    /// The four metrics that feed the health score
    pub const SCORED: [MetricKind; 4] = [
        MetricKind::Steps,
        MetricKind::Calories,
        MetricKind::ActiveMinutes,
        MetricKind::Sleep,
    ];

    /// Read this metric from a record as a plain number
    pub fn value(&self, record: &DailyMetricRecord) -> f64 {
        match self {
            MetricKind::Steps => f64::from(record.steps),
            MetricKind::Calories => record.calories_burned,
            MetricKind::ActiveMinutes => f64::from(record.active_minutes),
            MetricKind::Sleep => record.sleep_hours,
            MetricKind::Distance => record.distance_meters,
            MetricKind::HeartRate => f64::from(record.heart_rate_avg),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MetricKind::Steps => "steps",
            MetricKind::Calories => "calories",
            MetricKind::ActiveMinutes => "active_minutes",
            MetricKind::Sleep => "sleep",
            MetricKind::Distance => "distance",
            MetricKind::HeartRate => "heart_rate",
        }
    }
}

/// Per-day means over a window, used as the "previous period" reference line
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyAverages {
    pub days: u32,
    pub steps: i64,
    pub calories: i64,
    pub active_minutes: i64,
    pub distance_meters: i64,
    pub heart_rate: i64,
    /// Rounded to 2 decimals
    pub sleep_hours: f64,
}

/// A run of up to seven consecutive rows, used by the month view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyBucket {
    /// 1-based position within the window
    pub index: u32,
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
    pub days: u32,
    pub steps: u64,
    pub calories: f64,
    pub active_minutes: u64,
    pub distance_meters: f64,
    pub heart_rate: i64,
    pub sleep_hours: f64,
}

/// Percent change of every aggregate field against the previous period
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateVariation {
    pub steps: i64,
    pub distance: i64,
    pub calories: i64,
    pub heart_rate: i64,
    pub active_minutes: i64,
    pub sleep: i64,
}

/// Current vs previous period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodComparison {
    pub period: Period,
    pub current_window: PeriodWindow,
    pub previous_window: PeriodWindow,
    pub current: Aggregate,
    pub previous: Aggregate,
    pub variation: AggregateVariation,
}

/// Per-metric goal consistency percentages (0-100)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsistencyBreakdown {
    pub steps: u32,
    pub calories: u32,
    pub active_minutes: u32,
    pub sleep: u32,
}

/// Progress toward period goals (0-100, capped)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalProgress {
    pub steps: u32,
    pub calories: u32,
    pub active_minutes: u32,
    pub sleep: u32,
}

/// Everything the dashboard renders for one period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub period: Period,
    pub reporting_timezone: String,
    pub window: PeriodWindow,
    pub previous_window: PeriodWindow,
    /// Rows found inside the current window
    pub days_with_data: u32,
    pub current: Aggregate,
    pub previous: Aggregate,
    pub variation: AggregateVariation,
    pub consistency: ConsistencyBreakdown,
    pub score: u32,
    pub band: ScoreBand,
    pub goals: PeriodGoals,
    pub progress: GoalProgress,
    /// Per-day means of the previous window, absent when it has no rows
    pub previous_daily_averages: Option<DailyAverages>,
    /// Seven-day buckets, only filled for month summaries
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub weekly_buckets: Vec<WeeklyBucket>,
}

/// Producer metadata attached to encoded summaries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryProducer {
    pub name: String,
    pub version: String,
    pub instance_id: String,
}

/// Encoded summary envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryPayload {
    pub schema_version: String,
    pub producer: SummaryProducer,
    pub computed_at_utc: String,
    pub summary: DashboardSummary,
}
