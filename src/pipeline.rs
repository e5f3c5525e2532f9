//! Pipeline orchestration
//!
//! This module provides the public API for Pulsefit.
//! It runs the full flow for one dashboard request: window resolution,
//! aggregation, comparison, consistency and scoring.

use crate::aggregate::MetricAggregator;
use crate::calendar::ReportingCalendar;
use crate::comparison::ComparisonEngine;
use crate::config::EngineConfig;
use crate::consistency::{goal_progress, GoalConsistencyScorer};
use crate::encoder::SummaryEncoder;
use crate::error::EngineError;
use crate::goals::{GoalSet, GoalStore};
use crate::schema::RowAdapter;
use crate::score::{HealthScoreCalculator, ScoreBand, ScoreWeights};
use crate::types::{DailyMetricRecord, DashboardSummary, GoalProgress, Period, PeriodWindow};
use chrono::{DateTime, Utc};

/// Convert a JSON array of daily rows into an encoded dashboard summary.
///
/// Uses the default configuration (Sao Paulo reporting timezone, equal weights).
///
/// # Example
/// ```ignore
/// let json = rows_to_summary_json(rows_json, &GoalSet::default(), Period::Week, Utc::now())?;
/// ```
pub fn rows_to_summary_json(
    rows_json: &str,
    goals: &GoalSet,
    period: Period,
    instant: DateTime<Utc>,
) -> Result<String, EngineError> {
    let records = RowAdapter::records_from_json(rows_json)?;
    let engine = HealthEngine::default();
    let summary = engine.summarize(&records, goals, period, instant);
    SummaryEncoder::new().encode_to_json(&summary)
}

/// Stateless engine bound to one configuration.
///
/// Holds no per-call state, so a single instance can serve concurrent callers.
#[derive(Debug, Clone, Copy, Default)]
pub struct HealthEngine {
    calendar: ReportingCalendar,
    comparison: ComparisonEngine,
    weights: ScoreWeights,
}

impl HealthEngine {
    /// Create an engine from a validated configuration
    pub fn new(config: &EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;
        let calendar = config.calendar()?;
        Ok(Self {
            calendar,
            comparison: ComparisonEngine::new(calendar),
            weights: config.score_weights,
        })
    }

    pub fn calendar(&self) -> &ReportingCalendar {
        &self.calendar
    }

    pub fn weights(&self) -> &ScoreWeights {
        &self.weights
    }

    /// Window of the period containing `instant`
    pub fn resolve(&self, period: Period, instant: DateTime<Utc>) -> PeriodWindow {
        self.calendar.resolve(period, instant)
    }

    /// Window of the period before the one containing `instant`
    pub fn previous_window(&self, period: Period, instant: DateTime<Utc>) -> PeriodWindow {
        self.comparison.previous_window(period, instant)
    }

    /// Span of dates a caller must load before calling `summarize`
    pub fn fetch_window(&self, period: Period, instant: DateTime<Utc>) -> PeriodWindow {
        self.comparison.fetch_window(period, instant)
    }

    /// Configured-weight score over `rows`
    pub fn score(&self, rows: &[DailyMetricRecord], goals: &GoalSet) -> u32 {
        HealthScoreCalculator::score_with_weights(rows, goals, &self.weights)
    }

    /// Build the full dashboard summary for one period.
    ///
    /// `rows` may cover more than the period; only the current and previous
    /// windows are read. Unset or invalid goals take their defaults.
    pub fn summarize(
        &self,
        rows: &[DailyMetricRecord],
        goals: &GoalSet,
        period: Period,
        instant: DateTime<Utc>,
    ) -> DashboardSummary {
        let goals = goals.clone().sanitized();
        let comparison = self.comparison.compare(rows, period, instant);
        let current_rows = MetricAggregator::rows_in_window(rows, &comparison.current_window);
        let previous_rows = MetricAggregator::rows_in_window(rows, &comparison.previous_window);

        let consistency = GoalConsistencyScorer::breakdown(&current_rows, &goals);
        let score = HealthScoreCalculator::combine(&consistency, &self.weights);
        let period_goals = goals.for_window(period, &comparison.current_window);
        let current = comparison.current;

        let progress = GoalProgress {
            steps: goal_progress(current.total_steps as f64, period_goals.steps),
            calories: goal_progress(current.total_calories, period_goals.calories),
            active_minutes: goal_progress(
                current.total_active_minutes as f64,
                period_goals.active_minutes,
            ),
            sleep: goal_progress(current.avg_sleep_hours, period_goals.sleep_hours),
        };

        let weekly_buckets = match period {
            Period::Month => MetricAggregator::weekly_buckets(&current_rows),
            Period::Day | Period::Week => Vec::new(),
        };

        tracing::debug!(
            %period,
            window = %comparison.current_window,
            previous = %comparison.previous_window,
            days = current_rows.len(),
            score,
            "summarized period"
        );

        DashboardSummary {
            period,
            reporting_timezone: self.calendar.timezone().name().to_string(),
            window: comparison.current_window,
            previous_window: comparison.previous_window,
            days_with_data: current_rows.len() as u32,
            current,
            previous: comparison.previous,
            variation: comparison.variation,
            consistency,
            score,
            band: ScoreBand::from_score(score),
            goals: period_goals,
            progress,
            previous_daily_averages: MetricAggregator::daily_averages(&previous_rows),
            weekly_buckets,
        }
    }

    /// Same as `summarize`, with goals looked up for `user_id`
    pub fn summarize_for_user<S>(
        &self,
        store: &S,
        user_id: &str,
        rows: &[DailyMetricRecord],
        period: Period,
        instant: DateTime<Utc>,
    ) -> DashboardSummary
    where
        S: GoalStore + ?Sized,
    {
        let goals = store.goals_for(user_id);
        self.summarize(rows, &goals, period, instant)
    }
}
