//! Goal consistency
//!
//! Consistency is the share of days in a set of records on which a metric met
//! its goal threshold, expressed as a whole percentage.

use crate::aggregate::round_half_up;
use crate::goals::GoalSet;
use crate::types::{ConsistencyBreakdown, DailyMetricRecord, MetricKind};

/// Scorer for per-metric goal consistency
pub struct GoalConsistencyScorer;

impl GoalConsistencyScorer {
    /// Percentage (0-100) of rows where `selector(row) >= threshold`.
    ///
    /// Returns 0 for an empty row set.
    pub fn consistency<F>(rows: &[DailyMetricRecord], threshold: f64, selector: F) -> u32
    where
        F: Fn(&DailyMetricRecord) -> f64,
    {
        if rows.is_empty() {
            return 0;
        }
        let hit_days = rows.iter().filter(|r| selector(r) >= threshold).count();
        round_half_up(hit_days as f64 / rows.len() as f64 * 100.0) as u32
    }

    /// Consistency of a named metric
    pub fn consistency_for(rows: &[DailyMetricRecord], kind: MetricKind, threshold: f64) -> u32 {
        Self::consistency(rows, threshold, |r| kind.value(r))
    }

    /// Consistency of the four scored metrics against their daily goals.
    ///
    /// Goals are sanitized first; a zero threshold would count every day as a hit.
    pub fn breakdown(rows: &[DailyMetricRecord], goals: &GoalSet) -> ConsistencyBreakdown {
        let goals = goals.clone().sanitized();
        ConsistencyBreakdown {
            steps: Self::consistency_for(rows, MetricKind::Steps, f64::from(goals.steps_goal)),
            calories: Self::consistency_for(rows, MetricKind::Calories, goals.calories_goal),
            active_minutes: Self::consistency_for(
                rows,
                MetricKind::ActiveMinutes,
                f64::from(goals.active_minutes_goal),
            ),
            sleep: Self::consistency_for(rows, MetricKind::Sleep, goals.sleep_goal),
        }
    }
}

impl ConsistencyBreakdown {
    pub fn get(&self, kind: MetricKind) -> Option<u32> {
        match kind {
            MetricKind::Steps => Some(self.steps),
            MetricKind::Calories => Some(self.calories),
            MetricKind::ActiveMinutes => Some(self.active_minutes),
            MetricKind::Sleep => Some(self.sleep),
            MetricKind::Distance | MetricKind::HeartRate => None,
        }
    }
}

/// Progress toward a goal as a whole percentage, capped at 100
pub fn goal_progress(value: f64, goal: f64) -> u32 {
    if !(goal.is_finite() && goal > 0.0) || !value.is_finite() || value <= 0.0 {
        return 0;
    }
    round_half_up((value / goal * 100.0).min(100.0)) as u32
}
