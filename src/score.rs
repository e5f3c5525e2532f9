//! Health score
//!
//! Combines the goal consistency of steps, calories, active minutes and sleep
//! into one 0-100 score. Equal weights are the default; a `ScoreWeights` value
//! from configuration can shift the balance.

use crate::aggregate::round_half_up;
use crate::consistency::GoalConsistencyScorer;
use crate::error::EngineError;
use crate::goals::GoalSet;
use crate::types::{ConsistencyBreakdown, DailyMetricRecord};
use serde::{Deserialize, Serialize};

/// Relative weight of each scored metric
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    pub steps: f64,
    pub calories: f64,
    pub active_minutes: f64,
    pub sleep: f64,
}

impl Default for ScoreWeights {
    /// Equal weighting: the score is the plain mean of the four consistencies
    fn default() -> Self {
        Self {
            steps: 1.0,
            calories: 1.0,
            active_minutes: 1.0,
            sleep: 1.0,
        }
    }
}

impl ScoreWeights {
    /// Weights must be finite, non-negative and not all zero
    pub fn validate(&self) -> Result<(), EngineError> {
        let all = [self.steps, self.calories, self.active_minutes, self.sleep];
        if all.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(EngineError::InvalidWeights(format!(
                "weights must be finite and non-negative, got {all:?}"
            )));
        }
        if self.total() <= 0.0 {
            return Err(EngineError::InvalidWeights(
                "at least one weight must be positive".to_string(),
            ));
        }
        Ok(())
    }

    fn total(&self) -> f64 {
        self.steps + self.calories + self.active_minutes + self.sleep
    }
}

/// Qualitative band of a score, used for dashboard coloring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreBand {
    Excellent,
    Good,
    Fair,
    NeedsAttention,
}

impl ScoreBand {
    pub fn from_score(score: u32) -> Self {
        match score {
            80.. => ScoreBand::Excellent,
            60..=79 => ScoreBand::Good,
            40..=59 => ScoreBand::Fair,
            _ => ScoreBand::NeedsAttention,
        }
    }
}

/// Calculator for the 0-100 health score
pub struct HealthScoreCalculator;

impl HealthScoreCalculator {
    /// Equal-weight score of `rows` against `goals`; 0 for no rows
    pub fn score(rows: &[DailyMetricRecord], goals: &GoalSet) -> u32 {
        Self::score_with_weights(rows, goals, &ScoreWeights::default())
    }

    /// Weighted score of `rows` against `goals`, with unset goals at their defaults
    pub fn score_with_weights(
        rows: &[DailyMetricRecord],
        goals: &GoalSet,
        weights: &ScoreWeights,
    ) -> u32 {
        let breakdown = GoalConsistencyScorer::breakdown(rows, goals);
        Self::combine(&breakdown, weights)
    }

    /// Weighted mean of a consistency breakdown, rounded and clamped to 0-100.
    ///
    /// Weights that fail validation fall back to equal weighting.
    pub fn combine(breakdown: &ConsistencyBreakdown, weights: &ScoreWeights) -> u32 {
        let weights = if weights.validate().is_ok() {
            *weights
        } else {
            ScoreWeights::default()
        };
        let weighted = f64::from(breakdown.steps) * weights.steps
            + f64::from(breakdown.calories) * weights.calories
            + f64::from(breakdown.active_minutes) * weights.active_minutes
            + f64::from(breakdown.sleep) * weights.sleep;
        round_half_up(weighted / weights.total()).clamp(0.0, 100.0) as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn week_of_rows(steps: u32, calories: f64, active: u32, sleep: f64) -> Vec<DailyMetricRecord> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        (0..7)
            .map(|i| DailyMetricRecord {
                steps,
                calories_burned: calories,
                active_minutes: active,
                sleep_hours: sleep,
                ..DailyMetricRecord::empty(start + Duration::days(i))
            })
            .collect()
    }

    #[test]
    fn test_empty_rows_score_zero() {
        assert_eq!(HealthScoreCalculator::score(&[], &GoalSet::default()), 0);
        let strict = GoalSet {
            steps_goal: 1,
            ..GoalSet::default()
        };
        assert_eq!(HealthScoreCalculator::score(&[], &strict), 0);
    }

    #[test]
    fn test_equal_weight_score() {
        // Sleep misses its 8h goal every day, everything else hits
        let rows = week_of_rows(12_000, 600.0, 40, 7.5);
        assert_eq!(HealthScoreCalculator::score(&rows, &GoalSet::default()), 75);
    }

    #[test]
    fn test_all_goals_met() {
        let rows = week_of_rows(10_000, 500.0, 30, 8.0);
        assert_eq!(HealthScoreCalculator::score(&rows, &GoalSet::default()), 100);
    }

    #[test]
    fn test_custom_weights_shift_score() {
        let rows = week_of_rows(12_000, 600.0, 40, 7.5);
        let sleep_heavy = ScoreWeights {
            sleep: 4.0,
            ..ScoreWeights::default()
        };
        // (100 + 100 + 100 + 0 * 4) / 7 = 42.86 -> 43
        assert_eq!(
            HealthScoreCalculator::score_with_weights(&rows, &GoalSet::default(), &sleep_heavy),
            43
        );

        let steps_only = ScoreWeights {
            steps: 1.0,
            calories: 0.0,
            active_minutes: 0.0,
            sleep: 0.0,
        };
        assert_eq!(
            HealthScoreCalculator::score_with_weights(&rows, &GoalSet::default(), &steps_only),
            100
        );
    }

    #[test]
    fn test_invalid_weights_fall_back_to_equal() {
        let zero = ScoreWeights {
            steps: 0.0,
            calories: 0.0,
            active_minutes: 0.0,
            sleep: 0.0,
        };
        assert!(zero.validate().is_err());
        let negative = ScoreWeights {
            steps: -1.0,
            ..ScoreWeights::default()
        };
        assert!(negative.validate().is_err());

        let rows = week_of_rows(12_000, 600.0, 40, 7.5);
        assert_eq!(
            HealthScoreCalculator::score_with_weights(&rows, &GoalSet::default(), &zero),
            75
        );
    }

    #[test]
    fn test_zero_goals_are_not_free_hits() {
        let idle = vec![DailyMetricRecord::empty(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap())];
        let unset = GoalSet {
            steps_goal: 0,
            calories_goal: 0.0,
            active_minutes_goal: 0,
            sleep_goal: 0.0,
            ..GoalSet::default()
        };
        assert_eq!(HealthScoreCalculator::score(&idle, &unset), 0);

        let broken_sleep = GoalSet {
            sleep_goal: f64::NAN,
            ..GoalSet::default()
        };
        let rows = week_of_rows(12_000, 600.0, 40, 7.5);
        assert_eq!(HealthScoreCalculator::score(&rows, &broken_sleep), 75);

        let negative_sleep = GoalSet {
            sleep_goal: -2.0,
            ..GoalSet::default()
        };
        assert_eq!(HealthScoreCalculator::score(&rows, &negative_sleep), 75);
    }

    #[test]
    fn test_score_bands() {
        assert_eq!(ScoreBand::from_score(100), ScoreBand::Excellent);
        assert_eq!(ScoreBand::from_score(80), ScoreBand::Excellent);
        assert_eq!(ScoreBand::from_score(79), ScoreBand::Good);
        assert_eq!(ScoreBand::from_score(60), ScoreBand::Good);
        assert_eq!(ScoreBand::from_score(40), ScoreBand::Fair);
        assert_eq!(ScoreBand::from_score(39), ScoreBand::NeedsAttention);
        assert_eq!(ScoreBand::from_score(0), ScoreBand::NeedsAttention);
    }
}
