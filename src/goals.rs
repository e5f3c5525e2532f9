//! Goal configuration
//!
//! Per-user goal thresholds and the read-only store seam the engine pulls them
//! from. Persistence itself belongs to the surrounding application.

use crate::types::{Period, PeriodWindow};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const DEFAULT_STEPS_GOAL: u32 = 10_000;
pub const DEFAULT_SLEEP_GOAL_HOURS: f64 = 8.0;
pub const DEFAULT_ACTIVE_MINUTES_GOAL: u32 = 30;
pub const DEFAULT_CALORIES_GOAL: f64 = 500.0;

/// Daily goal thresholds for one user.
///
/// Accepts both snake_case keys and the camelCase keys used by older clients.
/// Any field left out takes its default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GoalSet {
    #[serde(alias = "stepsGoal")]
    pub steps_goal: u32,
    /// Hours per night
    #[serde(alias = "sleepGoal")]
    pub sleep_goal: f64,
    #[serde(alias = "activeMinutesGoal")]
    pub active_minutes_goal: u32,
    /// kcal per day
    #[serde(alias = "caloriesGoal")]
    pub calories_goal: f64,
    #[serde(alias = "heartRateGoal", skip_serializing_if = "Option::is_none")]
    pub heart_rate_goal: Option<u32>,
    /// Target body weight (kg)
    #[serde(alias = "weightGoal", skip_serializing_if = "Option::is_none")]
    pub weight_goal: Option<f64>,
}

impl Default for GoalSet {
    fn default() -> Self {
        Self {
            steps_goal: DEFAULT_STEPS_GOAL,
            sleep_goal: DEFAULT_SLEEP_GOAL_HOURS,
            active_minutes_goal: DEFAULT_ACTIVE_MINUTES_GOAL,
            calories_goal: DEFAULT_CALORIES_GOAL,
            heart_rate_goal: None,
            weight_goal: None,
        }
    }
}

/// Goal targets scaled to a period's totals
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PeriodGoals {
    pub period: Period,
    pub steps: f64,
    pub calories: f64,
    pub active_minutes: f64,
    /// Per night, never scaled
    pub sleep_hours: f64,
}

impl GoalSet {
    /// Replace zero, negative or non-finite thresholds with their defaults.
    ///
    /// Clients store 0 for "not set", so it is treated the same as a missing key.
    pub fn sanitized(mut self) -> Self {
        let defaults = GoalSet::default();
        if self.steps_goal == 0 {
            self.steps_goal = defaults.steps_goal;
        }
        if self.active_minutes_goal == 0 {
            self.active_minutes_goal = defaults.active_minutes_goal;
        }
        if !(self.sleep_goal.is_finite() && self.sleep_goal > 0.0) {
            self.sleep_goal = defaults.sleep_goal;
        }
        if !(self.calories_goal.is_finite() && self.calories_goal > 0.0) {
            self.calories_goal = defaults.calories_goal;
        }
        self.heart_rate_goal = self.heart_rate_goal.filter(|hr| *hr > 0);
        self.weight_goal = self.weight_goal.filter(|w| w.is_finite() && *w > 0.0);
        self
    }

    /// Targets for a whole window: daily totals times the window's day count
    pub fn for_window(&self, period: Period, window: &PeriodWindow) -> PeriodGoals {
        let days = f64::from(window.days());
        PeriodGoals {
            period,
            steps: f64::from(self.steps_goal) * days,
            calories: self.calories_goal * days,
            active_minutes: f64::from(self.active_minutes_goal) * days,
            sleep_hours: self.sleep_goal,
        }
    }
}

/// Read-only source of per-user goals
pub trait GoalStore {
    /// Goals for `user_id`, or the defaults when the user never set any
    fn goals_for(&self, user_id: &str) -> GoalSet;
}

/// Goal store backed by a map, loadable from JSON
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InMemoryGoalStore {
    goals: HashMap<String, GoalSet>,
}

impl InMemoryGoalStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, user_id: impl Into<String>, goals: GoalSet) {
        self.goals.insert(user_id.into(), goals.sanitized());
    }

    pub fn len(&self) -> usize {
        self.goals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.goals.is_empty()
    }

    /// Load goal store from JSON
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let mut store: Self = serde_json::from_str(json)?;
        for goals in store.goals.values_mut() {
            *goals = goals.clone().sanitized();
        }
        Ok(store)
    }

    /// Serialize goal store to JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl GoalStore for InMemoryGoalStore {
    fn goals_for(&self, user_id: &str) -> GoalSet {
        self.goals.get(user_id).cloned().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults_when_unset() {
        let goals: GoalSet = serde_json::from_str("{}").unwrap();
        assert_eq!(goals, GoalSet::default());
        assert_eq!(goals.steps_goal, 10_000);
        assert_eq!(goals.sleep_goal, 8.0);
        assert_eq!(goals.active_minutes_goal, 30);
        assert_eq!(goals.calories_goal, 500.0);
    }

    #[test]
    fn test_accepts_camel_case_keys() {
        let goals: GoalSet =
            serde_json::from_str(r#"{"stepsGoal": 12000, "sleepGoal": 7.5, "caloriesGoal": 650}"#)
                .unwrap();
        assert_eq!(goals.steps_goal, 12_000);
        assert_eq!(goals.sleep_goal, 7.5);
        assert_eq!(goals.calories_goal, 650.0);
        assert_eq!(goals.active_minutes_goal, DEFAULT_ACTIVE_MINUTES_GOAL);
    }

    #[test]
    fn test_sanitized_restores_defaults() {
        let goals = GoalSet {
            steps_goal: 0,
            sleep_goal: -1.0,
            active_minutes_goal: 45,
            calories_goal: f64::NAN,
            heart_rate_goal: Some(0),
            weight_goal: Some(72.5),
        }
        .sanitized();

        assert_eq!(goals.steps_goal, DEFAULT_STEPS_GOAL);
        assert_eq!(goals.sleep_goal, DEFAULT_SLEEP_GOAL_HOURS);
        assert_eq!(goals.active_minutes_goal, 45);
        assert_eq!(goals.calories_goal, DEFAULT_CALORIES_GOAL);
        assert_eq!(goals.heart_rate_goal, None);
        assert_eq!(goals.weight_goal, Some(72.5));
    }

    fn window(start: (i32, u32, u32), end: (i32, u32, u32)) -> PeriodWindow {
        PeriodWindow::new(
            NaiveDate::from_ymd_opt(start.0, start.1, start.2).unwrap(),
            NaiveDate::from_ymd_opt(end.0, end.1, end.2).unwrap(),
        )
    }

    #[test]
    fn test_window_goals_scale_totals_only() {
        let goals = GoalSet::default();
        let week = goals.for_window(Period::Week, &window((2024, 1, 1), (2024, 1, 7)));
        assert_eq!(week.steps, 70_000.0);
        assert_eq!(week.calories, 3_500.0);
        assert_eq!(week.active_minutes, 210.0);
        assert_eq!(week.sleep_hours, 8.0);

        let day = goals.for_window(Period::Day, &window((2024, 1, 1), (2024, 1, 1)));
        assert_eq!(day.steps, 10_000.0);
    }

    #[test]
    fn test_month_goals_follow_month_length() {
        let goals = GoalSet::default();
        let january = goals.for_window(Period::Month, &window((2024, 1, 1), (2024, 1, 31)));
        assert_eq!(january.steps, 310_000.0);
        assert_eq!(january.calories, 15_500.0);

        let february = goals.for_window(Period::Month, &window((2024, 2, 1), (2024, 2, 29)));
        assert_eq!(february.steps, 290_000.0);
        assert_eq!(february.active_minutes, 870.0);
    }

    #[test]
    fn test_store_falls_back_to_defaults() {
        let mut store = InMemoryGoalStore::new();
        store.insert(
            "user-1",
            GoalSet {
                steps_goal: 8_000,
                ..GoalSet::default()
            },
        );

        assert_eq!(store.goals_for("user-1").steps_goal, 8_000);
        assert_eq!(store.goals_for("someone-else"), GoalSet::default());
    }

    #[test]
    fn test_store_json_roundtrip() {
        let json = r#"{"goals": {"user-1": {"stepsGoal": 0, "sleepGoal": 7}}}"#;
        let store = InMemoryGoalStore::from_json(json).unwrap();
        let goals = store.goals_for("user-1");
        assert_eq!(goals.steps_goal, DEFAULT_STEPS_GOAL);
        assert_eq!(goals.sleep_goal, 7.0);

        let saved = store.to_json().unwrap();
        let loaded = InMemoryGoalStore::from_json(&saved).unwrap();
        assert_eq!(loaded.goals_for("user-1"), goals);
        assert_eq!(loaded.len(), 1);
    }
}
