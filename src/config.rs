//! Engine configuration
//!
//! The only tunables are the reporting timezone and the score weights. Both have
//! defaults, so an empty JSON object is a valid configuration.

use crate::calendar::{ReportingCalendar, DEFAULT_REPORTING_TIMEZONE};
use crate::error::EngineError;
use crate::score::ScoreWeights;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// IANA timezone that defines calendar-day boundaries
    pub reporting_timezone: String,
    pub score_weights: ScoreWeights,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            reporting_timezone: DEFAULT_REPORTING_TIMEZONE.to_string(),
            score_weights: ScoreWeights::default(),
        }
    }
}

impl EngineConfig {
    /// Config with a different reporting timezone and default weights
    pub fn with_timezone(timezone: impl Into<String>) -> Self {
        Self {
            reporting_timezone: timezone.into(),
            ..Self::default()
        }
    }

    /// Check the timezone name and the weights
    pub fn validate(&self) -> Result<(), EngineError> {
        self.calendar()?;
        self.score_weights.validate()
    }

    /// Calendar for the configured reporting timezone
    pub fn calendar(&self) -> Result<ReportingCalendar, EngineError> {
        ReportingCalendar::from_name(&self.reporting_timezone)
    }

    /// Load config from JSON
    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize config to JSON
    pub fn to_json(&self) -> Result<String, EngineError> {
        serde_json::to_string_pretty(self).map_err(EngineError::JsonError)
    }
}
