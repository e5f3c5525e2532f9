//! pulsefit.daily_row.v1 schema definition
//!
//! The loose shape daily rows arrive in from storage: every metric optional,
//! legacy key names accepted. Rows are validated here and turned into typed
//! `DailyMetricRecord`s exactly once.

use crate::error::ValidationError;
use crate::types::DailyMetricRecord;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Current row schema version
pub const SCHEMA_VERSION: &str = "pulsefit.daily_row.v1";

/// Calendar date format of the `date` field
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A daily row as stored by the ingestion pipeline
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawDailyRow {
    /// Owning user, when rows for several users share a file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    /// Reporting-timezone-local date (YYYY-MM-DD)
    pub date: String,
    #[serde(default)]
    pub steps: Option<f64>,
    #[serde(default)]
    pub active_minutes: Option<f64>,
    #[serde(default, alias = "calories")]
    pub calories_burned: Option<f64>,
    #[serde(default)]
    pub distance_meters: Option<f64>,
    #[serde(default)]
    pub heart_rate_avg: Option<f64>,
    #[serde(default)]
    pub heart_rate_min: Option<f64>,
    #[serde(default)]
    pub heart_rate_max: Option<f64>,
    #[serde(default, alias = "sleep_duration_hours")]
    pub sleep_hours: Option<f64>,
}

impl RawDailyRow {
    /// Create a row with only a date set
    pub fn new(date: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            ..Default::default()
        }
    }

    /// Parse and check the date
    pub fn parse_date(&self) -> Result<NaiveDate, ValidationError> {
        let trimmed = self.date.trim();
        // Fixed width keeps string order equal to date order
        if trimmed.len() != 10 {
            return Err(ValidationError::MalformedDate(self.date.clone()));
        }
        NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
            .map_err(|_| ValidationError::MalformedDate(self.date.clone()))
    }

    /// Validate the row against the schema
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.parse_date()?;
        for (field, value) in self.numeric_fields() {
            if let Some(v) = value {
                if !v.is_finite() || v < 0.0 {
                    return Err(ValidationError::NegativeOrNonFinite { field, value: v });
                }
            }
        }
        Ok(())
    }

    /// Convert into a typed record; missing metrics become 0
    pub fn to_record(&self) -> Result<DailyMetricRecord, ValidationError> {
        self.validate()?;
        Ok(DailyMetricRecord {
            date: self.parse_date()?,
            steps: whole(self.steps),
            active_minutes: whole(self.active_minutes),
            calories_burned: self.calories_burned.unwrap_or(0.0),
            distance_meters: self.distance_meters.unwrap_or(0.0),
            heart_rate_avg: whole(self.heart_rate_avg),
            heart_rate_min: whole(self.heart_rate_min),
            heart_rate_max: whole(self.heart_rate_max),
            sleep_hours: self.sleep_hours.unwrap_or(0.0),
        })
    }

    fn numeric_fields(&self) -> [(&'static str, Option<f64>); 8] {
        [
            ("steps", self.steps),
            ("active_minutes", self.active_minutes),
            ("calories_burned", self.calories_burned),
            ("distance_meters", self.distance_meters),
            ("heart_rate_avg", self.heart_rate_avg),
            ("heart_rate_min", self.heart_rate_min),
            ("heart_rate_max", self.heart_rate_max),
            ("sleep_hours", self.sleep_hours),
        ]
    }
}

/// Round a validated non-negative value to a whole count
fn whole(value: Option<f64>) -> u32 {
    let v = value.unwrap_or(0.0);
    crate::aggregate::round_half_up(v).min(f64::from(u32::MAX)) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_legacy_keys() {
        let json = r#"{
            "date": "2024-01-15",
            "steps": 8500,
            "calories": 420.5,
            "distance_meters": 6100,
            "heart_rate_avg": 71,
            "active_minutes": 35,
            "sleep_duration_hours": 7.2
        }"#;
        let row: RawDailyRow = serde_json::from_str(json).unwrap();
        assert_eq!(row.calories_burned, Some(420.5));
        assert_eq!(row.sleep_hours, Some(7.2));
        assert_eq!(row.heart_rate_min, None);

        let record = row.to_record().unwrap();
        assert_eq!(record.steps, 8500);
        assert_eq!(record.heart_rate_avg, 71);
        assert_eq!(record.heart_rate_max, 0);
        assert_eq!(record.sleep_hours, 7.2);
    }

    #[test]
    fn test_nulls_become_zero() {
        let json = r#"{"date": "2024-01-15", "steps": null, "sleep_hours": null}"#;
        let row: RawDailyRow = serde_json::from_str(json).unwrap();
        let record = row.to_record().unwrap();
        assert_eq!(record, DailyMetricRecord::empty(record.date));
    }

    #[test]
    fn test_rejects_malformed_dates() {
        for bad in ["2024-1-5", "15/01/2024", "2024-02-30", "", "2024-01-15T00:00:00Z"] {
            let row = RawDailyRow::new(bad);
            assert_eq!(
                row.validate(),
                Err(ValidationError::MalformedDate(bad.to_string())),
                "{bad}"
            );
        }
    }

    #[test]
    fn test_rejects_negative_values() {
        let row = RawDailyRow {
            steps: Some(-3.0),
            ..RawDailyRow::new("2024-01-15")
        };
        assert_eq!(
            row.validate(),
            Err(ValidationError::NegativeOrNonFinite {
                field: "steps",
                value: -3.0
            })
        );

        let row = RawDailyRow {
            sleep_hours: Some(f64::INFINITY),
            ..RawDailyRow::new("2024-01-15")
        };
        assert!(row.validate().is_err());
    }

    #[test]
    fn test_fractional_counts_are_rounded() {
        let row = RawDailyRow {
            steps: Some(1234.5),
            active_minutes: Some(29.4),
            ..RawDailyRow::new("2024-01-15")
        };
        let record = row.to_record().unwrap();
        assert_eq!(record.steps, 1235);
        assert_eq!(record.active_minutes, 29);
    }
}
