//! Adapter for converting pulsefit.daily_row.v1 rows to typed records
//!
//! This is the ingestion boundary: JSON or NDJSON in, validated and date-sorted
//! `DailyMetricRecord`s out. Everything past this point can assume well-formed
//! numerics, a single user and one record per date.

use crate::error::{EngineError, ValidationError};
use crate::schema::raw_row::RawDailyRow;
use crate::types::DailyMetricRecord;
use chrono::NaiveDate;
use std::collections::HashSet;

/// Adapter for converting raw rows to typed records
pub struct RowAdapter;

impl RowAdapter {
    /// Parse a JSON string containing an array of rows
    pub fn parse_array(json: &str) -> Result<Vec<RawDailyRow>, EngineError> {
        let rows: Vec<RawDailyRow> = serde_json::from_str(json)?;
        Ok(rows)
    }

    /// Parse NDJSON (newline-delimited JSON) containing rows
    pub fn parse_ndjson(ndjson: &str) -> Result<Vec<RawDailyRow>, EngineError> {
        let mut rows = Vec::new();
        for (line_num, line) in ndjson.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            match serde_json::from_str::<RawDailyRow>(trimmed) {
                Ok(row) => rows.push(row),
                Err(e) => {
                    return Err(EngineError::ParseError(format!(
                        "Failed to parse line {}: {}",
                        line_num + 1,
                        e
                    )));
                }
            }
        }
        Ok(rows)
    }

    /// Rows tagged with `user_id`, for files that hold several users.
    ///
    /// Untagged rows are dropped, since they cannot be attributed.
    pub fn rows_for_user(rows: &[RawDailyRow], user_id: &str) -> Vec<RawDailyRow> {
        rows.iter()
            .filter(|row| row.user_id.as_deref() == Some(user_id))
            .cloned()
            .collect()
    }

    /// Convert rows to typed records sorted by date.
    ///
    /// Fails on the first invalid row, on rows tagged with two different users
    /// and on two rows sharing a date.
    pub fn to_records(rows: &[RawDailyRow]) -> Result<Vec<DailyMetricRecord>, EngineError> {
        let mut owner: Option<&str> = None;
        for row in rows {
            match (owner, row.user_id.as_deref()) {
                (Some(first), Some(second)) if first != second => {
                    tracing::warn!(first, second, "rows for several users in one batch");
                    return Err(EngineError::MixedUsers {
                        first: first.to_string(),
                        second: second.to_string(),
                    });
                }
                (None, Some(user)) => owner = Some(user),
                _ => {}
            }
        }

        let mut records = Vec::with_capacity(rows.len());
        for (index, row) in rows.iter().enumerate() {
            match row.to_record() {
                Ok(record) => records.push(record),
                Err(e) => {
                    tracing::warn!(index, date = %row.date, error = %e, "rejecting daily row");
                    return Err(EngineError::Validation(e));
                }
            }
        }

        records.sort_by_key(|r| r.date);

        if let Some(pair) = records.windows(2).find(|w| w[0].date == w[1].date) {
            let date = pair[0].date.format("%Y-%m-%d").to_string();
            tracing::warn!(%date, "duplicate daily row");
            return Err(EngineError::DuplicateDate(date));
        }

        Ok(records)
    }

    /// Parse a JSON array and convert it in one step
    pub fn records_from_json(json: &str) -> Result<Vec<DailyMetricRecord>, EngineError> {
        Self::to_records(&Self::parse_array(json)?)
    }

    /// Validate a batch of rows, returning only the failures.
    ///
    /// Besides per-row checks, a row fails when its date repeats an earlier valid
    /// row or its user differs from the first tagged row. Each row reports at most
    /// one failure.
    pub fn validate_rows(rows: &[RawDailyRow]) -> Vec<ValidationResult> {
        let owner = rows.iter().find_map(|row| row.user_id.as_deref());
        let mut seen: HashSet<NaiveDate> = HashSet::new();

        rows.iter()
            .enumerate()
            .filter_map(|(index, row)| {
                let error = match row.validate() {
                    Err(e) => e,
                    Ok(()) => Self::batch_error(row, owner, &mut seen)?,
                };
                Some(ValidationResult {
                    index,
                    date: row.date.clone(),
                    error,
                })
            })
            .collect()
    }

    fn batch_error(
        row: &RawDailyRow,
        owner: Option<&str>,
        seen: &mut HashSet<NaiveDate>,
    ) -> Option<ValidationError> {
        if let (Some(expected), Some(found)) = (owner, row.user_id.as_deref()) {
            if expected != found {
                return Some(ValidationError::MixedUser {
                    expected: expected.to_string(),
                    found: found.to_string(),
                });
            }
        }
        let date = row.parse_date().ok()?;
        if seen.insert(date) {
            None
        } else {
            Some(ValidationError::DuplicateDate(
                date.format("%Y-%m-%d").to_string(),
            ))
        }
    }
}

/// A row that failed validation
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationResult {
    pub index: usize,
    pub date: String,
    pub error: ValidationError,
}
