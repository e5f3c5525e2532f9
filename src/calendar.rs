//! Reporting calendar
//!
//! Maps a period and a reference instant to an inclusive window of calendar dates.
//! Every conversion goes through one fixed IANA timezone, never the host locale,
//! so two callers on different machines always agree on where a day, week or
//! month begins.

use crate::error::EngineError;
use crate::types::{Period, PeriodWindow};
use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use chrono_tz::Tz;

/// Timezone the day boundaries are reported in unless configured otherwise
pub const DEFAULT_REPORTING_TIMEZONE: &str = "America/Sao_Paulo";

/// Calendar bound to a single reporting timezone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportingCalendar {
    tz: Tz,
}

impl Default for ReportingCalendar {
    fn default() -> Self {
        Self {
            tz: chrono_tz::America::Sao_Paulo,
        }
    }
}

impl ReportingCalendar {
    pub fn new(tz: Tz) -> Self {
        Self { tz }
    }

    /// Build a calendar from an IANA name such as "Europe/Lisbon"
    pub fn from_name(name: &str) -> Result<Self, EngineError> {
        name.parse::<Tz>()
            .map(Self::new)
            .map_err(|_| EngineError::InvalidTimezone(name.to_string()))
    }

    pub fn timezone(&self) -> Tz {
        self.tz
    }

    /// Local calendar date of an instant
    pub fn local_date(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.tz).date_naive()
    }

    /// Window of the period containing `instant`
    pub fn resolve(&self, period: Period, instant: DateTime<Utc>) -> PeriodWindow {
        let today = self.local_date(instant);
        match period {
            Period::Day => PeriodWindow::single(today),
            Period::Week => week_of(today),
            Period::Month => month_of(today),
        }
    }

    /// Window of the period immediately before the one containing `instant`
    pub fn previous(&self, period: Period, instant: DateTime<Utc>) -> PeriodWindow {
        let current = self.resolve(period, instant);
        match period {
            Period::Day => PeriodWindow::single(current.start - Duration::days(1)),
            Period::Week => {
                let end = current.start - Duration::days(1);
                PeriodWindow::new(end - Duration::days(6), end)
            }
            Period::Month => month_of(current.start - Duration::days(1)),
        }
    }
}

/// Monday..Sunday window containing `date`
pub fn week_of(date: NaiveDate) -> PeriodWindow {
    let offset = i64::from(date.weekday().num_days_from_monday());
    let start = date - Duration::days(offset);
    PeriodWindow::new(start, start + Duration::days(6))
}

/// First..last day of the month containing `date`
pub fn month_of(date: NaiveDate) -> PeriodWindow {
    let start = date - Duration::days(i64::from(date.day0()));
    let end = start + Duration::days(i64::from(days_in_month(date.year(), date.month())) - 1);
    PeriodWindow::new(start, end)
}

/// Actual length of a calendar month, leap years included
pub fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    match (
        NaiveDate::from_ymd_opt(year, month, 1),
        NaiveDate::from_ymd_opt(next_year, next_month, 1),
    ) {
        (Some(first), Some(next_first)) => (next_first - first).num_days() as u32,
        _ => 30,
    }
}
