//! Pulsefit - Aggregation and health-score engine for daily fitness metrics
//!
//! Pulsefit turns per-day activity rows into period statistics through a
//! deterministic flow: row ingestion → window resolution → aggregation →
//! period comparison → goal consistency → health score.
//!
//! ## Modules
//!
//! - **Engine**: calendar, aggregation, comparison, consistency and score, all pure
//!   functions of their inputs
//! - **Boundary**: row schema and adapter, goal store, configuration and the
//!   summary encoder

pub mod aggregate;
pub mod calendar;
pub mod comparison;
pub mod config;
pub mod consistency;
pub mod encoder;
pub mod error;
pub mod goals;
pub mod pipeline;
pub mod schema;
pub mod score;
pub mod types;

pub use aggregate::MetricAggregator;
pub use calendar::ReportingCalendar;
pub use comparison::{variation_percent, ComparisonEngine};
pub use config::EngineConfig;
pub use consistency::GoalConsistencyScorer;
pub use error::{EngineError, ValidationError};
pub use goals::{GoalSet, GoalStore, InMemoryGoalStore};
pub use pipeline::{rows_to_summary_json, HealthEngine};
pub use score::{HealthScoreCalculator, ScoreBand, ScoreWeights};
pub use types::{Aggregate, DailyMetricRecord, DashboardSummary, Period, PeriodWindow};

// Schema exports
pub use schema::{RawDailyRow, RowAdapter, SCHEMA_VERSION};

/// Pulsefit version embedded in all summary payloads
pub const PULSEFIT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for summary payloads
pub const PRODUCER_NAME: &str = "pulsefit";
