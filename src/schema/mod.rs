//! Unified pulsefit.daily_row.v1 schema
//!
//! This module defines the loose input shape for daily rows and the adapter that
//! validates and normalizes them into typed records.

mod raw_row;
mod adapter;

pub use raw_row::*;
pub use adapter::*;
