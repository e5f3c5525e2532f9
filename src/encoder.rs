//! Summary encoding
//!
//! This module wraps dashboard summaries in a versioned envelope with producer
//! metadata. It is the only place that reads the clock; the engine itself stays
//! a pure function of its inputs.

use crate::error::EngineError;
use crate::types::{DashboardSummary, SummaryPayload, SummaryProducer};
use crate::{PRODUCER_NAME, PULSEFIT_VERSION};
use chrono::{DateTime, SecondsFormat, Utc};
use uuid::Uuid;

/// Current summary schema version
pub const SUMMARY_SCHEMA_VERSION: &str = "pulsefit.summary.v1";

/// Encoder for producing summary payloads
pub struct SummaryEncoder {
    instance_id: String,
}

impl Default for SummaryEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl SummaryEncoder {
    /// Create a new encoder with a unique instance ID
    pub fn new() -> Self {
        Self {
            instance_id: Uuid::new_v4().to_string(),
        }
    }

    /// Create an encoder with a specific instance ID
    pub fn with_instance_id(instance_id: String) -> Self {
        Self { instance_id }
    }

    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }

    /// Wrap a summary, stamped with the current time
    pub fn encode(&self, summary: &DashboardSummary) -> SummaryPayload {
        self.encode_at(summary, Utc::now())
    }

    /// Wrap a summary with an explicit computation time
    pub fn encode_at(
        &self,
        summary: &DashboardSummary,
        computed_at: DateTime<Utc>,
    ) -> SummaryPayload {
        SummaryPayload {
            schema_version: SUMMARY_SCHEMA_VERSION.to_string(),
            producer: SummaryProducer {
                name: PRODUCER_NAME.to_string(),
                version: PULSEFIT_VERSION.to_string(),
                instance_id: self.instance_id.clone(),
            },
            computed_at_utc: computed_at.to_rfc3339_opts(SecondsFormat::Secs, true),
            summary: summary.clone(),
        }
    }

    /// Encode to JSON string
    pub fn encode_to_json(&self, summary: &DashboardSummary) -> Result<String, EngineError> {
        let payload = self.encode(summary);
        serde_json::to_string_pretty(&payload)
            .map_err(|e| EngineError::EncodingError(e.to_string()))
    }
}
