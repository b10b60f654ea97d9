/*
[INPUT]:  API schema definitions and serde requirements
[OUTPUT]: Typed Rust response structs with serialization support
[POS]:    Data layer - type definitions for API communication
[UPDATE]: When API schema changes or new types added
*/

use serde::{Deserialize, Serialize};

use super::models::{BasisRecord, BasisSnapshot};
use crate::http::FeedError;

/// Envelope returned by `GET /api/basis`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BasisResponse {
    pub success: bool,
    #[serde(default)]
    pub data: Option<Vec<BasisRecord>>,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub total_count: Option<u64>,
}

impl BasisResponse {
    /// Interpret the envelope, rejecting `success: false` and missing data
    pub fn into_snapshot(self) -> Result<BasisSnapshot, FeedError> {
        if !self.success {
            let reason = self
                .error
                .unwrap_or_else(|| "backend reported failure".to_string());
            return Err(FeedError::Rejected(reason));
        }

        let Some(records) = self.data else {
            return Err(FeedError::Rejected("response missing data".to_string()));
        };

        Ok(BasisSnapshot {
            records,
            timestamp: self.timestamp,
            total_count: self.total_count,
        })
    }
}
