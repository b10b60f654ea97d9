/*
[INPUT]:  API schema definitions and serde requirements
[OUTPUT]: Basis record and snapshot types shared by HTTP and WebSocket paths
[POS]:    Data layer - type definitions for API communication
[UPDATE]: When API schema changes or new types added
*/

use serde::{Deserialize, Serialize};

/// One spot/futures pair as computed by the backend.
///
/// Volumes are in base-asset units; multiply by the matching price for USD notional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BasisRecord {
    pub symbol: String,
    pub spot_price: f64,
    pub futures_price: f64,
    /// `futures_price - spot_price`
    pub basis: f64,
    /// Basis relative to spot, in percent
    pub basis_percent: f64,
    pub spot_volume: f64,
    pub futures_volume: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_update: Option<String>,
}

impl BasisRecord {
    pub fn spot_notional(&self) -> f64 {
        self.spot_volume * self.spot_price
    }

    pub fn futures_notional(&self) -> f64 {
        self.futures_volume * self.futures_price
    }

    pub fn total_notional(&self) -> f64 {
        self.spot_notional() + self.futures_notional()
    }
}

/// A complete dataset as delivered by one fetch or one push frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BasisSnapshot {
    pub records: Vec<BasisRecord>,
    pub timestamp: Option<String>,
    pub total_count: Option<u64>,
}

impl BasisSnapshot {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
