/*
[INPUT]:  Decoded push frame bodies
[OUTPUT]: Basis snapshots (current and legacy top/bottom layouts)
[POS]:    WebSocket layer - message payload shapes
[UPDATE]: When adding new message types or changing format
*/

use serde::{Deserialize, Serialize};

use crate::types::{BasisRecord, BasisSnapshot};

/// Body shared by `initial_data` and `basis_update` frames.
///
/// Older backends sent `top`/`bottom` halves instead of a single `data` list.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct BasisPayload {
    #[serde(default)]
    pub data: Option<Vec<BasisRecord>>,
    #[serde(default)]
    pub top: Option<Vec<BasisRecord>>,
    #[serde(default)]
    pub bottom: Option<Vec<BasisRecord>>,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub total_count: Option<u64>,
}

impl BasisPayload {
    /// Flatten into a snapshot; `None` when neither layout is present
    pub fn into_snapshot(self) -> Option<BasisSnapshot> {
        let records = match (self.data, self.top, self.bottom) {
            (Some(data), _, _) => data,
            (None, Some(mut top), Some(bottom)) => {
                top.extend(bottom);
                top
            }
            _ => return None,
        };

        Some(BasisSnapshot {
            records,
            timestamp: self.timestamp,
            total_count: self.total_count,
        })
    }
}
