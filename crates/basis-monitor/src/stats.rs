/*
[INPUT]:  Full basis record set
[OUTPUT]: Summary statistics (max basis, average basis, total notional)
[POS]:    Projection layer - summary numbers for the stat fields
[UPDATE]: When adding summary fields
*/

use basis_feed_adapter::BasisRecord;

use crate::view::{SortState, project_view};

#[derive(Debug, Clone, PartialEq)]
pub struct BasisStats {
    pub max_basis_percent: f64,
    pub max_symbol: String,
    pub average_basis_percent: f64,
    /// Spot plus futures USD notional across every record
    pub total_notional: f64,
    pub record_count: usize,
}

impl BasisStats {
    /// `None` for an empty dataset
    pub fn compute(records: &[BasisRecord]) -> Option<Self> {
        // same ordering rule as the default table view
        let top = project_view(records, SortState::default(), 1).into_iter().next()?;

        let count = records.len();
        let sum: f64 = records.iter().map(|r| r.basis_percent).sum();
        let total_notional = records.iter().map(BasisRecord::total_notional).sum();

        Some(Self {
            max_basis_percent: top.basis_percent,
            max_symbol: top.symbol,
            average_basis_percent: sum / count as f64,
            total_notional,
            record_count: count,
        })
    }
}
