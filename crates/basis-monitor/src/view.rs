/*
[INPUT]:  Full basis record set, user-selected sort column/direction
[OUTPUT]: Sorted, truncated view for the table
[POS]:    Projection layer - sort and display-limit logic (no I/O)
[UPDATE]: When adding sortable columns or changing sort semantics
*/

use std::cmp::Ordering;

use basis_feed_adapter::{BasisRecord, BasisSnapshot};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortColumn {
    Symbol,
    SpotPrice,
    FuturesPrice,
    Basis,
    BasisPercent,
    SpotVolume,
    FuturesVolume,
}

impl SortColumn {
    /// Table column order
    pub const ALL: [SortColumn; 7] = [
        SortColumn::Symbol,
        SortColumn::SpotPrice,
        SortColumn::FuturesPrice,
        SortColumn::Basis,
        SortColumn::BasisPercent,
        SortColumn::SpotVolume,
        SortColumn::FuturesVolume,
    ];

    pub fn label(self) -> &'static str {
        match self {
            SortColumn::Symbol => "Symbol",
            SortColumn::SpotPrice => "Spot Price",
            SortColumn::FuturesPrice => "Futures Price",
            SortColumn::Basis => "Basis",
            SortColumn::BasisPercent => "Basis %",
            SortColumn::SpotVolume => "Spot Volume",
            SortColumn::FuturesVolume => "Futures Volume",
        }
    }

    /// 1-based hotkey index into `ALL`
    pub fn from_index(index: usize) -> Option<Self> {
        index
            .checked_sub(1)
            .and_then(|i| Self::ALL.get(i).copied())
    }

    fn key(self, record: &BasisRecord) -> SortKey<'_> {
        match self {
            SortColumn::Symbol => SortKey::Text(&record.symbol),
            SortColumn::SpotPrice => SortKey::Number(record.spot_price),
            SortColumn::FuturesPrice => SortKey::Number(record.futures_price),
            SortColumn::Basis => SortKey::Number(record.basis),
            SortColumn::BasisPercent => SortKey::Number(record.basis_percent),
            SortColumn::SpotVolume => SortKey::Number(record.spot_notional()),
            SortColumn::FuturesVolume => SortKey::Number(record.futures_notional()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum SortKey<'a> {
    Text(&'a str),
    Number(f64),
}

impl SortKey<'_> {
    /// NaN keys are equal to each other and always sink below real numbers
    fn compare(&self, other: &Self, direction: SortDirection) -> Ordering {
        match (self, other) {
            (SortKey::Text(a), SortKey::Text(b)) => direction.apply(a.cmp(b)),
            (SortKey::Number(a), SortKey::Number(b)) => match (a.is_nan(), b.is_nan()) {
                (true, true) => Ordering::Equal,
                (true, false) => Ordering::Greater,
                (false, true) => Ordering::Less,
                (false, false) => direction.apply(a.partial_cmp(b).unwrap_or(Ordering::Equal)),
            },
            _ => Ordering::Equal,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }

    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SortDirection::Asc => "ascending",
            SortDirection::Desc => "descending",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortState {
    pub column: SortColumn,
    pub direction: SortDirection,
}

impl Default for SortState {
    fn default() -> Self {
        Self {
            column: SortColumn::BasisPercent,
            direction: SortDirection::Desc,
        }
    }
}

impl SortState {
    /// Same column flips direction; a new column starts descending
    pub fn select(&mut self, column: SortColumn) {
        if self.column == column {
            self.direction = self.direction.flipped();
        } else {
            self.column = column;
            self.direction = SortDirection::Desc;
        }
    }
}

/// Sort a copy of `records` and keep the first `limit` rows.
pub fn project_view(records: &[BasisRecord], sort: SortState, limit: usize) -> Vec<BasisRecord> {
    let mut sorted: Vec<&BasisRecord> = records.iter().collect();
    sorted.sort_by(|a, b| {
        sort.column
            .key(a)
            .compare(&sort.column.key(b), sort.direction)
    });
    sorted.into_iter().take(limit).cloned().collect()
}

/// Records, sort choice and the derived view.
///
/// `visible` is only ever recomputed from the other fields.
#[derive(Debug, Clone)]
pub struct FeedState {
    records: Vec<BasisRecord>,
    sort: SortState,
    visible: Vec<BasisRecord>,
    display_limit: usize,
    last_update: Option<String>,
    placeholder: bool,
}

impl FeedState {
    pub fn new(display_limit: usize) -> Self {
        Self {
            records: Vec::new(),
            sort: SortState::default(),
            visible: Vec::new(),
            display_limit,
            last_update: None,
            placeholder: false,
        }
    }

    /// Replace the dataset wholesale. Empty snapshots switch to the placeholder.
    ///
    /// Returns `false` when the snapshot was empty.
    pub fn replace(&mut self, snapshot: BasisSnapshot) -> bool {
        if snapshot.is_empty() {
            self.show_placeholder();
            return false;
        }
        self.records = snapshot.records;
        self.last_update = snapshot.timestamp;
        self.placeholder = false;
        self.recompute();
        true
    }

    /// Drop the dataset and show the "no data" row
    pub fn show_placeholder(&mut self) {
        self.records.clear();
        self.visible.clear();
        self.placeholder = true;
    }

    pub fn select_sort(&mut self, column: SortColumn) -> SortState {
        self.sort.select(column);
        self.recompute();
        self.sort
    }

    fn recompute(&mut self) {
        self.visible = project_view(&self.records, self.sort, self.display_limit);
    }

    pub fn records(&self) -> &[BasisRecord] {
        &self.records
    }

    pub fn visible(&self) -> &[BasisRecord] {
        &self.visible
    }

    pub fn sort(&self) -> SortState {
        self.sort
    }

    pub fn display_limit(&self) -> usize {
        self.display_limit
    }

    pub fn last_update(&self) -> Option<&str> {
        self.last_update.as_deref()
    }

    pub fn is_placeholder(&self) -> bool {
        self.placeholder
    }

    /// True until the first snapshot, rejection or empty result arrives
    pub fn is_loading(&self) -> bool {
        self.records.is_empty() && !self.placeholder
    }
}
