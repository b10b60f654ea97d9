/*
[INPUT]:  Public API exports for basis-monitor crate
[OUTPUT]: Module declarations and public re-exports
[POS]:    Crate root - library entry point
[UPDATE]: When adding new modules or public exports
*/

pub mod config;
pub mod controller;
pub mod feed;
pub mod format;
pub mod stats;
pub mod view;

// Re-export main types for convenience
pub use config::{FeedMode, MonitorConfig};
pub use controller::{DashboardController, Toast};
pub use feed::{ConnectionState, ConnectionStatus, FeedCommand, FeedEvent, FeedSource};
pub use stats::BasisStats;
pub use view::{FeedState, SortColumn, SortDirection, SortState};
