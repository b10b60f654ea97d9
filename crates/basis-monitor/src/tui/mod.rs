/*
[INPUT]:  DashboardController state, log buffer, crossterm input
[OUTPUT]: Ratatui-based dashboard with table, stats, status line and logs
[POS]:    TUI module for the basis-monitor binary
[UPDATE]: When changing TUI layout, keybindings, or runtime controls
*/

mod app;
mod events;
mod runtime;
mod terminal;
mod ui;

pub(crate) use runtime::{LOG_BUFFER_CAPACITY, LogBuffer, LogBufferHandle, LogWriterFactory, run_tui};
