/*
[INPUT]:  TUI app state and DashboardController for UI components
[OUTPUT]: UI component render functions and module exports
[POS]:    TUI UI module root
[UPDATE]: When adding panels
*/

mod layout;
mod logs;
mod summary;
mod table;
mod toast;

pub(in crate::tui) use layout::draw_tabs;
pub(in crate::tui) use logs::draw_logs;
pub(in crate::tui) use summary::draw_summary;
pub(in crate::tui) use table::draw_basis_table;
pub(in crate::tui) use toast::draw_toast;
