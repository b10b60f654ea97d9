/*
[INPUT]:  Monitor configuration, log buffer handle
[OUTPUT]: AppState (tab, row selection) for the TUI
[POS]:    TUI app state - everything the controller does not own
[UPDATE]: When adding tabs or UI-only state
*/

use ratatui::widgets::TableState;

use basis_monitor::MonitorConfig;

use super::runtime::LogBufferHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(super) enum Tab {
    #[default]
    Dashboard,
    Logs,
}

impl Tab {
    pub(super) const ALL: [Tab; 2] = [Tab::Dashboard, Tab::Logs];

    pub(super) fn title(self) -> &'static str {
        match self {
            Tab::Dashboard => "Dashboard",
            Tab::Logs => "Logs",
        }
    }

    pub(super) fn index(self) -> usize {
        match self {
            Tab::Dashboard => 0,
            Tab::Logs => 1,
        }
    }
}

pub(super) struct AppState {
    pub(super) log_buffer: LogBufferHandle,
    pub(super) current_tab: Tab,
    pub(super) table_state: TableState,
    pub(super) base_url: String,
}

impl AppState {
    pub(super) fn new(config: &MonitorConfig, log_buffer: LogBufferHandle) -> Self {
        Self {
            log_buffer,
            current_tab: Tab::default(),
            table_state: TableState::default(),
            base_url: config.base_url.clone(),
        }
    }

    pub(super) fn next_tab(&mut self) {
        self.current_tab = match self.current_tab {
            Tab::Dashboard => Tab::Logs,
            Tab::Logs => Tab::Dashboard,
        };
    }

    pub(super) fn move_selection(&mut self, delta: isize, rows: usize) {
        if rows == 0 {
            self.table_state.select(None);
            return;
        }
        let current = self.table_state.selected().unwrap_or(0) as isize;
        let next = (current + delta).clamp(0, rows as isize - 1) as usize;
        self.table_state.select(Some(next));
    }

    /// Keep the selection inside the current row count
    pub(super) fn clamp_selection(&mut self, rows: usize) {
        match self.table_state.selected() {
            _ if rows == 0 => self.table_state.select(None),
            Some(selected) if selected >= rows => self.table_state.select(Some(rows - 1)),
            _ => {}
        }
    }

    pub(super) fn selected_row(&self) -> Option<usize> {
        self.table_state.selected()
    }
}
