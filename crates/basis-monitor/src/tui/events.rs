/*
[INPUT]:  Crossterm key events
[OUTPUT]: Controller actions (sort, refresh) and UI state changes (tab, selection)
[POS]:    TUI key routing
[UPDATE]: When changing keybindings
*/

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use basis_monitor::{DashboardController, SortColumn};

use super::app::AppState;

/// Handles key events for the TUI.
///
/// Returns `true` if quit is requested, `false` otherwise.
pub(super) fn handle_key_event(
    app: &mut AppState,
    controller: &mut DashboardController,
    key: KeyEvent,
) -> bool {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return matches!(key.code, KeyCode::Char('c'));
    }

    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => true,
        KeyCode::Char('r') => {
            controller.refresh();
            false
        }
        KeyCode::Char(digit @ '1'..='7') => {
            let index = digit as usize - '0' as usize;
            if let Some(column) = SortColumn::from_index(index) {
                controller.sort_by(column);
            }
            false
        }
        KeyCode::Tab | KeyCode::Char('l') => {
            app.next_tab();
            false
        }
        KeyCode::Up | KeyCode::Char('k') => {
            app.move_selection(-1, controller.state().visible().len());
            false
        }
        KeyCode::Down | KeyCode::Char('j') => {
            app.move_selection(1, controller.state().visible().len());
            false
        }
        _ => false,
    }
}
