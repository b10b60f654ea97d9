/*
[INPUT]:  Active toast from the controller
[OUTPUT]: Notification overlay in the top-right corner of the content area
[POS]:    TUI UI toast overlay
[UPDATE]: When changing notification placement or styling
*/

use ratatui::layout::Rect;
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use basis_monitor::Toast;

use crate::tui::runtime::notice_style;

const TOAST_HEIGHT: u16 = 3;

pub(in crate::tui) fn draw_toast(frame: &mut ratatui::Frame, area: Rect, toast: &Toast) {
    let width = (toast.message.chars().count() as u16)
        .saturating_add(4)
        .min(area.width);
    let height = TOAST_HEIGHT.min(area.height);
    if width == 0 || height == 0 {
        return;
    }
    let overlay = Rect {
        x: area.x + area.width - width,
        y: area.y,
        width,
        height,
    };

    let style = notice_style(toast.level);
    let widget = Paragraph::new(toast.message.as_str())
        .style(style)
        .block(Block::default().borders(Borders::ALL).border_style(style));
    frame.render_widget(Clear, overlay);
    frame.render_widget(widget, overlay);
}
