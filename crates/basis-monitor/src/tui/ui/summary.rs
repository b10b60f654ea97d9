/*
[INPUT]:  Connection status, summary statistics, last update timestamp
[OUTPUT]: Status line and stat fields rendered into Ratatui frame
[POS]:    TUI UI summary panel
[UPDATE]: When adding stat fields or status details
*/

use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Paragraph};

use basis_monitor::DashboardController;
use basis_monitor::format::{BasisTone, format_percent, format_update_time, format_volume_usd};

use crate::tui::app::AppState;
use crate::tui::runtime::{border_style, connection_style, tone_style};

pub(in crate::tui) fn draw_summary(
    frame: &mut ratatui::Frame,
    area: ratatui::layout::Rect,
    app: &AppState,
    controller: &DashboardController,
) {
    let label_style = Style::default().add_modifier(Modifier::BOLD);
    let status = controller.status();
    let last_update = controller
        .state()
        .last_update()
        .map(format_update_time)
        .unwrap_or_else(|| "-".to_string());

    let mut status_line = vec![
        Span::styled(format!("● {}", status.message), connection_style(status.state)),
        Span::raw("  "),
        Span::styled("Last Update: ", label_style),
        Span::raw(last_update),
    ];
    if status.retry_count > 0 {
        status_line.push(Span::raw(format!(
            "  Retries: {}/{}",
            status.retry_count.min(status.max_retries),
            status.max_retries
        )));
    }

    let stats_line = match controller.stats() {
        Some(stats) => Line::from(vec![
            Span::styled("Max Basis: ", label_style),
            Span::styled(
                format!("{} ({})", format_percent(stats.max_basis_percent), stats.max_symbol),
                tone_style(BasisTone::of(stats.max_basis_percent)),
            ),
            Span::raw("  "),
            Span::styled("Avg Basis: ", label_style),
            Span::styled(
                format_percent(stats.average_basis_percent),
                tone_style(BasisTone::of(stats.average_basis_percent)),
            ),
            Span::raw("  "),
            Span::styled("Total Volume: ", label_style),
            Span::raw(format_volume_usd(stats.total_notional)),
            Span::raw("  "),
            Span::styled("Pairs: ", label_style),
            Span::raw(stats.record_count.to_string()),
        ]),
        None => Line::from(vec![
            Span::styled("Max Basis: ", label_style),
            Span::raw("-  "),
            Span::styled("Avg Basis: ", label_style),
            Span::raw("-  "),
            Span::styled("Total Volume: ", label_style),
            Span::raw("-"),
        ]),
    };

    let title = format!(
        "Basis Monitor | {} | {}",
        controller.mode().label(),
        app.base_url
    );
    let widget = Paragraph::new(Text::from(vec![Line::from(status_line), stats_line])).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style())
            .title(title),
    );
    frame.render_widget(widget, area);
}
