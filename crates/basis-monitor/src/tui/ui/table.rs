/*
[INPUT]:  Visible basis rows and sort state from the controller
[OUTPUT]: Sortable basis table rendered into Ratatui frame
[POS]:    TUI UI basis table rendering
[UPDATE]: When changing columns, indicators, or placeholder rows
*/

use ratatui::layout::Constraint;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Span;
use ratatui::widgets::{Block, Borders, Cell, Row, Table};

use basis_monitor::format::{BasisTone, format_percent, format_price, format_volume_usd};
use basis_monitor::{DashboardController, SortColumn, SortDirection, SortState};

use crate::tui::app::AppState;
use crate::tui::runtime::{border_style, header_style, tone_style};

const COLUMN_WIDTHS: [Constraint; 8] = [
    Constraint::Length(4),
    Constraint::Length(14),
    Constraint::Length(16),
    Constraint::Length(18),
    Constraint::Length(14),
    Constraint::Length(11),
    Constraint::Length(15),
    Constraint::Length(17),
];

fn sort_indicator(column: SortColumn, sort: SortState) -> &'static str {
    if column != sort.column {
        return "↕";
    }
    match sort.direction {
        SortDirection::Desc => "▼",
        SortDirection::Asc => "▲",
    }
}

fn placeholder_row(message: &str) -> Row<'static> {
    let mut cells = vec![Cell::from(""), Cell::from(message.to_string())];
    cells.extend((2..COLUMN_WIDTHS.len()).map(|_| Cell::from("")));
    Row::new(cells)
}

pub(in crate::tui) fn draw_basis_table(
    frame: &mut ratatui::Frame,
    area: ratatui::layout::Rect,
    app: &mut AppState,
    controller: &DashboardController,
) {
    let state = controller.state();
    let sort = state.sort();

    let mut header_cells = vec![Cell::from("#")];
    header_cells.extend(
        SortColumn::ALL
            .iter()
            .map(|column| Cell::from(format!("{} {}", column.label(), sort_indicator(*column, sort)))),
    );
    let header = Row::new(header_cells).style(header_style());

    let rows = if state.is_loading() {
        vec![placeholder_row("Loading...")]
    } else if state.visible().is_empty() {
        vec![placeholder_row("No data")]
    } else {
        state
            .visible()
            .iter()
            .enumerate()
            .map(|(rank, record)| {
                let tone = tone_style(BasisTone::of(record.basis));
                let percent_tone = tone_style(BasisTone::of(record.basis_percent));
                Row::new(vec![
                    Cell::from(format!("{:>3}", rank + 1)),
                    Cell::from(record.symbol.clone()),
                    Cell::from(format!("{:>15}", format_price(record.spot_price))),
                    Cell::from(format!("{:>17}", format_price(record.futures_price))),
                    Cell::from(Span::styled(format!("{:>13}", format_price(record.basis)), tone)),
                    Cell::from(Span::styled(
                        format!("{:>10}", format_percent(record.basis_percent)),
                        percent_tone,
                    )),
                    Cell::from(format!("{:>14}", format_volume_usd(record.spot_notional()))),
                    Cell::from(format!("{:>16}", format_volume_usd(record.futures_notional()))),
                ])
            })
            .collect()
    };

    let title = format!(
        "Top {} by {} ({}) | {} pairs",
        state.display_limit(),
        sort.column.label(),
        sort.direction.label(),
        state.records().len()
    );
    let table = Table::new(rows, COLUMN_WIDTHS)
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style())
                .title(title),
        )
        .row_highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");
    frame.render_stateful_widget(table, area, &mut app.table_state);
}
