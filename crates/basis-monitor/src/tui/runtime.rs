/*
[INPUT]:  DashboardController, log buffer, crossterm input, shutdown token
[OUTPUT]: Ratatui-based TUI run loop, rendering, and log buffer utilities
[POS]:    TUI runtime loop and shared helpers
[UPDATE]: When changing TUI layout, keybindings, or runtime controls
*/

use std::collections::VecDeque;
use std::io::{self, Write};
use std::sync::Arc;
use std::sync::Mutex as StdMutex;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{Event as CrosstermEvent, KeyEventKind};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::{debug, info, warn};
use tracing_subscriber::fmt::MakeWriter;

use basis_monitor::feed::{ConnectionState, NoticeLevel};
use basis_monitor::format::{BasisTone, futures_url};
use basis_monitor::{DashboardController, MonitorConfig};

use super::app::{AppState, Tab};
use super::events::handle_key_event;
use super::terminal::TerminalGuard;
use super::ui::*;

const UI_TICK_INTERVAL: Duration = Duration::from_millis(250);
const INPUT_POLL_INTERVAL: Duration = Duration::from_millis(200);
pub(crate) const LOG_BUFFER_CAPACITY: usize = 2000;

pub(crate) type LogBufferHandle = Arc<StdMutex<LogBuffer>>;

#[derive(Debug, Default)]
pub(crate) struct LogBuffer {
    lines: VecDeque<String>,
    capacity: usize,
}

impl LogBuffer {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            lines: VecDeque::with_capacity(capacity.min(256)),
            capacity,
        }
    }

    pub(crate) fn push_line(&mut self, line: String) {
        if self.capacity == 0 {
            return;
        }
        if self.lines.len() >= self.capacity {
            self.lines.pop_front();
        }
        self.lines.push_back(line);
    }

    /// Last `count` lines, oldest first
    pub(crate) fn tail(&self, count: usize) -> Vec<String> {
        let start = self.lines.len().saturating_sub(count);
        self.lines.iter().skip(start).cloned().collect()
    }
}

/// `MakeWriter` that feeds formatted log lines into a [`LogBuffer`]
#[derive(Clone)]
pub(crate) struct LogWriterFactory {
    buffer: LogBufferHandle,
}

impl LogWriterFactory {
    pub(crate) fn new(buffer: LogBufferHandle) -> Self {
        Self { buffer }
    }
}

pub(crate) struct LogWriter {
    buffer: LogBufferHandle,
    partial: String,
}

impl LogWriter {
    fn push(&self, line: String) {
        // a poisoned buffer only loses log lines
        if let Ok(mut guard) = self.buffer.lock() {
            guard.push_line(line);
        }
    }
}

impl Write for LogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.partial.push_str(&String::from_utf8_lossy(buf));
        while let Some(pos) = self.partial.find('\n') {
            let line = self.partial[..pos].trim_end_matches('\r').to_string();
            self.partial.replace_range(..=pos, "");
            self.push(line);
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        if !self.partial.is_empty() {
            let line = std::mem::take(&mut self.partial);
            self.push(line);
        }
        Ok(())
    }
}

impl Drop for LogWriter {
    fn drop(&mut self) {
        let _ = self.flush();
    }
}

impl<'a> MakeWriter<'a> for LogWriterFactory {
    type Writer = LogWriter;

    fn make_writer(&'a self) -> Self::Writer {
        LogWriter {
            buffer: self.buffer.clone(),
            partial: String::new(),
        }
    }
}

enum UiEvent {
    Input(CrosstermEvent),
}

/// Blocking crossterm reader; dropping it stops the reader thread.
struct InputReader {
    events: mpsc::UnboundedReceiver<UiEvent>,
    _stop: DropGuard,
}

impl InputReader {
    fn spawn<F>(mut read: F) -> (Self, JoinHandle<()>)
    where
        F: FnMut() -> Option<CrosstermEvent> + Send + 'static,
    {
        let (event_tx, events) = mpsc::unbounded_channel();
        let stop = CancellationToken::new();
        let stopped = stop.clone();
        let handle = tokio::task::spawn_blocking(move || {
            while !stopped.is_cancelled() {
                if let Some(event) = read() {
                    let _ = event_tx.send(UiEvent::Input(event));
                }
            }
        });
        let reader = Self {
            events,
            _stop: stop.drop_guard(),
        };
        (reader, handle)
    }
}

fn read_terminal_event() -> Option<CrosstermEvent> {
    if crossterm::event::poll(INPUT_POLL_INTERVAL).unwrap_or(false) {
        crossterm::event::read().ok()
    } else {
        None
    }
}

/// Tracks whether the screen is out of date
#[derive(Debug, Default)]
struct RedrawGate {
    drawn_revision: Option<u64>,
    dirty: bool,
}

impl RedrawGate {
    fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    fn should_draw(&self, revision: u64) -> bool {
        self.dirty || self.drawn_revision != Some(revision)
    }

    fn drawn(&mut self, revision: u64) {
        self.drawn_revision = Some(revision);
        self.dirty = false;
    }
}

/// Route one terminal event. Returns `true` if quit is requested.
fn dispatch_input(app: &mut AppState, controller: &mut DashboardController, event: CrosstermEvent) -> bool {
    match event {
        CrosstermEvent::Key(key) if key.kind == KeyEventKind::Press => {
            handle_key_event(app, controller, key)
        }
        CrosstermEvent::FocusGained => {
            info!("terminal focus regained");
            controller.resume();
            false
        }
        CrosstermEvent::FocusLost => {
            debug!("terminal focus lost");
            false
        }
        _ => false,
    }
}

pub(crate) async fn run_tui(
    controller: &mut DashboardController,
    config: &MonitorConfig,
    log_buffer: LogBufferHandle,
    shutdown: CancellationToken,
) -> Result<()> {
    let mut terminal = TerminalGuard::new()?;
    let (mut input, _) = InputReader::spawn(read_terminal_event);

    let mut app = AppState::new(config, log_buffer);
    let mut tick = tokio::time::interval(UI_TICK_INTERVAL);
    let mut redraw = RedrawGate::default();
    let mut feed_alive = true;
    let mut should_quit = false;

    while !should_quit {
        tokio::select! {
            _ = shutdown.cancelled() => {
                should_quit = true;
            }
            _ = tick.tick() => {
                controller.expire_toast();
                if app.current_tab == Tab::Logs {
                    redraw.mark_dirty();
                }
            }
            event = controller.next_event(), if feed_alive => {
                match event {
                    Some(event) => {
                        controller.apply(event);
                        controller.drain();
                    }
                    None => {
                        warn!("feed stopped");
                        feed_alive = false;
                    }
                }
            }
            maybe_event = input.events.recv() => {
                match maybe_event {
                    Some(UiEvent::Input(event)) => {
                        should_quit = dispatch_input(&mut app, controller, event);
                        redraw.mark_dirty();
                    }
                    None => {
                        warn!("input reader stopped");
                        should_quit = true;
                    }
                }
            }
        }

        app.clamp_selection(controller.state().visible().len());
        let revision = controller.revision();
        if !should_quit && redraw.should_draw(revision) {
            terminal.draw(|frame| draw_ui(frame, &mut app, controller))?;
            redraw.drawn(revision);
        }
    }

    Ok(())
}

pub(super) fn draw_ui(frame: &mut ratatui::Frame, app: &mut AppState, controller: &DashboardController) {
    let area = frame.area();
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(10),
            Constraint::Length(3),
            Constraint::Length(4),
        ])
        .split(area);

    draw_tabs(frame, layout[1], app.current_tab);

    match app.current_tab {
        Tab::Dashboard => {
            let content = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Length(4), Constraint::Min(6)])
                .split(layout[0]);
            draw_summary(frame, content[0], app, controller);
            draw_basis_table(frame, content[1], app, controller);
        }
        Tab::Logs => {
            draw_logs(frame, layout[0], &app.log_buffer);
        }
    }

    draw_footer(frame, layout[2], app, controller);

    if let Some(toast) = controller.toast() {
        draw_toast(frame, layout[0], toast);
    }
}

pub(super) fn draw_footer(
    frame: &mut ratatui::Frame,
    area: ratatui::layout::Rect,
    app: &AppState,
    controller: &DashboardController,
) {
    let key_style = Style::default()
        .fg(Color::Black)
        .bg(Color::Yellow)
        .add_modifier(Modifier::BOLD);
    let line1 = Line::from(vec![
        Span::styled("[1-7]", key_style),
        Span::raw(" Sort  "),
        Span::styled("[Up/Down]", key_style),
        Span::raw(" Select  "),
        Span::styled("[r]", key_style),
        Span::raw(" Refresh  "),
        Span::styled("[Tab/l]", key_style),
        Span::raw(" Switch  "),
        Span::styled("[q]", key_style),
        Span::raw(" Quit"),
    ]);

    let selected = app
        .selected_row()
        .and_then(|index| controller.state().visible().get(index));
    let line2 = match selected {
        Some(record) => Line::from(vec![
            Span::raw("Futures: "),
            Span::styled(
                futures_url(&record.symbol),
                Style::default()
                    .fg(Color::LightBlue)
                    .add_modifier(Modifier::UNDERLINED),
            ),
        ]),
        None => Line::from(Span::raw("Select a row to show its futures link")),
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style())
        .title("Hotkeys");
    let text = Text::from(vec![line1, line2]);
    let widget = Paragraph::new(text).block(block).wrap(Wrap { trim: true });
    frame.render_widget(widget, area);
}

pub(crate) fn border_style() -> Style {
    Style::default().fg(Color::Magenta)
}

pub(crate) fn header_style() -> Style {
    Style::default()
        .fg(Color::Black)
        .bg(Color::Cyan)
        .add_modifier(Modifier::BOLD)
}

pub(crate) fn tone_style(tone: BasisTone) -> Style {
    match tone {
        BasisTone::Positive => Style::default()
            .fg(Color::LightGreen)
            .add_modifier(Modifier::BOLD),
        BasisTone::Negative => Style::default()
            .fg(Color::LightRed)
            .add_modifier(Modifier::BOLD),
        BasisTone::Neutral => Style::default(),
    }
}

pub(crate) fn connection_style(state: ConnectionState) -> Style {
    match state {
        ConnectionState::Connected => Style::default().fg(Color::LightGreen),
        ConnectionState::Connecting => Style::default().fg(Color::Yellow),
        ConnectionState::Disconnected => Style::default().fg(Color::LightRed),
    }
}

pub(crate) fn notice_style(level: NoticeLevel) -> Style {
    let color = match level {
        NoticeLevel::Info => Color::Cyan,
        NoticeLevel::Success => Color::LightGreen,
        NoticeLevel::Error => Color::LightRed,
    };
    Style::default().fg(color).add_modifier(Modifier::BOLD)
}

#[cfg(test)]
mod tests {
    use basis_feed_adapter::{BasisRecord, BasisSnapshot};
    use basis_monitor::{FeedCommand, FeedEvent};
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use basis_monitor::feed::Notice;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;
    use tokio_util::sync::CancellationToken;

    use super::*;
    use crate::test_support::RecordingFeed;

    fn record(symbol: &str, basis_percent: f64) -> BasisRecord {
        BasisRecord {
            symbol: symbol.to_string(),
            spot_price: 100.0,
            futures_price: 100.0 + basis_percent,
            basis: basis_percent,
            basis_percent,
            spot_volume: 1000.0,
            futures_volume: 2000.0,
            last_update: None,
        }
    }

    fn render(app: &mut AppState, controller: &DashboardController) -> String {
        let backend = TestBackend::new(140, 32);
        let mut terminal = Terminal::new(backend).expect("terminal");
        terminal
            .draw(|frame| draw_ui(frame, app, controller))
            .expect("draw");
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    fn fixture() -> (AppState, DashboardController) {
        let buffer = Arc::new(StdMutex::new(LogBuffer::new(16)));
        let app = AppState::new(&MonitorConfig::default(), buffer);
        let controller =
            DashboardController::new(10, Duration::from_secs(3), CancellationToken::new());
        (app, controller)
    }

    #[test]
    fn test_log_buffer_drops_oldest_lines() {
        let mut buffer = LogBuffer::new(2);
        buffer.push_line("a".to_string());
        buffer.push_line("b".to_string());
        buffer.push_line("c".to_string());
        assert_eq!(buffer.tail(10), vec!["b".to_string(), "c".to_string()]);
        assert_eq!(buffer.tail(1), vec!["c".to_string()]);

        let mut disabled = LogBuffer::new(0);
        disabled.push_line("x".to_string());
        assert!(disabled.tail(10).is_empty());
    }

    #[test]
    fn test_log_writer_splits_lines() {
        let handle = Arc::new(StdMutex::new(LogBuffer::new(16)));
        let factory = LogWriterFactory::new(handle.clone());
        {
            let mut writer = factory.make_writer();
            writer.write_all(b"first\r\nsec").unwrap();
            writer.write_all(b"ond\ntrailing").unwrap();
        }
        let lines = handle.lock().unwrap().tail(10);
        assert_eq!(lines, vec!["first", "second", "trailing"]);
    }

    #[test]
    fn test_dashboard_renders_rows_and_sort_indicator() {
        let (mut app, mut controller) = fixture();
        controller.apply(FeedEvent::Snapshot(BasisSnapshot {
            records: vec![record("ETHUSDT", 0.05), record("BTCUSDT", 0.16)],
            timestamp: Some("2024-05-01T09:30:00".to_string()),
            total_count: Some(2),
        }));

        let screen = render(&mut app, &controller);
        assert!(screen.contains("BTCUSDT"));
        assert!(screen.contains("ETHUSDT"));
        assert!(screen.contains("Basis % ▼"));
        assert!(screen.contains("0.16%"));
        assert!(screen.contains("09:30:00"));
        let btc = screen.find("BTCUSDT").expect("btc row");
        let eth = screen.find("ETHUSDT").expect("eth row");
        assert!(btc < eth);
    }

    #[test]
    fn test_loading_then_placeholder_rows() {
        let (mut app, mut controller) = fixture();
        assert!(render(&mut app, &controller).contains("Loading..."));

        controller.apply(FeedEvent::Rejected("missing data".to_string()));
        assert!(render(&mut app, &controller).contains("No data"));
    }

    #[test]
    fn test_toast_and_selected_link_render() {
        let (mut app, mut controller) = fixture();
        controller.apply(FeedEvent::Snapshot(BasisSnapshot {
            records: vec![record("BTCUSDT", 0.16)],
            timestamp: None,
            total_count: None,
        }));
        controller.apply(FeedEvent::Notice(Notice::error("Connection failed")));
        app.move_selection(1, controller.state().visible().len());

        let screen = render(&mut app, &controller);
        assert!(screen.contains("Connection failed"));
        assert!(screen.contains("https://www.binance.com/en/futures/BTCUSDT"));
    }
    #[tokio::test]
    async fn test_focus_gained_sends_resume() {
        let (mut app, mut controller) = fixture();
        let feed = RecordingFeed::default();
        controller.start(Box::new(feed.clone())).unwrap();

        assert!(!dispatch_input(&mut app, &mut controller, CrosstermEvent::FocusGained));
        assert!(!dispatch_input(&mut app, &mut controller, CrosstermEvent::FocusLost));
        feed.wait_for(1).await;
        assert_eq!(feed.seen(), vec![FeedCommand::Resume]);

        let quit = KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE);
        assert!(dispatch_input(&mut app, &mut controller, CrosstermEvent::Key(quit)));

        controller.shutdown().await;
    }

    #[tokio::test]
    async fn test_input_reader_stops_when_dropped() {
        let (reader, handle) = InputReader::spawn(|| {
            std::thread::sleep(Duration::from_millis(5));
            None
        });
        drop(reader);
        tokio::time::timeout(Duration::from_secs(2), handle)
            .await
            .expect("reader thread still running")
            .unwrap();
    }

    #[test]
    fn test_redraw_gate_tracks_revision_and_input() {
        let mut gate = RedrawGate::default();
        assert!(gate.should_draw(0));
        gate.drawn(0);
        assert!(!gate.should_draw(0));
        assert!(gate.should_draw(1));

        gate.drawn(1);
        gate.mark_dirty();
        assert!(gate.should_draw(1));
        gate.drawn(1);
        assert!(!gate.should_draw(1));
    }
}
