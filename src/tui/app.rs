//! TUI Application - main event loop and terminal management
//!
//! This module contains the core TUI application logic including:
//! - Terminal setup and restoration
//! - Background fetches on the blocking pool, paced by the poller
//! - Event loop for keyboard input and fetch results
//! - Tab switching between Dashboard, Items, Kanban and Activity

use std::io::{self, stdout};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use crossterm::{
    ExecutableCommand,
    event::{self, Event, KeyCode, KeyEventKind},
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use rand::SeedableRng;
use rand::rngs::StdRng;
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph},
};
use tokio::sync::mpsc;
use tokio::time::Instant;

use super::views::{ActivityView, DashboardView, ItemsView, KanbanView};
use crate::activity::synthesize_all;
use crate::client::{PollState, Poller, Scope, WorkItemSource};
use crate::filter::FilterSelection;
use crate::models::Dataset;
use crate::priority::PriorityField;
use crate::views::{dashboard, kanban, table};
use crate::{Error, Result};

/// How often keyboard input is checked
const INPUT_TICK: Duration = Duration::from_millis(100);

/// Everything the TUI needs from the command line and config.
pub struct TuiOptions {
    pub source: Arc<dyn WorkItemSource>,
    pub scope: Scope,
    pub selection: FilterSelection,
    pub field: PriorityField,
    pub poll_interval_secs: u64,
    pub max_backoff_secs: u64,
    /// Activity feed page size
    pub page_size: usize,
}

/// Active tab in the TUI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActiveView {
    Dashboard,
    Items,
    Kanban,
    Activity,
}

impl ActiveView {
    const ALL: [ActiveView; 4] = [
        ActiveView::Dashboard,
        ActiveView::Items,
        ActiveView::Kanban,
        ActiveView::Activity,
    ];

    fn label(&self) -> &'static str {
        match self {
            ActiveView::Dashboard => "Dashboard",
            ActiveView::Items => "Items",
            ActiveView::Kanban => "Kanban",
            ActiveView::Activity => "Activity",
        }
    }

    fn next(&self) -> Self {
        let pos = Self::ALL.iter().position(|v| v == self).unwrap_or(0);
        Self::ALL[(pos + 1) % Self::ALL.len()]
    }
}

/// TUI Application state
pub struct TuiApp {
    should_quit: bool,
    active_view: ActiveView,
    dashboard_view: DashboardView,
    items_view: ItemsView,
    kanban_view: KanbanView,
    activity_view: ActivityView,
    poller: Poller,
    selection: FilterSelection,
    field: PriorityField,
    /// Seed for the synthesized activity, fixed for the session so the feed
    /// does not reshuffle on every refresh
    activity_seed: u64,
    /// Text being typed after `/`
    search_input: Option<String>,
    /// Flag indicating data needs refresh
    needs_refresh: bool,
    /// Last key pressed (for gg detection)
    last_key: Option<KeyCode>,
}

impl TuiApp {
    pub fn new(
        poller: Poller,
        selection: FilterSelection,
        field: PriorityField,
        page_size: usize,
    ) -> Self {
        Self {
            should_quit: false,
            active_view: ActiveView::Dashboard,
            dashboard_view: DashboardView::new(),
            items_view: ItemsView::new(),
            kanban_view: KanbanView::new(),
            activity_view: ActivityView::new(page_size),
            poller,
            selection,
            field,
            activity_seed: rand::random(),
            search_input: None,
            needs_refresh: true,
            last_key: None,
        }
    }

    /// Record a fetch result and rebuild every view from the dataset.
    fn apply_fetch(&mut self, result: Result<Dataset>) {
        match result {
            Ok(dataset) => self.poller.record_success(dataset),
            Err(e) => self.poller.record_failure(&e),
        }
        self.rebuild();
    }

    /// Re-derive the views from the last good dataset.
    fn rebuild(&mut self) {
        let Some(dataset) = self.poller.dataset() else {
            return;
        };
        let now = Utc::now();
        let filtered = self.selection.apply(&dataset.work_items, now);

        self.dashboard_view
            .update(dashboard::build(&filtered, self.field, now));
        self.items_view.update(table::build(
            &filtered,
            self.items_view.sort,
            self.items_view.direction,
            self.field,
        ));
        self.kanban_view
            .update(kanban::build(&filtered, self.field, true));

        let mut rng = StdRng::seed_from_u64(self.activity_seed);
        let events = synthesize_all(filtered.iter().copied(), self.field, &mut rng);
        self.activity_view.update(events, now);
    }

    fn move_down(&mut self) {
        match self.active_view {
            ActiveView::Dashboard => {}
            ActiveView::Items => self.items_view.selection.select_next(),
            ActiveView::Kanban => self.kanban_view.selection.select_next(),
            ActiveView::Activity => self.activity_view.selection.select_next(),
        }
    }

    fn move_up(&mut self) {
        match self.active_view {
            ActiveView::Dashboard => {}
            ActiveView::Items => self.items_view.selection.select_previous(),
            ActiveView::Kanban => self.kanban_view.selection.select_previous(),
            ActiveView::Activity => self.activity_view.selection.select_previous(),
        }
    }

    fn move_first(&mut self) {
        match self.active_view {
            ActiveView::Dashboard => {}
            ActiveView::Items => self.items_view.selection.select_first(),
            ActiveView::Kanban => self.kanban_view.selection.select_first(),
            ActiveView::Activity => self.activity_view.selection.select_first(),
        }
    }

    fn move_last(&mut self) {
        match self.active_view {
            ActiveView::Dashboard => {}
            ActiveView::Items => self.items_view.selection.select_last(),
            ActiveView::Kanban => self.kanban_view.selection.select_last(),
            ActiveView::Activity => self.activity_view.selection.select_last(),
        }
    }

    /// Keys typed while the search prompt is open.
    fn handle_search_key(&mut self, key: KeyCode) {
        let Some(input) = self.search_input.as_mut() else {
            return;
        };
        match key {
            KeyCode::Enter => {
                let text = input.trim().to_string();
                self.selection.search = (!text.is_empty()).then_some(text);
                self.search_input = None;
                self.rebuild();
            }
            KeyCode::Esc => self.search_input = None,
            KeyCode::Backspace => {
                input.pop();
            }
            KeyCode::Char(c) => input.push(c),
            _ => {}
        }
    }

    /// Handle keyboard events
    fn handle_key(&mut self, key: KeyCode) {
        if self.search_input.is_some() {
            self.handle_search_key(key);
            return;
        }

        match key {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Tab => self.active_view = self.active_view.next(),
            KeyCode::Char('1') => self.active_view = ActiveView::Dashboard,
            KeyCode::Char('2') => self.active_view = ActiveView::Items,
            KeyCode::Char('3') => self.active_view = ActiveView::Kanban,
            KeyCode::Char('4') => self.active_view = ActiveView::Activity,
            KeyCode::Char('j') | KeyCode::Down => self.move_down(),
            KeyCode::Char('k') | KeyCode::Up => self.move_up(),
            KeyCode::Char('h') | KeyCode::Left => {
                if self.active_view == ActiveView::Kanban {
                    self.kanban_view.previous_column();
                }
            }
            KeyCode::Char('l') | KeyCode::Right => {
                if self.active_view == ActiveView::Kanban {
                    self.kanban_view.next_column();
                }
            }
            KeyCode::Char('n') | KeyCode::PageDown => {
                if self.active_view == ActiveView::Activity {
                    self.activity_view.next_page();
                }
            }
            KeyCode::Char('p') | KeyCode::PageUp => {
                if self.active_view == ActiveView::Activity {
                    self.activity_view.previous_page();
                }
            }
            KeyCode::Char('g') => {
                // Check for gg sequence
                if self.last_key == Some(KeyCode::Char('g')) {
                    self.move_first();
                    self.last_key = None;
                    return;
                }
            }
            KeyCode::Char('G') | KeyCode::End => self.move_last(),
            KeyCode::Home => self.move_first(),
            KeyCode::Char('s') => {
                if self.active_view == ActiveView::Items {
                    self.items_view.cycle_sort();
                    self.rebuild();
                }
            }
            KeyCode::Char('S') => {
                if self.active_view == ActiveView::Items {
                    self.items_view.toggle_direction();
                    self.rebuild();
                }
            }
            KeyCode::Char('/') => {
                self.search_input = Some(self.selection.search.clone().unwrap_or_default());
            }
            KeyCode::Char('c') => {
                self.selection = FilterSelection::new().with_priority_field(self.field);
                self.rebuild();
            }
            KeyCode::Char('r') => self.needs_refresh = true,
            _ => {}
        }
        self.last_key = Some(key);
    }

    /// Render the UI
    fn render(&mut self, frame: &mut Frame) {
        let area = frame.area();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Title bar
                Constraint::Min(5),    // Main content
                Constraint::Length(3), // Status bar
            ])
            .split(area);

        self.render_title_bar(frame, chunks[0]);

        match self.active_view {
            ActiveView::Dashboard => self.dashboard_view.render(frame, chunks[1]),
            ActiveView::Items => self.items_view.render(frame, chunks[1]),
            ActiveView::Kanban => self.kanban_view.render(frame, chunks[1]),
            ActiveView::Activity => self.activity_view.render(frame, chunks[1]),
        }

        self.render_status_bar(frame, chunks[2]);
    }

    /// Render the tab strip with the poll state on the right
    fn render_title_bar(&self, frame: &mut Frame, area: Rect) {
        let (indicator, color) = match self.poller.state() {
            PollState::Live { .. } => ("●", Color::Green),
            PollState::Stale { .. } => ("○", Color::Yellow),
            PollState::Idle => ("✗", Color::DarkGray),
        };
        let mut status_display = format!("[{}] {}", indicator, self.poller.state().label());
        if let PollState::Live { last_success } = self.poller.state() {
            status_display.push_str(&format!(" {}", last_success.format("%H:%M:%S")));
        }

        let mut spans = vec![Span::raw(" ")];
        let mut title_len = 1;
        for (idx, view) in ActiveView::ALL.iter().enumerate() {
            let text = format!("[{}] {}", idx + 1, view.label());
            title_len += text.chars().count() + 2;
            let style = if *view == self.active_view {
                Style::default().add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            spans.push(Span::styled(text, style));
            spans.push(Span::raw("  "));
        }

        let filters = self.selection.active_count();
        if filters > 0 {
            let text = format!("({} filters)", filters);
            title_len += text.chars().count();
            spans.push(Span::styled(text, Style::default().fg(Color::Magenta)));
        }

        let padding = (area.width as usize)
            .saturating_sub(title_len + status_display.chars().count() + 3);
        spans.push(Span::raw(" ".repeat(padding)));
        spans.push(Span::styled(status_display, Style::default().fg(color)));

        let title = Paragraph::new(Line::from(spans)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(title, area);
    }

    /// Render the status bar with keybindings, or the search prompt
    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        let status = match &self.search_input {
            Some(input) => Paragraph::new(format!(" /{}▏  Enter:Apply  Esc:Cancel", input))
                .style(Style::default().fg(Color::Yellow)),
            None => {
                let extra = match self.active_view {
                    ActiveView::Items => "  s/S:Sort/Reverse",
                    ActiveView::Kanban => "  h/l:Column",
                    ActiveView::Activity => "  n/p:Page",
                    ActiveView::Dashboard => "",
                };
                Paragraph::new(format!(
                    " Tab/1-4:View  j/k:Navigate  gg/G:Top/Bottom{}  /:Search  c:Clear  r:Refresh  q:Quit",
                    extra
                ))
                .style(Style::default().fg(Color::DarkGray))
            }
        };
        frame.render_widget(status.block(Block::default().borders(Borders::ALL)), area);
    }
}

/// Setup the terminal for TUI mode
fn setup_terminal() -> io::Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout());
    Terminal::new(backend)
}

/// Restore the terminal to normal mode
fn restore_terminal() -> io::Result<()> {
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;
    Ok(())
}

/// Fetch on the blocking pool and hand the result back over `tx`.
fn spawn_fetch(
    source: Arc<dyn WorkItemSource>,
    scope: Scope,
    tx: mpsc::Sender<Result<Dataset>>,
) {
    tokio::spawn(async move {
        let result = tokio::task::spawn_blocking(move || source.fetch(&scope))
            .await
            .unwrap_or_else(|e| Err(Error::Other(format!("fetch task failed: {}", e))));
        // Receiver gone means the app is shutting down
        let _ = tx.send(result).await;
    });
}

async fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut TuiApp,
    options: &TuiOptions,
) -> Result<()> {
    let (tx, mut rx) = mpsc::channel(1);
    let pollable = options.scope.is_pollable();
    let mut in_flight = false;
    let mut next_poll = Instant::now();

    loop {
        let due = pollable && Instant::now() >= next_poll;
        if !in_flight && (app.needs_refresh || due) {
            spawn_fetch(options.source.clone(), options.scope.clone(), tx.clone());
            in_flight = true;
            app.needs_refresh = false;
        }

        terminal.draw(|f| app.render(f))?;

        tokio::select! {
            _ = tokio::time::sleep(INPUT_TICK) => {
                if event::poll(Duration::from_millis(0))? {
                    if let Event::Key(key) = event::read()? {
                        if key.kind == KeyEventKind::Press {
                            app.handle_key(key.code);
                        }
                    }
                }
            }
            Some(result) = rx.recv() => {
                in_flight = false;
                app.apply_fetch(result);
                next_poll = Instant::now() + app.poller.next_delay();
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

/// Run the TUI until the user quits.
///
/// Polls on the configured interval while a graph is selected; otherwise
/// fetches once and again only on `r`.
pub fn run(options: TuiOptions) -> Result<()> {
    let poller = Poller::from_secs(options.poll_interval_secs, options.max_backoff_secs);
    let mut app = TuiApp::new(
        poller,
        options.selection.clone(),
        options.field,
        options.page_size,
    );

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    tracing::info!(source = %options.source.describe(), scope = ?options.scope, "starting tui");
    let mut terminal = setup_terminal()?;
    let result = runtime.block_on(event_loop(&mut terminal, &mut app, &options));
    restore_terminal()?;
    result
}
