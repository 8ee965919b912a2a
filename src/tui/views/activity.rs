//! Activity tab: paginated feed, n/p flips pages.

use chrono::{DateTime, Utc};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, List, ListItem},
};

use super::{Selection, meta_color, render_empty, truncate};
use crate::activity::{ActivityEvent, Page, paginate};
use crate::registry::priority_meta;

pub struct ActivityView {
    events: Vec<ActivityEvent>,
    pub page: Page<ActivityEvent>,
    pub page_size: usize,
    pub selection: Selection,
    now: DateTime<Utc>,
}

impl ActivityView {
    pub fn new(page_size: usize) -> Self {
        Self {
            events: Vec::new(),
            page: paginate(&[], 1, page_size),
            page_size,
            selection: Selection::new(),
            now: Utc::now(),
        }
    }

    /// Replace the feed, keeping the current page number where possible.
    pub fn update(&mut self, events: Vec<ActivityEvent>, now: DateTime<Utc>) {
        self.events = events;
        self.now = now;
        self.go_to(self.page.page);
    }

    fn go_to(&mut self, page: usize) {
        self.page = paginate(&self.events, page, self.page_size);
        self.selection.set_len(self.page.items.len());
    }

    pub fn next_page(&mut self) {
        if self.page.has_next() {
            self.go_to(self.page.page + 1);
            self.selection.select_first();
        }
    }

    pub fn previous_page(&mut self) {
        if self.page.has_previous() {
            self.go_to(self.page.page - 1);
            self.selection.select_first();
        }
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect) {
        let title = format!(
            " Activity  page {}/{} ({} events) ",
            self.page.page, self.page.total_pages, self.page.total_items
        );
        if self.page.items.is_empty() {
            render_empty(frame, area, &title, "No activity matches the current filters");
            return;
        }

        let width = area.width.saturating_sub(32) as usize;
        let items: Vec<ListItem> = self
            .page
            .items
            .iter()
            .enumerate()
            .map(|(idx, event)| {
                let priority = priority_meta(event.priority);
                let style = if idx == self.selection.selected {
                    Style::default().bg(Color::DarkGray)
                } else {
                    Style::default()
                };
                ListItem::new(Line::from(vec![
                    Span::styled(
                        format!(" {:>4} ", event.relative_time(self.now)),
                        Style::default().fg(Color::DarkGray),
                    ),
                    Span::styled(
                        format!("{} ", event.kind.icon()),
                        Style::default().fg(meta_color(priority)),
                    ),
                    Span::styled(
                        format!("{:<16} ", truncate(&event.actor, 16)),
                        Style::default().fg(Color::Cyan),
                    ),
                    Span::raw(truncate(&event.description, width)),
                ]))
                .style(style)
            })
            .collect();

        let list = List::new(items).block(Block::default().borders(Borders::ALL).title(title));
        frame.render_stateful_widget(list, area, &mut self.selection.list_state);
    }
}
