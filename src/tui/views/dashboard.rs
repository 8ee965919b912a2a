//! Dashboard tab: headline counts and the three short lists.

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, List, ListItem, Paragraph},
};

use super::{meta_color, render_empty, truncate};
use crate::models::WorkItemStatus;
use crate::registry::{priority_meta, status_meta};
use crate::views::dashboard::DashboardView as Dashboard;
use crate::views::{EMPTY_STATE, ItemCard};

pub struct DashboardView {
    pub dashboard: Option<Dashboard>,
}

impl Default for DashboardView {
    fn default() -> Self {
        Self::new()
    }
}

impl DashboardView {
    pub fn new() -> Self {
        Self { dashboard: None }
    }

    pub fn update(&mut self, dashboard: Dashboard) {
        self.dashboard = Some(dashboard);
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let Some(dashboard) = self.dashboard.as_ref().filter(|d| !d.is_empty()) else {
            render_empty(frame, area, "Dashboard", EMPTY_STATE);
            return;
        };

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(3)])
            .split(area);

        let stats = &dashboard.stats;
        let mut counts = vec![
            Span::styled(
                format!(" {} items ", stats.total),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw(format!(
                " {} open  {} overdue  {:.0}% complete  ",
                stats.open(),
                stats.overdue,
                dashboard.completion_rate * 100.0
            )),
        ];
        for status in [
            WorkItemStatus::InProgress,
            WorkItemStatus::InReview,
            WorkItemStatus::Blocked,
            WorkItemStatus::Completed,
        ] {
            let meta = status_meta(status);
            counts.push(Span::styled(
                format!(" {} {} {} ", meta.icon, meta.label, stats.by_status.get(status)),
                Style::default().fg(meta_color(meta)),
            ));
        }
        let header = Paragraph::new(Line::from(counts))
            .block(Block::default().borders(Borders::ALL).title(" Overview "));
        frame.render_widget(header, rows[0]);

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Ratio(1, 3),
                Constraint::Ratio(1, 3),
                Constraint::Ratio(1, 3),
            ])
            .split(rows[1]);

        render_cards(frame, columns[0], "Recently updated", &dashboard.recent);
        render_cards(frame, columns[1], "Top priority", &dashboard.top_priority);
        render_cards(frame, columns[2], "Due soon", &dashboard.upcoming);
    }
}

fn render_cards(frame: &mut Frame, area: Rect, title: &str, cards: &[ItemCard]) {
    let width = area.width.saturating_sub(6) as usize;
    let items: Vec<ListItem> = cards
        .iter()
        .map(|card| {
            let priority = priority_meta(card.priority);
            ListItem::new(Line::from(vec![
                Span::styled(
                    format!("{} ", priority.icon),
                    Style::default().fg(meta_color(priority)),
                ),
                Span::raw(truncate(&card.title, width)),
            ]))
        })
        .collect();

    let list = if items.is_empty() {
        List::new(vec![ListItem::new(Span::styled(
            "(none)",
            Style::default().fg(Color::DarkGray),
        ))])
    } else {
        List::new(items)
    };
    frame.render_widget(
        list.block(Block::default().borders(Borders::ALL).title(format!(" {} ", title))),
        area,
    );
}
