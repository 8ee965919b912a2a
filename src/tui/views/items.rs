//! Items tab: the sortable table with keyboard navigation.

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, List, ListItem},
};

use super::{Selection, meta_color, render_empty, truncate};
use crate::registry::{priority_meta, status_meta, type_meta};
use crate::views::EMPTY_STATE;
use crate::views::table::{SortDirection, SortKey, TableRow, TableView};

/// Sort keys in the order `s` cycles through them.
const SORT_CYCLE: [SortKey; 6] = [
    SortKey::Updated,
    SortKey::Priority,
    SortKey::Due,
    SortKey::Status,
    SortKey::Title,
    SortKey::Created,
];

pub struct ItemsView {
    pub rows: Vec<TableRow>,
    pub sort: SortKey,
    pub direction: SortDirection,
    pub selection: Selection,
}

impl Default for ItemsView {
    fn default() -> Self {
        Self::new()
    }
}

impl ItemsView {
    pub fn new() -> Self {
        Self {
            rows: Vec::new(),
            sort: SortKey::default(),
            direction: SortDirection::default(),
            selection: Selection::new(),
        }
    }

    pub fn update(&mut self, table: TableView) {
        self.rows = table.rows;
        self.selection.set_len(self.rows.len());
    }

    /// Advance to the next sort key. The caller rebuilds the table.
    pub fn cycle_sort(&mut self) {
        let pos = SORT_CYCLE.iter().position(|k| *k == self.sort).unwrap_or(0);
        self.sort = SORT_CYCLE[(pos + 1) % SORT_CYCLE.len()];
    }

    pub fn toggle_direction(&mut self) {
        self.direction = match self.direction {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        };
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect) {
        let arrow = match self.direction {
            SortDirection::Asc => "↑",
            SortDirection::Desc => "↓",
        };
        let title = format!(" Items ({}) sorted by {} {} ", self.rows.len(), self.sort, arrow);

        if self.rows.is_empty() {
            render_empty(frame, area, &title, EMPTY_STATE);
            return;
        }

        // " > id          status       [prio] type   title ... @assignee"
        let title_width = area.width.saturating_sub(62) as usize;
        let list_items: Vec<ListItem> = self
            .rows
            .iter()
            .enumerate()
            .map(|(idx, row)| {
                let card = &row.card;
                let status = status_meta(card.status);
                let priority = priority_meta(card.priority);
                let marker = if idx == self.selection.selected { ">" } else { " " };
                let assignee = card
                    .assignee
                    .as_deref()
                    .map(|a| format!("@{}", a))
                    .unwrap_or_else(|| "(unassigned)".to_string());

                let line = Line::from(vec![
                    Span::raw(format!(" {} ", marker)),
                    Span::styled(
                        format!("{:<12}", truncate(&card.id, 12)),
                        Style::default().fg(Color::Blue),
                    ),
                    Span::styled(
                        format!("{} {:<12}", status.icon, status.label),
                        Style::default().fg(meta_color(status)),
                    ),
                    Span::styled(
                        format!("[{:<8}] ", priority.label),
                        Style::default().fg(meta_color(priority)),
                    ),
                    Span::raw(format!("{:<10}", type_meta(card.item_type).label)),
                    Span::raw(format!(
                        "{:<width$}",
                        truncate(&card.title, title_width),
                        width = title_width
                    )),
                    Span::styled(
                        format!(" {:>15}", truncate(&assignee, 15)),
                        Style::default().fg(Color::DarkGray),
                    ),
                ]);

                let style = if idx == self.selection.selected {
                    Style::default().bg(Color::DarkGray)
                } else {
                    Style::default()
                };
                ListItem::new(line).style(style)
            })
            .collect();

        let list = List::new(list_items).block(Block::default().borders(Borders::ALL).title(title));
        frame.render_stateful_widget(list, area, &mut self.selection.list_state);
    }
}
