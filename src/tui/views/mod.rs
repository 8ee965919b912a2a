//! TUI Views module
//!
//! One view per tab. Each view owns its selection state and renders from the
//! derived view structs in [`crate::views`].

mod activity;
mod dashboard;
mod items;
mod kanban;

pub use activity::ActivityView;
pub use dashboard::DashboardView;
pub use items::ItemsView;
pub use kanban::KanbanView;

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, ListState, Paragraph},
};

use crate::registry::{DisplayMeta, hex_to_rgb};

/// Terminal color for a registry entry.
pub(crate) fn meta_color(meta: DisplayMeta) -> Color {
    hex_to_rgb(meta.hex)
        .map(|(r, g, b)| Color::Rgb(r, g, b))
        .unwrap_or(Color::Gray)
}

/// Truncate to `width` characters, ending in "..." when cut.
pub(crate) fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        return s.to_string();
    }
    let kept: String = s.chars().take(width.saturating_sub(3)).collect();
    format!("{}...", kept)
}

/// Placeholder paragraph for an empty view.
pub(crate) fn render_empty(frame: &mut Frame, area: Rect, title: &str, message: &str) {
    let empty = Paragraph::new(message.to_string())
        .style(Style::default().fg(Color::DarkGray))
        .block(Block::default().borders(Borders::ALL).title(format!(" {} ", title)));
    frame.render_widget(empty, area);
}

/// Cursor over a list of `len` rows.
#[derive(Debug, Default)]
pub struct Selection {
    pub selected: usize,
    pub list_state: ListState,
    len: usize,
}

impl Selection {
    pub fn new() -> Self {
        let mut list_state = ListState::default();
        list_state.select(Some(0));
        Self {
            selected: 0,
            list_state,
            len: 0,
        }
    }

    /// Keep the cursor valid after the list changed length.
    pub fn set_len(&mut self, len: usize) {
        self.len = len;
        if self.selected >= len {
            self.selected = len.saturating_sub(1);
        }
        self.list_state.select(Some(self.selected));
    }

    pub fn select_next(&mut self) {
        if self.len == 0 {
            return;
        }
        self.selected = (self.selected + 1).min(self.len - 1);
        self.list_state.select(Some(self.selected));
    }

    pub fn select_previous(&mut self) {
        if self.len == 0 {
            return;
        }
        self.selected = self.selected.saturating_sub(1);
        self.list_state.select(Some(self.selected));
    }

    pub fn select_first(&mut self) {
        self.selected = 0;
        self.list_state.select(Some(0));
    }

    pub fn select_last(&mut self) {
        if self.len == 0 {
            return;
        }
        self.selected = self.len - 1;
        self.list_state.select(Some(self.selected));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selection_clamps() {
        let mut sel = Selection::new();
        sel.select_next();
        assert_eq!(sel.selected, 0);

        sel.set_len(3);
        sel.select_last();
        assert_eq!(sel.selected, 2);
        sel.select_next();
        assert_eq!(sel.selected, 2);

        sel.set_len(1);
        assert_eq!(sel.selected, 0);
        sel.select_previous();
        assert_eq!(sel.selected, 0);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a long title here", 10), "a long ...");
        assert_eq!(truncate("ünïcödé ünïcödé", 8), "ünïcö...");
    }

    #[test]
    fn test_meta_color_uses_hex() {
        let meta = crate::registry::status_meta(crate::models::WorkItemStatus::Blocked);
        assert!(matches!(meta_color(meta), Color::Rgb(_, _, _)));
    }
}
