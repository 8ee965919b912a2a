//! Kanban tab: one column per status, h/l moves between columns.

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, List, ListItem},
};

use super::{Selection, meta_color, render_empty, truncate};
use crate::registry::{priority_meta, status_meta};
use crate::views::EMPTY_STATE;
use crate::views::kanban::KanbanBoard;

pub struct KanbanView {
    pub board: Option<KanbanBoard>,
    pub column: usize,
    pub selection: Selection,
}

impl Default for KanbanView {
    fn default() -> Self {
        Self::new()
    }
}

impl KanbanView {
    pub fn new() -> Self {
        Self {
            board: None,
            column: 0,
            selection: Selection::new(),
        }
    }

    /// Empty columns are expected to be hidden by the caller.
    pub fn update(&mut self, board: KanbanBoard) {
        let columns = board.columns.len();
        self.board = Some(board);
        if self.column >= columns {
            self.column = columns.saturating_sub(1);
        }
        self.sync_selection();
    }

    fn sync_selection(&mut self) {
        let len = self
            .board
            .as_ref()
            .and_then(|b| b.columns.get(self.column))
            .map_or(0, |c| c.cards.len());
        self.selection.set_len(len);
    }

    pub fn next_column(&mut self) {
        let columns = self.board.as_ref().map_or(0, |b| b.columns.len());
        if self.column + 1 < columns {
            self.column += 1;
            self.selection.select_first();
            self.sync_selection();
        }
    }

    pub fn previous_column(&mut self) {
        if self.column > 0 {
            self.column -= 1;
            self.selection.select_first();
            self.sync_selection();
        }
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect) {
        let Some(board) = self.board.as_ref().filter(|b| b.total_cards() > 0) else {
            render_empty(frame, area, "Kanban", EMPTY_STATE);
            return;
        };

        let count = board.columns.len().max(1) as u32;
        let constraints: Vec<Constraint> = board
            .columns
            .iter()
            .map(|_| Constraint::Ratio(1, count))
            .collect();
        let areas = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(constraints)
            .split(area);

        for (idx, (column, col_area)) in board.columns.iter().zip(areas.iter()).enumerate() {
            let active = idx == self.column;
            let meta = status_meta(column.status);
            let width = col_area.width.saturating_sub(6) as usize;

            let items: Vec<ListItem> = column
                .cards
                .iter()
                .enumerate()
                .map(|(row, card)| {
                    let priority = priority_meta(card.priority);
                    let style = if active && row == self.selection.selected {
                        Style::default().bg(Color::DarkGray)
                    } else {
                        Style::default()
                    };
                    ListItem::new(Line::from(vec![
                        Span::styled(
                            format!("{} ", priority.icon),
                            Style::default().fg(meta_color(priority)),
                        ),
                        Span::raw(truncate(&card.title, width)),
                    ]))
                    .style(style)
                })
                .collect();

            let mut border = Style::default().fg(meta_color(meta));
            if active {
                border = border.add_modifier(Modifier::BOLD);
            }
            let block = Block::default()
                .borders(Borders::ALL)
                .border_style(border)
                .title(format!(" {} {} ({}) ", meta.icon, column.label, column.count));
            frame.render_widget(List::new(items).block(block), *col_area);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::WorkItemStatus;
    use crate::priority::PriorityField;
    use crate::views::fixtures::item;
    use crate::views::kanban;

    #[test]
    fn test_column_navigation_stays_in_bounds() {
        let items = [
            item("a", WorkItemStatus::InProgress, 0.5, 1),
            item("b", WorkItemStatus::Completed, 0.5, 1),
            item("c", WorkItemStatus::Completed, 0.5, 1),
        ];
        let refs: Vec<_> = items.iter().collect();
        let mut view = KanbanView::new();
        view.update(kanban::build(&refs, PriorityField::Comp, true));

        view.previous_column();
        assert_eq!(view.column, 0);
        view.next_column();
        view.next_column();
        assert_eq!(view.column, 1);
        assert_eq!(view.selection.len, 2);
    }
}
