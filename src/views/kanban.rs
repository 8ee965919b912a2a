//! Kanban board: one column per workflow status.

use serde::Serialize;

use crate::models::{WorkItem, WorkItemStatus};
use crate::priority::PriorityField;
use crate::registry::status_meta;
use crate::views::{ItemCard, cards, sort_by_priority_desc};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KanbanColumn {
    pub status: WorkItemStatus,
    pub label: &'static str,
    pub count: usize,
    pub cards: Vec<ItemCard>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KanbanBoard {
    pub columns: Vec<KanbanColumn>,
}

impl KanbanBoard {
    /// Cards across all columns.
    pub fn total_cards(&self) -> usize {
        self.columns.iter().map(|c| c.count).sum()
    }

    pub fn column(&self, status: WorkItemStatus) -> Option<&KanbanColumn> {
        self.columns.iter().find(|c| c.status == status)
    }
}

/// Group `items` into workflow columns, each sorted by priority (highest
/// first). Unknown statuses land in the NOT_STARTED column.
pub fn build(items: &[&WorkItem], field: PriorityField, hide_empty: bool) -> KanbanBoard {
    let columns = WorkItemStatus::all()
        .iter()
        .map(|status| {
            let mut members: Vec<&WorkItem> = items
                .iter()
                .copied()
                .filter(|item| item.status.display_status() == *status)
                .collect();
            sort_by_priority_desc(&mut members, field);
            KanbanColumn {
                status: *status,
                label: status_meta(*status).label,
                count: members.len(),
                cards: cards(&members, field),
            }
        })
        .filter(|column| !hide_empty || column.count > 0)
        .collect();

    KanbanBoard { columns }
}
