//! Table view: one row per item, sortable by column.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;

use crate::models::{WorkItem, WorkItemStatus};
use crate::priority::PriorityField;
use crate::views::ItemCard;

/// Column the table is sorted by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    /// `updatedAt`, falling back to `createdAt`
    #[default]
    Updated,
    Created,
    Title,
    Priority,
    /// Workflow order
    Status,
    /// Items without a due date sort last in either direction
    Due,
}

impl SortKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Updated => "updated",
            SortKey::Created => "created",
            SortKey::Title => "title",
            SortKey::Priority => "priority",
            SortKey::Status => "status",
            SortKey::Due => "due",
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "updated" | "updated_at" | "updatedat" => Ok(SortKey::Updated),
            "created" | "created_at" | "createdat" => Ok(SortKey::Created),
            "title" => Ok(SortKey::Title),
            "priority" => Ok(SortKey::Priority),
            "status" => Ok(SortKey::Status),
            "due" | "due_date" | "duedate" => Ok(SortKey::Due),
            _ => Err(format!("Unknown sort key: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

/// One table row.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableRow {
    #[serde(flatten)]
    pub card: ItemCard,
    pub created_at: DateTime<Utc>,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableView {
    pub sort: SortKey,
    pub direction: SortDirection,
    pub rows: Vec<TableRow>,
}

fn status_position(status: WorkItemStatus) -> usize {
    let status = status.display_status();
    WorkItemStatus::all()
        .iter()
        .position(|s| *s == status)
        .unwrap_or(0)
}

fn compare(a: &WorkItem, b: &WorkItem, key: SortKey, field: PriorityField) -> Ordering {
    match key {
        SortKey::Updated => a.last_touched().cmp(&b.last_touched()),
        SortKey::Created => a.created_at.cmp(&b.created_at),
        SortKey::Title => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
        SortKey::Priority => a.priority(field).total_cmp(&b.priority(field)),
        SortKey::Status => status_position(a.status).cmp(&status_position(b.status)),
        SortKey::Due => a.due_date.cmp(&b.due_date),
    }
}

/// Sort `items` in place. Stable, so equal keys keep their input order.
pub fn sort_items(
    items: &mut [&WorkItem],
    key: SortKey,
    direction: SortDirection,
    field: PriorityField,
) {
    items.sort_by(|a, b| {
        if key == SortKey::Due {
            match (a.due_date, b.due_date) {
                (None, Some(_)) => return Ordering::Greater,
                (Some(_), None) => return Ordering::Less,
                _ => {}
            }
        }
        let ord = compare(a, b, key, field);
        match direction {
            SortDirection::Asc => ord,
            SortDirection::Desc => ord.reverse(),
        }
    });
}

/// Build the table for `items`.
pub fn build(
    items: &[&WorkItem],
    key: SortKey,
    direction: SortDirection,
    field: PriorityField,
) -> TableView {
    let mut sorted = items.to_vec();
    sort_items(&mut sorted, key, direction, field);

    TableView {
        sort: key,
        direction,
        rows: sorted
            .into_iter()
            .map(|item| TableRow {
                card: ItemCard::from_item(item, field),
                created_at: item.created_at,
                tags: item.tags.clone(),
            })
            .collect(),
    }
}
