//! View models.
//!
//! Each submodule turns an already filtered slice of work items into the
//! serializable data one dashboard view renders. Nothing here performs I/O.

pub mod calendar;
pub mod dashboard;
pub mod gantt;
pub mod graph;
pub mod kanban;
pub mod table;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::{WorkItem, WorkItemStatus, WorkItemType};
use crate::priority::{PriorityBucket, PriorityField};

/// Shown by every view when the filtered set is empty.
pub const EMPTY_STATE: &str = "No work items match the current filters";

/// Compact summary of one work item, shared by the card-style views.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemCard {
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub item_type: WorkItemType,
    /// Display status (unknown statuses show as NOT_STARTED)
    pub status: WorkItemStatus,
    pub priority: PriorityBucket,
    pub priority_score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl ItemCard {
    pub fn from_item(item: &WorkItem, field: PriorityField) -> Self {
        let score = item.priority(field);
        Self {
            id: item.id.clone(),
            title: item.title.clone(),
            item_type: item.item_type,
            status: item.status.display_status(),
            priority: PriorityBucket::from_score(score),
            priority_score: score,
            assignee: item
                .assigned_to
                .as_ref()
                .map(|u| u.display_name().to_string()),
            due_date: item.due_date,
            updated_at: item.last_touched(),
        }
    }
}

/// Cards for `items`, in the given order.
pub fn cards(items: &[&WorkItem], field: PriorityField) -> Vec<ItemCard> {
    items
        .iter()
        .map(|item| ItemCard::from_item(item, field))
        .collect()
}

/// Sort by priority score, highest first. Stable.
pub(crate) fn sort_by_priority_desc(items: &mut [&WorkItem], field: PriorityField) {
    items.sort_by(|a, b| b.priority(field).total_cmp(&a.priority(field)));
}

#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::{DateTime, Duration, Utc};

    use crate::models::{UserRef, WorkItem, WorkItemStatus, WorkItemType};

    /// Fixed reference time for view tests.
    pub fn now() -> DateTime<Utc> {
        "2026-03-10T12:00:00Z".parse().unwrap()
    }

    pub fn item(id: &str, status: WorkItemStatus, score: f64, age_days: i64) -> WorkItem {
        let mut item = WorkItem::new(id, format!("Item {}", id));
        item.status = status;
        item.priority_comp = Some(score);
        item.created_at = now() - Duration::days(age_days);
        item.updated_at = Some(item.created_at + Duration::hours(1));
        item
    }

    pub fn assigned(mut item: WorkItem, name: &str) -> WorkItem {
        item.assigned_to = Some(UserRef {
            id: format!("u-{}", name.to_lowercase()),
            name: Some(name.to_string()),
            username: None,
        });
        item
    }

    pub fn typed(mut item: WorkItem, item_type: WorkItemType) -> WorkItem {
        item.item_type = item_type;
        item
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn test_card_uses_display_status() {
        let item = item("a", WorkItemStatus::Unknown, 0.9, 1);
        let card = ItemCard::from_item(&item, PriorityField::Comp);
        assert_eq!(card.status, WorkItemStatus::NotStarted);
        assert_eq!(card.priority, PriorityBucket::Critical);
    }

    #[test]
    fn test_card_serializes_camel_case() {
        let item = assigned(item("a", WorkItemStatus::InProgress, 0.5, 1), "Robin");
        let json = serde_json::to_value(ItemCard::from_item(&item, PriorityField::Comp)).unwrap();
        assert_eq!(json["type"], "DEFAULT");
        assert_eq!(json["status"], "IN_PROGRESS");
        assert_eq!(json["priority"], "moderate");
        assert_eq!(json["assignee"], "Robin");
        assert!(json.get("dueDate").is_none());
    }

    #[test]
    fn test_sort_by_priority_is_stable() {
        let a = item("a", WorkItemStatus::NotStarted, 0.5, 1);
        let b = item("b", WorkItemStatus::NotStarted, 0.9, 1);
        let c = item("c", WorkItemStatus::NotStarted, 0.5, 1);
        let mut refs = vec![&a, &b, &c];
        sort_by_priority_desc(&mut refs, PriorityField::Comp);
        let ids: Vec<&str> = refs.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a", "c"]);
    }
}
