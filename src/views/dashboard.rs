//! Dashboard summary: headline stats plus a few short lists.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::models::WorkItem;
use crate::priority::PriorityField;
use crate::stats::WorkItemStats;
use crate::views::{ItemCard, cards, sort_by_priority_desc};

/// Length of each list on the dashboard.
pub const LIST_LIMIT: usize = 5;

/// How far ahead the upcoming list looks.
pub const UPCOMING_WINDOW_DAYS: i64 = 14;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    pub stats: WorkItemStats,
    pub completion_rate: f64,
    /// Most recently touched items
    pub recent: Vec<ItemCard>,
    /// Highest-priority items that are still open
    pub top_priority: Vec<ItemCard>,
    /// Open items due within the upcoming window, soonest first
    pub upcoming: Vec<ItemCard>,
}

impl DashboardView {
    pub fn is_empty(&self) -> bool {
        self.stats.total == 0
    }
}

pub fn build(items: &[&WorkItem], field: PriorityField, now: DateTime<Utc>) -> DashboardView {
    let stats = WorkItemStats::from_items(items.iter().copied(), field, now);

    let mut recent = items.to_vec();
    recent.sort_by_key(|item| std::cmp::Reverse(item.last_touched()));
    recent.truncate(LIST_LIMIT);

    let mut open: Vec<&WorkItem> = items
        .iter()
        .copied()
        .filter(|item| !item.status.is_closed())
        .collect();
    sort_by_priority_desc(&mut open, field);
    open.truncate(LIST_LIMIT);

    let horizon = now + Duration::days(UPCOMING_WINDOW_DAYS);
    let mut upcoming: Vec<&WorkItem> = items
        .iter()
        .copied()
        .filter(|item| !item.status.is_closed())
        .filter(|item| item.due_date.is_some_and(|due| due >= now && due <= horizon))
        .collect();
    upcoming.sort_by_key(|item| item.due_date);

    DashboardView {
        completion_rate: stats.completion_rate(),
        stats,
        recent: cards(&recent, field),
        top_priority: cards(&open, field),
        upcoming: cards(&upcoming, field),
    }
}
