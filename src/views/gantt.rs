//! Gantt view: one bar per item on a shared timeline.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::{WorkItem, WorkItemStatus};
use crate::priority::PriorityField;
use crate::views::ItemCard;

/// Percent complete implied by a status.
pub fn progress(status: WorkItemStatus) -> u8 {
    match status {
        WorkItemStatus::Completed => 100,
        WorkItemStatus::InReview => 80,
        WorkItemStatus::InProgress => 50,
        WorkItemStatus::Blocked | WorkItemStatus::OnHold => 25,
        WorkItemStatus::NotStarted
        | WorkItemStatus::Proposed
        | WorkItemStatus::Planned
        | WorkItemStatus::Cancelled
        | WorkItemStatus::Unknown => 0,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GanttBar {
    #[serde(flatten)]
    pub card: ItemCard,
    pub start: DateTime<Utc>,
    /// Due date, or last update when there is none; never before `start`
    pub end: DateTime<Utc>,
    pub progress: u8,
    pub overdue: bool,
}

impl GanttBar {
    /// Length of the bar in whole days.
    pub fn duration_days(&self) -> i64 {
        (self.end - self.start).num_days()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GanttChart {
    /// Sorted by start, then end
    pub bars: Vec<GanttBar>,
    /// Earliest start, `None` when there are no bars
    pub start: Option<DateTime<Utc>>,
    /// Latest end, `None` when there are no bars
    pub end: Option<DateTime<Utc>>,
}

pub fn build(items: &[&WorkItem], field: PriorityField, now: DateTime<Utc>) -> GanttChart {
    let mut bars: Vec<GanttBar> = items
        .iter()
        .map(|item| {
            let start = item.created_at;
            let end = item.due_date.unwrap_or_else(|| item.last_touched()).max(start);
            GanttBar {
                card: ItemCard::from_item(item, field),
                start,
                end,
                progress: progress(item.status),
                overdue: item.is_overdue(now),
            }
        })
        .collect();
    bars.sort_by(|a, b| a.start.cmp(&b.start).then(a.end.cmp(&b.end)));

    GanttChart {
        start: bars.iter().map(|b| b.start).min(),
        end: bars.iter().map(|b| b.end).max(),
        bars,
    }
}
