//! Statistics aggregator.
//!
//! One pass over a (usually already filtered) set of work items produces the
//! counts every view header shows. Aggregates of disjoint chunks can be
//! combined with [`WorkItemStats::merge`]; the result equals aggregating the
//! concatenation in one pass.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::{WorkItem, WorkItemStatus};
use crate::priority::{PriorityBucket, PriorityField};

/// Per-status counts. `other` catches statuses the backend sent that are not
/// one of the nine known values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct StatusCounts {
    pub not_started: usize,
    pub proposed: usize,
    pub planned: usize,
    pub in_progress: usize,
    pub in_review: usize,
    pub blocked: usize,
    pub on_hold: usize,
    pub completed: usize,
    pub cancelled: usize,
    pub other: usize,
}

impl StatusCounts {
    fn slot(&mut self, status: WorkItemStatus) -> &mut usize {
        match status {
            WorkItemStatus::NotStarted => &mut self.not_started,
            WorkItemStatus::Proposed => &mut self.proposed,
            WorkItemStatus::Planned => &mut self.planned,
            WorkItemStatus::InProgress => &mut self.in_progress,
            WorkItemStatus::InReview => &mut self.in_review,
            WorkItemStatus::Blocked => &mut self.blocked,
            WorkItemStatus::OnHold => &mut self.on_hold,
            WorkItemStatus::Completed => &mut self.completed,
            WorkItemStatus::Cancelled => &mut self.cancelled,
            WorkItemStatus::Unknown => &mut self.other,
        }
    }

    pub fn increment(&mut self, status: WorkItemStatus) {
        *self.slot(status) += 1;
    }

    pub fn get(&self, status: WorkItemStatus) -> usize {
        match status {
            WorkItemStatus::NotStarted => self.not_started,
            WorkItemStatus::Proposed => self.proposed,
            WorkItemStatus::Planned => self.planned,
            WorkItemStatus::InProgress => self.in_progress,
            WorkItemStatus::InReview => self.in_review,
            WorkItemStatus::Blocked => self.blocked,
            WorkItemStatus::OnHold => self.on_hold,
            WorkItemStatus::Completed => self.completed,
            WorkItemStatus::Cancelled => self.cancelled,
            WorkItemStatus::Unknown => self.other,
        }
    }

    pub fn sum(&self) -> usize {
        WorkItemStatus::all().iter().map(|s| self.get(*s)).sum::<usize>() + self.other
    }

    pub fn merge(&mut self, other: &StatusCounts) {
        for status in WorkItemStatus::all()
            .iter()
            .copied()
            .chain(std::iter::once(WorkItemStatus::Unknown))
        {
            *self.slot(status) += other.get(status);
        }
    }
}

/// Per-bucket priority counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriorityCounts {
    pub critical: usize,
    pub high: usize,
    pub moderate: usize,
    pub low: usize,
    pub minimal: usize,
}

impl PriorityCounts {
    pub fn increment(&mut self, bucket: PriorityBucket) {
        match bucket {
            PriorityBucket::Critical => self.critical += 1,
            PriorityBucket::High => self.high += 1,
            PriorityBucket::Moderate => self.moderate += 1,
            PriorityBucket::Low => self.low += 1,
            PriorityBucket::Minimal => self.minimal += 1,
        }
    }

    pub fn get(&self, bucket: PriorityBucket) -> usize {
        match bucket {
            PriorityBucket::Critical => self.critical,
            PriorityBucket::High => self.high,
            PriorityBucket::Moderate => self.moderate,
            PriorityBucket::Low => self.low,
            PriorityBucket::Minimal => self.minimal,
        }
    }

    pub fn sum(&self) -> usize {
        self.critical + self.high + self.moderate + self.low + self.minimal
    }

    pub fn merge(&mut self, other: &PriorityCounts) {
        self.critical += other.critical;
        self.high += other.high;
        self.moderate += other.moderate;
        self.low += other.low;
        self.minimal += other.minimal;
    }
}

/// Aggregate counts over a set of work items.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkItemStats {
    pub total: usize,
    pub by_status: StatusCounts,
    /// Keyed by the type's wire string (e.g. "BUG")
    pub by_type: BTreeMap<String, usize>,
    pub by_priority: PriorityCounts,
    /// Open items whose due date has passed
    pub overdue: usize,
}

impl WorkItemStats {
    /// Create an empty aggregate.
    pub fn new() -> Self {
        Self::default()
    }

    /// Aggregate `items` in one pass.
    pub fn from_items<'a, I>(items: I, field: PriorityField, now: DateTime<Utc>) -> Self
    where
        I: IntoIterator<Item = &'a WorkItem>,
    {
        let mut stats = Self::new();
        for item in items {
            stats.add(item, field, now);
        }
        stats
    }

    /// Fold one item into the aggregate.
    pub fn add(&mut self, item: &WorkItem, field: PriorityField, now: DateTime<Utc>) {
        self.total += 1;
        self.by_status.increment(item.status);
        *self
            .by_type
            .entry(item.item_type.as_str().to_string())
            .or_insert(0) += 1;
        self.by_priority.increment(item.priority_bucket(field));
        if item.is_overdue(now) {
            self.overdue += 1;
        }
    }

    /// Component-wise sum with another aggregate.
    pub fn merge(&mut self, other: &WorkItemStats) {
        self.total += other.total;
        self.by_status.merge(&other.by_status);
        for (item_type, count) in &other.by_type {
            *self.by_type.entry(item_type.clone()).or_insert(0) += count;
        }
        self.by_priority.merge(&other.by_priority);
        self.overdue += other.overdue;
    }

    /// Items still in play (not completed or cancelled).
    pub fn open(&self) -> usize {
        self.total - self.by_status.completed - self.by_status.cancelled
    }

    /// Completed / total, 0.0 when empty.
    pub fn completion_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.by_status.completed as f64 / self.total as f64
        }
    }
}
