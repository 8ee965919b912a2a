//! Filter predicate engine.
//!
//! A [`FilterSelection`] holds independent predicates (search text, status,
//! type, priority bucket, contributor, date range). Active predicates are
//! ANDed; an unset predicate is a no-op. Filtering is a single pass that keeps
//! input order, so a selection with every predicate unset returns the input
//! unchanged.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{WorkItem, WorkItemStatus, WorkItemType};
use crate::priority::{PriorityBucket, PriorityField};
use crate::registry::{status_meta, type_meta};

/// Creation-date window a work item must fall in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum DateRange {
    /// Since midnight UTC today
    Today,
    /// Last 7 days
    Week,
    /// Last 30 days
    Month,
    /// Last 90 days
    Quarter,
    /// Inclusive bounds; either side may be open
    Custom {
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    },
}

impl DateRange {
    /// Returns true if `ts` falls inside the range, evaluated at `now`.
    pub fn contains(&self, ts: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        match self {
            DateRange::Today => {
                let midnight = now
                    .date_naive()
                    .and_hms_opt(0, 0, 0)
                    .map(|dt| dt.and_utc())
                    .unwrap_or(now);
                ts >= midnight && ts <= now
            }
            DateRange::Week => ts >= now - Duration::days(7) && ts <= now,
            DateRange::Month => ts >= now - Duration::days(30) && ts <= now,
            DateRange::Quarter => ts >= now - Duration::days(90) && ts <= now,
            DateRange::Custom { from, to } => {
                from.is_none_or(|from| ts >= from) && to.is_none_or(|to| ts <= to)
            }
        }
    }
}

impl std::str::FromStr for DateRange {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "today" | "day" => Ok(DateRange::Today),
            "week" => Ok(DateRange::Week),
            "month" => Ok(DateRange::Month),
            "quarter" => Ok(DateRange::Quarter),
            _ => Err(format!(
                "Unknown date range: {} (expected today, week, month, or quarter)",
                s
            )),
        }
    }
}

/// The user's current filter choices. `None` means "all".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterSelection {
    /// Case-insensitive substring over title, description, type, status, tags
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<WorkItemStatus>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_type: Option<WorkItemType>,

    /// Compared against the bucket of `priority_field`, never the raw score
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<PriorityBucket>,

    /// Assignee, owner, or contributor id/name/username
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contributor: Option<String>,

    /// Window on `createdAt`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_range: Option<DateRange>,

    /// Which score the priority predicate buckets
    #[serde(default)]
    pub priority_field: PriorityField,
}

impl FilterSelection {
    /// Create a selection with every predicate unset.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn with_status(mut self, status: WorkItemStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_type(mut self, item_type: WorkItemType) -> Self {
        self.item_type = Some(item_type);
        self
    }

    pub fn with_priority(mut self, priority: PriorityBucket) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn with_contributor(mut self, contributor: impl Into<String>) -> Self {
        self.contributor = Some(contributor.into());
        self
    }

    pub fn with_date_range(mut self, range: DateRange) -> Self {
        self.date_range = Some(range);
        self
    }

    pub fn with_priority_field(mut self, field: PriorityField) -> Self {
        self.priority_field = field;
        self
    }

    /// The search needle, lowercased; `None` when blank.
    fn needle(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase)
    }

    fn contributor_needle(&self) -> Option<&str> {
        self.contributor
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Returns true when no predicate is active.
    pub fn is_default(&self) -> bool {
        self.needle().is_none()
            && self.status.is_none()
            && self.item_type.is_none()
            && self.priority.is_none()
            && self.contributor_needle().is_none()
            && self.date_range.is_none()
    }

    /// Number of active predicates (shown as a badge next to "clear filters").
    pub fn active_count(&self) -> usize {
        [
            self.needle().is_some(),
            self.status.is_some(),
            self.item_type.is_some(),
            self.priority.is_some(),
            self.contributor_needle().is_some(),
            self.date_range.is_some(),
        ]
        .into_iter()
        .filter(|active| *active)
        .count()
    }

    /// Returns true if `item` satisfies every active predicate.
    pub fn matches(&self, item: &WorkItem, now: DateTime<Utc>) -> bool {
        self.matches_with_needle(item, self.needle().as_deref(), now)
    }

    fn matches_with_needle(&self, item: &WorkItem, needle: Option<&str>, now: DateTime<Utc>) -> bool {
        if let Some(status) = self.status {
            if item.status.display_status() != status.display_status() {
                return false;
            }
        }
        if let Some(item_type) = self.item_type {
            if item.item_type != item_type {
                return false;
            }
        }
        if let Some(priority) = self.priority {
            if item.priority_bucket(self.priority_field) != priority {
                return false;
            }
        }
        if let Some(who) = self.contributor_needle() {
            if !item.involves(who) {
                return false;
            }
        }
        if let Some(range) = self.date_range {
            if !range.contains(item.created_at, now) {
                return false;
            }
        }
        match needle {
            Some(needle) => search_matches(item, needle),
            None => true,
        }
    }

    /// Keep the items matching every active predicate, in input order.
    pub fn apply<'a>(&self, items: &'a [WorkItem], now: DateTime<Utc>) -> Vec<&'a WorkItem> {
        let needle = self.needle();
        items
            .iter()
            .filter(|item| self.matches_with_needle(item, needle.as_deref(), now))
            .collect()
    }
}

/// `needle` must already be lowercased.
fn search_matches(item: &WorkItem, needle: &str) -> bool {
    let contains = |haystack: &str| haystack.to_lowercase().contains(needle);

    contains(item.title.as_str())
        || item.description.as_deref().is_some_and(contains)
        || contains(item.item_type.as_str())
        || contains(type_meta(item.item_type).label)
        || contains(item.status.display_status().as_str())
        || contains(status_meta(item.status.display_status()).label)
        || item.tags.iter().any(|tag| contains(tag.as_str()))
}
