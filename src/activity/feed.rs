//! Activity feed filtering and pagination.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::fmt;

use super::{ActivityCategory, ActivityEvent, ActivityKind};
use crate::priority::PriorityBucket;

/// Page size used when nothing else is configured.
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// How far back the feed looks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeRange {
    Hour,
    Day,
    Week,
    Month,
    #[default]
    All,
}

impl TimeRange {
    /// Window length, `None` for unbounded.
    pub fn window(&self) -> Option<Duration> {
        match self {
            TimeRange::Hour => Some(Duration::hours(1)),
            TimeRange::Day => Some(Duration::days(1)),
            TimeRange::Week => Some(Duration::days(7)),
            TimeRange::Month => Some(Duration::days(30)),
            TimeRange::All => None,
        }
    }

    pub fn contains(&self, timestamp: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        self.window().is_none_or(|w| timestamp >= now - w)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeRange::Hour => "hour",
            TimeRange::Day => "day",
            TimeRange::Week => "week",
            TimeRange::Month => "month",
            TimeRange::All => "all",
        }
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for TimeRange {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "hour" | "1h" => Ok(TimeRange::Hour),
            "day" | "24h" => Ok(TimeRange::Day),
            "week" | "7d" => Ok(TimeRange::Week),
            "month" | "30d" => Ok(TimeRange::Month),
            "all" => Ok(TimeRange::All),
            _ => Err(format!("Unknown time range: {}", s)),
        }
    }
}

/// Feed filter. Unset fields accept everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeedFilter {
    pub kind: Option<ActivityKind>,
    pub category: Option<ActivityCategory>,
    pub priority: Option<PriorityBucket>,
    pub search: Option<String>,
    pub range: TimeRange,
}

impl FeedFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_kind(mut self, kind: ActivityKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn with_category(mut self, category: ActivityCategory) -> Self {
        self.category = Some(category);
        self
    }

    pub fn with_priority(mut self, priority: PriorityBucket) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn with_range(mut self, range: TimeRange) -> Self {
        self.range = range;
        self
    }

    pub fn matches(&self, event: &ActivityEvent, now: DateTime<Utc>) -> bool {
        if self.kind.is_some_and(|k| k != event.kind) {
            return false;
        }
        if self.category.is_some_and(|c| c != event.category) {
            return false;
        }
        if self.priority.is_some_and(|p| p != event.priority) {
            return false;
        }
        if let Some(needle) = self.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            let needle = needle.to_lowercase();
            let hit = [
                event.description.as_str(),
                event.item_title.as_str(),
                event.actor.as_str(),
            ]
            .iter()
            .any(|field| field.to_lowercase().contains(&needle));
            if !hit {
                return false;
            }
        }
        self.range.contains(event.timestamp, now)
    }

    /// Matching events, in feed order.
    pub fn apply<'a>(&self, events: &'a [ActivityEvent], now: DateTime<Utc>) -> Vec<&'a ActivityEvent> {
        events.iter().filter(|e| self.matches(e, now)).collect()
    }
}

/// One page of a paginated list.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    /// 1-based page number actually served
    pub page: usize,
    pub page_size: usize,
    pub total_items: usize,
    /// Always at least 1
    pub total_pages: usize,
    pub items: Vec<T>,
}

impl<T> Page<T> {
    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }
}

/// Cut `items` into fixed-size pages and return page `page` (1-based).
///
/// Page 0 is treated as page 1 and pages past the end clamp to the last
/// page. A page size of 0 is treated as 1.
pub fn paginate<T: Clone>(items: &[T], page: usize, page_size: usize) -> Page<T> {
    let page_size = page_size.max(1);
    let total_items = items.len();
    let total_pages = total_items.div_ceil(page_size).max(1);
    let page = page.clamp(1, total_pages);
    let start = (page - 1) * page_size;
    let end = (start + page_size).min(total_items);

    Page {
        page,
        page_size,
        total_items,
        total_pages,
        items: items.get(start..end).map(<[T]>::to_vec).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activity::synthesize_all;
    use crate::models::{UserRef, WorkItem, WorkItemStatus};
    use crate::priority::PriorityField;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn sample_feed(now: DateTime<Utc>) -> Vec<ActivityEvent> {
        let mut items = Vec::new();
        for i in 0..12 {
            let mut item = WorkItem::new(format!("wi-{}", i), format!("Item {}", i));
            item.created_at = now - Duration::days(i * 3);
            item.updated_at = Some(now - Duration::days(i * 3) + Duration::hours(2));
            if i % 3 == 0 {
                item.status = WorkItemStatus::Completed;
            }
            if i % 2 == 0 {
                item.assigned_to = Some(UserRef {
                    id: format!("u-{}", i),
                    name: Some(format!("Person {}", i)),
                    username: None,
                });
            }
            item.priority_comp = Some(i as f64 / 12.0);
            items.push(item);
        }
        synthesize_all(&items, PriorityField::Comp, &mut StdRng::seed_from_u64(11))
    }

    #[test]
    fn test_pages_concatenate_to_feed() {
        let now = Utc::now();
        let feed = sample_feed(now);
        assert!(feed.len() > DEFAULT_PAGE_SIZE);

        for size in [1, 3, 7, DEFAULT_PAGE_SIZE, 500] {
            let first = paginate(&feed, 1, size);
            let mut joined = Vec::new();
            for page in 1..=first.total_pages {
                joined.extend(paginate(&feed, page, size).items);
            }
            assert_eq!(joined, feed, "page size {}", size);
        }
    }

    #[test]
    fn test_out_of_range_page_clamps_to_last() {
        let items: Vec<u32> = (0..45).collect();
        let page = paginate(&items, 99, 20);
        assert_eq!(page.page, 3);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.items, vec![40, 41, 42, 43, 44]);
        assert!(!page.has_next());
        assert!(page.has_previous());

        let page = paginate(&items, 0, 20);
        assert_eq!(page.page, 1);
        assert_eq!(page.items.len(), 20);
    }

    #[test]
    fn test_empty_feed_has_one_empty_page() {
        let items: Vec<u32> = Vec::new();
        let page = paginate(&items, 4, 20);
        assert_eq!(page.page, 1);
        assert_eq!(page.total_pages, 1);
        assert!(page.items.is_empty());
        assert!(!page.has_next());
    }

    #[test]
    fn test_filter_by_kind_and_category() {
        let now = Utc::now();
        let feed = sample_feed(now);

        let completed = FeedFilter::new()
            .with_kind(ActivityKind::Completed)
            .apply(&feed, now);
        assert_eq!(completed.len(), 4);
        assert!(completed.iter().all(|e| e.kind == ActivityKind::Completed));

        let user = FeedFilter::new()
            .with_category(ActivityCategory::User)
            .apply(&feed, now);
        assert!(!user.is_empty());
        assert!(user.iter().all(|e| e.category == ActivityCategory::User));
    }

    #[test]
    fn test_filter_by_time_range() {
        let now = Utc::now();
        let feed = sample_feed(now);
        let week = FeedFilter::new().with_range(TimeRange::Week).apply(&feed, now);
        assert!(!week.is_empty());
        assert!(week.iter().all(|e| e.timestamp >= now - Duration::days(7)));
        assert!(week.len() < feed.len());

        let all = FeedFilter::new().apply(&feed, now);
        assert_eq!(all.len(), feed.len());
    }

    #[test]
    fn test_filter_search_matches_actor_and_title() {
        let now = Utc::now();
        let feed = sample_feed(now);
        let by_actor = FeedFilter::new().with_search("person 4").apply(&feed, now);
        assert!(!by_actor.is_empty());
        assert!(by_actor.iter().all(|e| e.actor == "Person 4"));

        let by_title = FeedFilter::new().with_search("ITEM 11").apply(&feed, now);
        assert!(by_title.iter().all(|e| e.item_id == "wi-11"));

        let blank = FeedFilter::new().with_search("   ").apply(&feed, now);
        assert_eq!(blank.len(), feed.len());
    }

    #[test]
    fn test_filter_by_priority() {
        let now = Utc::now();
        let feed = sample_feed(now);
        let critical = FeedFilter::new()
            .with_priority(PriorityBucket::Critical)
            .apply(&feed, now);
        assert!(!critical.is_empty());
        assert!(critical.iter().all(|e| e.priority == PriorityBucket::Critical));
    }

    #[test]
    fn test_time_range_from_str() {
        assert_eq!("week".parse::<TimeRange>().unwrap(), TimeRange::Week);
        assert_eq!("ALL".parse::<TimeRange>().unwrap(), TimeRange::All);
        assert!("decade".parse::<TimeRange>().is_err());
    }
}
