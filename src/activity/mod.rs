//! Activity synthesis.
//!
//! The backend keeps no audit trail, so the activity feed is derived from
//! each work item's timestamps and optional fields:
//!
//! - `created` at `createdAt`, always
//! - `status_changed` at `updatedAt`, when it differs from `createdAt`
//! - `assigned` within an hour of creation, when an assignee is set
//! - `priority_updated` at `updatedAt`, when composite priority exceeds 0.5
//! - `due_date_set` at `createdAt`, when a due date is set
//! - `completed` at `updatedAt`, when the status is COMPLETED
//! - `commented` with probability 0.4, somewhere in the item's lifetime
//!
//! The assignment jitter and the comment roll draw from a caller-supplied
//! [`rand::Rng`], so a seeded generator gives reproducible feeds.

pub mod feed;

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::{WorkItem, WorkItemStatus, WorkItemType};
use crate::priority::{PriorityBucket, PriorityField};
use crate::registry::{priority_meta, status_meta, type_meta};

pub use feed::{FeedFilter, Page, TimeRange, DEFAULT_PAGE_SIZE, paginate};

/// Probability that an item gets a synthesized comment.
pub const COMMENT_PROBABILITY: f64 = 0.4;

/// Composite priority above which a priority event is emitted.
pub const PRIORITY_EVENT_THRESHOLD: f64 = 0.5;

/// Upper bound of the assignment jitter after creation, in seconds.
pub const ASSIGNMENT_WINDOW_SECS: i64 = 3600;

/// Comment window when an item was never updated, in seconds.
pub const COMMENT_FALLBACK_WINDOW_SECS: i64 = 86_400;

/// Actor shown when an item has neither assignee nor owner.
pub const PLACEHOLDER_ACTOR: &str = "Team Member";

/// What happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    Created,
    StatusChanged,
    Assigned,
    PriorityUpdated,
    DueDateSet,
    Completed,
    Commented,
}

impl ActivityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityKind::Created => "created",
            ActivityKind::StatusChanged => "status_changed",
            ActivityKind::Assigned => "assigned",
            ActivityKind::PriorityUpdated => "priority_updated",
            ActivityKind::DueDateSet => "due_date_set",
            ActivityKind::Completed => "completed",
            ActivityKind::Commented => "commented",
        }
    }

    /// Feed grouping for this kind of event.
    pub fn category(&self) -> ActivityCategory {
        match self {
            ActivityKind::Created
            | ActivityKind::StatusChanged
            | ActivityKind::DueDateSet
            | ActivityKind::Completed => ActivityCategory::Task,
            ActivityKind::Assigned | ActivityKind::Commented => ActivityCategory::User,
            ActivityKind::PriorityUpdated => ActivityCategory::System,
        }
    }

    /// Glyph for terminal output.
    pub fn icon(&self) -> &'static str {
        match self {
            ActivityKind::Created => "+",
            ActivityKind::StatusChanged => "~",
            ActivityKind::Assigned => "@",
            ActivityKind::PriorityUpdated => "!",
            ActivityKind::DueDateSet => "⏲",
            ActivityKind::Completed => "✓",
            ActivityKind::Commented => "✎",
        }
    }

    pub fn all() -> &'static [ActivityKind] {
        &[
            ActivityKind::Created,
            ActivityKind::StatusChanged,
            ActivityKind::Assigned,
            ActivityKind::PriorityUpdated,
            ActivityKind::DueDateSet,
            ActivityKind::Completed,
            ActivityKind::Commented,
        ]
    }
}

impl fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ActivityKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('-', "_");
        ActivityKind::all()
            .iter()
            .copied()
            .find(|k| k.as_str() == normalized)
            .ok_or_else(|| format!("Unknown activity kind: {}", s))
    }
}

/// Coarse grouping used by the feed's category tabs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityCategory {
    Task,
    User,
    System,
}

impl ActivityCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityCategory::Task => "task",
            ActivityCategory::User => "user",
            ActivityCategory::System => "system",
        }
    }
}

impl fmt::Display for ActivityCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ActivityCategory {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "task" => Ok(ActivityCategory::Task),
            "user" => Ok(ActivityCategory::User),
            "system" => Ok(ActivityCategory::System),
            _ => Err(format!("Unknown activity category: {}", s)),
        }
    }
}

/// One synthesized feed entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityEvent {
    /// `<item id>:<kind>`, unique within one synthesis run
    pub id: String,
    pub kind: ActivityKind,
    pub category: ActivityCategory,
    pub timestamp: DateTime<Utc>,
    pub actor: String,
    pub description: String,
    pub item_id: String,
    pub item_title: String,
    pub item_type: WorkItemType,
    /// Bucket of the item's priority under the configured field
    pub priority: PriorityBucket,
}

impl ActivityEvent {
    /// Format relative time since this event, e.g. "5m", "3h", "2d".
    pub fn relative_time(&self, now: DateTime<Utc>) -> String {
        let elapsed = now.signed_duration_since(self.timestamp);

        if elapsed.num_seconds() < 60 {
            format!("{}s", elapsed.num_seconds().max(0))
        } else if elapsed.num_minutes() < 60 {
            format!("{}m", elapsed.num_minutes())
        } else if elapsed.num_hours() < 24 {
            format!("{}h", elapsed.num_hours())
        } else if elapsed.num_days() < 30 {
            format!("{}d", elapsed.num_days())
        } else {
            self.timestamp.format("%Y-%m-%d").to_string()
        }
    }
}

struct EventBuilder<'a> {
    item: &'a WorkItem,
    actor: String,
    priority: PriorityBucket,
}

impl EventBuilder<'_> {
    fn event(
        &self,
        kind: ActivityKind,
        timestamp: DateTime<Utc>,
        description: String,
    ) -> ActivityEvent {
        ActivityEvent {
            id: format!("{}:{}", self.item.id, kind.as_str()),
            kind,
            category: kind.category(),
            timestamp,
            actor: self.actor.clone(),
            description,
            item_id: self.item.id.clone(),
            item_title: self.item.title.clone(),
            item_type: self.item.item_type,
            priority: self.priority,
        }
    }
}

/// Derive the pseudo-events for one work item, oldest first.
pub fn synthesize<R: Rng + ?Sized>(
    item: &WorkItem,
    field: PriorityField,
    rng: &mut R,
) -> Vec<ActivityEvent> {
    let builder = EventBuilder {
        item,
        actor: item.actor_name().unwrap_or(PLACEHOLDER_ACTOR).to_string(),
        priority: item.priority_bucket(field),
    };
    let type_label = type_meta(item.item_type).label.to_lowercase();
    let updated_at = item.last_touched();
    let mut events = Vec::new();

    events.push(builder.event(
        ActivityKind::Created,
        item.created_at,
        format!("Created {} \"{}\"", type_label, item.title),
    ));

    if item.was_updated() {
        events.push(builder.event(
            ActivityKind::StatusChanged,
            updated_at,
            format!(
                "Status changed to {}",
                status_meta(item.status.display_status()).label
            ),
        ));
    }

    if let Some(assignee) = &item.assigned_to {
        let jitter = rng.gen_range(0..ASSIGNMENT_WINDOW_SECS);
        events.push(builder.event(
            ActivityKind::Assigned,
            item.created_at + Duration::seconds(jitter),
            format!("Assigned to {}", assignee.display_name()),
        ));
    }

    let composite = PriorityField::Comp.score(item);
    if composite > PRIORITY_EVENT_THRESHOLD {
        let bucket = PriorityBucket::from_score(composite);
        events.push(builder.event(
            ActivityKind::PriorityUpdated,
            updated_at,
            format!(
                "Priority updated to {} ({:.0}%)",
                priority_meta(bucket).label,
                composite * 100.0
            ),
        ));
    }

    if let Some(due) = item.due_date {
        events.push(builder.event(
            ActivityKind::DueDateSet,
            item.created_at,
            format!("Due date set to {}", due.format("%b %d, %Y")),
        ));
    }

    if item.status == WorkItemStatus::Completed {
        events.push(builder.event(
            ActivityKind::Completed,
            updated_at,
            format!("Completed \"{}\"", item.title),
        ));
    }

    if rng.gen_bool(COMMENT_PROBABILITY) {
        let lifetime = (updated_at - item.created_at).num_seconds();
        let window = if lifetime > 0 {
            lifetime
        } else {
            COMMENT_FALLBACK_WINDOW_SECS
        };
        let offset = rng.gen_range(0..=window);
        events.push(builder.event(
            ActivityKind::Commented,
            item.created_at + Duration::seconds(offset),
            format!("Commented on \"{}\"", item.title),
        ));
    }

    events.sort_by_key(|e| e.timestamp);
    events
}

/// Derive the events for every item, newest first. Ties keep item order.
pub fn synthesize_all<'a, I, R>(items: I, field: PriorityField, rng: &mut R) -> Vec<ActivityEvent>
where
    I: IntoIterator<Item = &'a WorkItem>,
    R: Rng + ?Sized,
{
    let mut events: Vec<ActivityEvent> = items
        .into_iter()
        .flat_map(|item| synthesize(item, field, rng))
        .collect();
    events.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    events
}
