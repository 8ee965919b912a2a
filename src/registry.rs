//! Display metadata for work item types, statuses and priority buckets.
//!
//! Every view looks up labels, icons and colors here. Lookups are exhaustive
//! matches; the `Unknown` status renders with the not-started entry.

use serde::Serialize;

use crate::models::{EdgeType, WorkItemStatus, WorkItemType};
use crate::priority::PriorityBucket;

/// Hex colors shared by the tables below.
pub mod palette {
    pub const SLATE: &str = "#64748b";
    pub const GRAY: &str = "#9ca3af";
    pub const BLUE: &str = "#3b82f6";
    pub const INDIGO: &str = "#6366f1";
    pub const PURPLE: &str = "#8b5cf6";
    pub const PINK: &str = "#ec4899";
    pub const RED: &str = "#ef4444";
    pub const ORANGE: &str = "#f97316";
    pub const AMBER: &str = "#f59e0b";
    pub const YELLOW: &str = "#eab308";
    pub const GREEN: &str = "#22c55e";
    pub const EMERALD: &str = "#10b981";
    pub const TEAL: &str = "#14b8a6";
    pub const CYAN: &str = "#06b6d4";
}

/// How a value is presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DisplayMeta {
    /// Human-readable label
    pub label: &'static str,
    /// Single-glyph icon for terminal output
    pub icon: &'static str,
    /// Color name
    pub color: &'static str,
    /// Color as `#rrggbb`
    pub hex: &'static str,
}

const fn meta(
    label: &'static str,
    icon: &'static str,
    color: &'static str,
    hex: &'static str,
) -> DisplayMeta {
    DisplayMeta {
        label,
        icon,
        color,
        hex,
    }
}

pub fn type_meta(item_type: WorkItemType) -> DisplayMeta {
    match item_type {
        WorkItemType::Epic => meta("Epic", "◆", "purple", palette::PURPLE),
        WorkItemType::Milestone => meta("Milestone", "⚑", "indigo", palette::INDIGO),
        WorkItemType::Outcome => meta("Outcome", "◎", "teal", palette::TEAL),
        WorkItemType::Feature => meta("Feature", "★", "blue", palette::BLUE),
        WorkItemType::Task => meta("Task", "☐", "cyan", palette::CYAN),
        WorkItemType::Bug => meta("Bug", "✗", "red", palette::RED),
        WorkItemType::Idea => meta("Idea", "✦", "yellow", palette::YELLOW),
        WorkItemType::Research => meta("Research", "⌕", "pink", palette::PINK),
        WorkItemType::Default => meta("Item", "•", "gray", palette::GRAY),
    }
}

pub fn status_meta(status: WorkItemStatus) -> DisplayMeta {
    match status {
        WorkItemStatus::NotStarted | WorkItemStatus::Unknown => {
            meta("Not Started", "○", "gray", palette::GRAY)
        }
        WorkItemStatus::Proposed => meta("Proposed", "?", "slate", palette::SLATE),
        WorkItemStatus::Planned => meta("Planned", "◌", "indigo", palette::INDIGO),
        WorkItemStatus::InProgress => meta("In Progress", "◐", "blue", palette::BLUE),
        WorkItemStatus::InReview => meta("In Review", "◑", "purple", palette::PURPLE),
        WorkItemStatus::Blocked => meta("Blocked", "■", "red", palette::RED),
        WorkItemStatus::OnHold => meta("On Hold", "‖", "amber", palette::AMBER),
        WorkItemStatus::Completed => meta("Completed", "●", "green", palette::GREEN),
        WorkItemStatus::Cancelled => meta("Cancelled", "⊘", "slate", palette::SLATE),
    }
}

pub fn priority_meta(bucket: PriorityBucket) -> DisplayMeta {
    match bucket {
        PriorityBucket::Critical => meta("Critical", "▲", "red", palette::RED),
        PriorityBucket::High => meta("High", "△", "orange", palette::ORANGE),
        PriorityBucket::Moderate => meta("Moderate", "◇", "yellow", palette::YELLOW),
        PriorityBucket::Low => meta("Low", "▽", "green", palette::GREEN),
        PriorityBucket::Minimal => meta("Minimal", "·", "gray", palette::GRAY),
    }
}

pub fn edge_meta(edge_type: EdgeType) -> DisplayMeta {
    match edge_type {
        EdgeType::DependsOn => meta("Depends on", "→", "red", palette::RED),
        EdgeType::Blocks => meta("Blocks", "⊣", "orange", palette::ORANGE),
        EdgeType::RelatesTo => meta("Relates to", "~", "slate", palette::SLATE),
        EdgeType::Contains => meta("Contains", "⊃", "purple", palette::PURPLE),
        EdgeType::PartOf => meta("Part of", "⊂", "indigo", palette::INDIGO),
        EdgeType::Duplicates => meta("Duplicates", "=", "gray", palette::GRAY),
    }
}

/// Parse `#rrggbb` into its components.
pub fn hex_to_rgb(hex: &str) -> Option<(u8, u8, u8)> {
    let digits = hex.strip_prefix('#')?;
    if digits.len() != 6 {
        return None;
    }
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(digits.get(range)?, 16).ok();
    Some((channel(0..2)?, channel(2..4)?, channel(4..6)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_status_renders_as_not_started() {
        assert_eq!(
            status_meta(WorkItemStatus::Unknown),
            status_meta(WorkItemStatus::NotStarted)
        );
    }

    #[test]
    fn test_every_status_has_a_distinct_label() {
        let mut labels: Vec<&str> = WorkItemStatus::all()
            .iter()
            .map(|s| status_meta(*s).label)
            .collect();
        labels.sort();
        labels.dedup();
        assert_eq!(labels.len(), WorkItemStatus::all().len());
    }

    #[test]
    fn test_priority_colors() {
        assert_eq!(priority_meta(PriorityBucket::Critical).hex, palette::RED);
        assert_eq!(priority_meta(PriorityBucket::Minimal).label, "Minimal");
    }

    #[test]
    fn test_all_hex_values_parse() {
        for t in WorkItemType::all() {
            assert!(hex_to_rgb(type_meta(*t).hex).is_some());
        }
        for s in WorkItemStatus::all() {
            assert!(hex_to_rgb(status_meta(*s).hex).is_some());
        }
        for b in PriorityBucket::all() {
            assert!(hex_to_rgb(priority_meta(*b).hex).is_some());
        }
        for e in EdgeType::all() {
            assert!(hex_to_rgb(edge_meta(*e).hex).is_some());
        }
    }

    #[test]
    fn test_hex_to_rgb() {
        assert_eq!(hex_to_rgb("#ff8000"), Some((255, 128, 0)));
        assert_eq!(hex_to_rgb("ff8000"), None);
        assert_eq!(hex_to_rgb("#fff"), None);
        assert_eq!(hex_to_rgb("#zzzzzz"), None);
    }
}
