//! CLI argument definitions for workboard.

use chrono::{DateTime, NaiveDate, Utc};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::activity::{ActivityCategory, ActivityKind, TimeRange};
use crate::filter::{DateRange, FilterSelection};
use crate::models::{WorkItemStatus, WorkItemType};
use crate::priority::{PriorityBucket, PriorityField};
use crate::views::table::SortKey;

/// Version string with the commit and build time baked in by build.rs.
const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("WB_GIT_COMMIT"),
    ", built ",
    env!("WB_BUILD_TIMESTAMP"),
    ")"
);

/// Workboard - work item dashboards in the terminal.
///
/// Reads work items and edges from a GraphQL endpoint (or a JSON snapshot
/// with --input) and prints the derived views as JSON, or as text with -H.
#[derive(Parser, Debug)]
#[command(name = "wb")]
#[command(author, version, long_version = LONG_VERSION, about = "Work item dashboards from a GraphQL backend", long_about = None)]
pub struct Cli {
    /// Output in human-readable format instead of JSON
    #[arg(short = 'H', long = "human", global = true)]
    pub human_readable: bool,

    /// Config file to use instead of ./.workboard.kdl
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Read work items from a JSON snapshot instead of the GraphQL endpoint
    #[arg(long, global = true, env = "WB_INPUT")]
    pub input: Option<PathBuf>,

    /// GraphQL endpoint URL
    #[arg(long, global = true)]
    pub endpoint: Option<String>,

    /// Graph to show (enables polling in watch/tui)
    #[arg(long, global = true)]
    pub graph: Option<String>,

    /// Team to show
    #[arg(long, global = true)]
    pub team: Option<String>,

    /// Which score counts as the priority: exec, indiv, comm, comp, average
    #[arg(long, global = true)]
    pub priority_field: Option<PriorityField>,

    /// More log output on stderr (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(flatten)]
    pub filters: FilterArgs,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Filters shared by every list-like command.
#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// Case-insensitive text search over title, description, type, status and tags
    #[arg(long, global = true)]
    pub search: Option<String>,

    /// Only items with this status (e.g. in_progress, BLOCKED)
    #[arg(long, global = true)]
    pub status: Option<WorkItemStatus>,

    /// Only items of this type (e.g. bug, feature)
    #[arg(long = "type", global = true)]
    pub item_type: Option<WorkItemType>,

    /// Only items in this priority bucket (critical, high, moderate, low, minimal)
    #[arg(long, global = true)]
    pub priority: Option<PriorityBucket>,

    /// Only items assigned to, owned by, or contributed to by this user (id, name or username)
    #[arg(long, global = true)]
    pub contributor: Option<String>,

    /// Only items created within: today, week, month, quarter
    #[arg(long, global = true, conflicts_with_all = ["from", "to"])]
    pub range: Option<DateRange>,

    /// Only items created at or after this date (YYYY-MM-DD or RFC 3339)
    #[arg(long, global = true, value_parser = parse_from_date)]
    pub from: Option<DateTime<Utc>>,

    /// Only items created at or before this date (YYYY-MM-DD or RFC 3339)
    #[arg(long, global = true, value_parser = parse_to_date)]
    pub to: Option<DateTime<Utc>>,
}

impl FilterArgs {
    /// Build the filter selection these flags describe.
    pub fn selection(&self, field: PriorityField) -> FilterSelection {
        let date_range = match (self.range, self.from, self.to) {
            (Some(range), _, _) => Some(range),
            (None, None, None) => None,
            (None, from, to) => Some(DateRange::Custom { from, to }),
        };
        FilterSelection {
            search: self.search.clone(),
            status: self.status,
            item_type: self.item_type,
            priority: self.priority,
            contributor: self.contributor.clone(),
            date_range,
            priority_field: field,
        }
    }
}

fn parse_date_bound(s: &str, end_of_day: bool) -> Result<DateTime<Utc>, String> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Ok(ts.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| format!("Invalid date '{}': expected YYYY-MM-DD or RFC 3339", s))?;
    let time = if end_of_day {
        date.and_hms_nano_opt(23, 59, 59, 999_999_999)
    } else {
        date.and_hms_opt(0, 0, 0)
    };
    time.map(|t| t.and_utc())
        .ok_or_else(|| format!("Invalid date: {}", s))
}

/// Parse a start bound; a bare date means midnight UTC.
pub fn parse_from_date(s: &str) -> Result<DateTime<Utc>, String> {
    parse_date_bound(s, false)
}

/// Parse an end bound; a bare date covers the whole of that day (UTC).
pub fn parse_to_date(s: &str) -> Result<DateTime<Utc>, String> {
    parse_date_bound(s, true)
}

/// Top-level commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Table of work items
    Items {
        /// Sort column: updated, created, title, priority, status, due
        #[arg(long, default_value = "updated")]
        sort: SortKey,

        /// Sort ascending (default is descending)
        #[arg(long)]
        asc: bool,
    },

    /// Counts by status, type and priority
    Stats,

    /// Headline stats plus recent, top-priority and upcoming items
    Dashboard,

    /// Items grouped into workflow columns
    Kanban {
        /// Leave out columns with no items
        #[arg(long)]
        hide_empty: bool,
    },

    /// Month grid of due dates
    Calendar {
        /// Month to show as YYYY-MM (default: current month)
        #[arg(long)]
        month: Option<String>,
    },

    /// Timeline bars from creation to due date
    Gantt,

    /// Connection counts and clusters from edges
    Graph,

    /// Activity feed synthesized from item history
    Activity(ActivityArgs),

    /// Configuration commands
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Poll the source and print stats on every refresh
    Watch {
        /// Stop after this many refreshes (default: run until interrupted)
        #[arg(long)]
        count: Option<u32>,

        /// Seconds between refreshes (overrides poll-interval-secs)
        #[arg(long)]
        interval: Option<u64>,
    },

    /// Interactive terminal dashboard
    #[cfg(feature = "tui")]
    Tui,
}

/// Activity feed options.
#[derive(Args, Debug, Clone)]
pub struct ActivityArgs {
    /// Only this kind of event (created, status_changed, assigned, priority_updated, due_date_set, completed, commented)
    #[arg(long)]
    pub kind: Option<ActivityKind>,

    /// Only this category of event (task, user, system)
    #[arg(long)]
    pub category: Option<ActivityCategory>,

    /// Only events on items in this priority bucket
    #[arg(long = "activity-priority")]
    pub activity_priority: Option<PriorityBucket>,

    /// Text search over description, item title and actor
    #[arg(long = "activity-search")]
    pub activity_search: Option<String>,

    /// Only events within: hour, day, week, month, all
    #[arg(long, default_value = "all")]
    pub since: TimeRange,

    /// Page to show (1-based; past the end shows the last page)
    #[arg(long, default_value_t = 1)]
    pub page: usize,

    /// Events per page (overrides page-size from config)
    #[arg(long)]
    pub page_size: Option<usize>,

    /// Seed for the synthesized parts of the feed (default: random)
    #[arg(long)]
    pub seed: Option<u64>,
}

/// Configuration subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show the resolved configuration and where each value came from
    Show,
}
