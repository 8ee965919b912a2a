//! Command implementations for the workboard CLI.
//!
//! Every command takes a [`Context`] (the fetched dataset, the active filter
//! selection, the priority field and the evaluation time) and returns a
//! value implementing [`Output`], which `main` prints as JSON or text.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use rand::Rng;
use serde::Serialize;

use crate::Result;
use crate::activity::{self, ActivityEvent, FeedFilter, Page, paginate};
use crate::config::{ConfigEntry, ResolvedConfig};
use crate::filter::FilterSelection;
use crate::models::{Dataset, EdgeType, WorkItem, WorkItemStatus, WorkItemType};
use crate::priority::{PriorityBucket, PriorityField};
use crate::registry::{edge_meta, priority_meta, status_meta, type_meta};
use crate::stats::WorkItemStats;
use crate::views::calendar::{self, CalendarMonth};
use crate::views::dashboard::{self, DashboardView};
use crate::views::gantt::{self, GanttChart};
use crate::views::graph::{self, GraphSummary};
use crate::views::kanban::{self, KanbanBoard};
use crate::views::table::{self, SortDirection, SortKey, TableView};
use crate::views::{EMPTY_STATE, ItemCard};

/// Command results that can be serialized to JSON or formatted for humans.
pub trait Output {
    /// Serialize to JSON string.
    fn to_json(&self) -> String;

    /// Format for human-readable output.
    fn to_human(&self) -> String;
}

fn json<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|e| format!(r#"{{"error": "{}"}}"#, e))
}

/// Everything a command needs to derive its view.
#[derive(Debug, Clone)]
pub struct Context {
    pub dataset: Dataset,
    pub selection: FilterSelection,
    pub field: PriorityField,
    pub now: DateTime<Utc>,
    /// Where the dataset came from (endpoint URL or file path)
    pub source: String,
}

impl Context {
    pub fn new(dataset: Dataset, selection: FilterSelection, field: PriorityField) -> Self {
        Self {
            dataset,
            selection: selection.with_priority_field(field),
            field,
            now: Utc::now(),
            source: String::new(),
        }
    }

    pub fn with_now(mut self, now: DateTime<Utc>) -> Self {
        self.now = now;
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    /// Items passing the active filters, in dataset order.
    pub fn filtered(&self) -> Vec<&WorkItem> {
        self.selection.apply(&self.dataset.work_items, self.now)
    }

    fn filters_active(&self) -> usize {
        self.selection.active_count()
    }
}

fn short_date(ts: DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d").to_string()
}

fn card_line(card: &ItemCard) -> String {
    let status = status_meta(card.status);
    let priority = priority_meta(card.priority);
    let mut line = format!(
        "{} {} [{}] {} ({})",
        status.icon, card.id, priority.label, card.title, status.label
    );
    if let Some(assignee) = &card.assignee {
        line.push_str(&format!(" @{}", assignee));
    }
    if let Some(due) = card.due_date {
        line.push_str(&format!(" due {}", short_date(due)));
    }
    line
}

fn filter_note(active: usize) -> Option<String> {
    (active > 0).then(|| {
        format!(
            "{} filter{} active",
            active,
            if active == 1 { "" } else { "s" }
        )
    })
}

// ---------------------------------------------------------------------------
// overview (no subcommand)
// ---------------------------------------------------------------------------

/// Short summary printed when no subcommand is given.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Overview {
    pub source: String,
    pub fetched_at: DateTime<Utc>,
    /// Items in the dataset
    pub total: usize,
    /// Items passing the active filters
    pub shown: usize,
    pub edges: usize,
    pub open: usize,
    pub overdue: usize,
    pub filters_active: usize,
}

pub fn overview(ctx: &Context) -> Overview {
    let filtered = ctx.filtered();
    let stats = WorkItemStats::from_items(filtered.iter().copied(), ctx.field, ctx.now);
    Overview {
        source: ctx.source.clone(),
        fetched_at: ctx.dataset.fetched_at,
        total: ctx.dataset.work_items.len(),
        shown: filtered.len(),
        edges: ctx.dataset.edges.len(),
        open: stats.open(),
        overdue: stats.overdue,
        filters_active: ctx.filters_active(),
    }
}

impl Output for Overview {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        let mut lines = vec![format!(
            "{} work items ({} shown), {} edges",
            self.total, self.shown, self.edges
        )];
        lines.push(format!("  open: {}  overdue: {}", self.open, self.overdue));
        if !self.source.is_empty() {
            lines.push(format!(
                "  source: {} (fetched {})",
                self.source,
                self.fetched_at.format("%Y-%m-%d %H:%M:%S UTC")
            ));
        }
        if let Some(note) = filter_note(self.filters_active) {
            lines.push(format!("  {}", note));
        }
        lines.push(String::new());
        lines.push("Run `wb --help` to see the available views.".to_string());
        lines.join("\n")
    }
}

// ---------------------------------------------------------------------------
// items
// ---------------------------------------------------------------------------

pub fn items(ctx: &Context, sort: SortKey, direction: SortDirection) -> TableView {
    table::build(&ctx.filtered(), sort, direction, ctx.field)
}

impl Output for TableView {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        if self.rows.is_empty() {
            return EMPTY_STATE.to_string();
        }
        let mut lines = vec![format!(
            "{:<12} {:<12} {:<9} {:<10} {}",
            "ID", "STATUS", "PRIORITY", "TYPE", "TITLE"
        )];
        for row in &self.rows {
            let card = &row.card;
            let mut line = format!(
                "{:<12} {:<12} {:<9} {:<10} {}",
                card.id,
                status_meta(card.status).label,
                priority_meta(card.priority).label,
                type_meta(card.item_type).label,
                card.title
            );
            if let Some(assignee) = &card.assignee {
                line.push_str(&format!("  @{}", assignee));
            }
            lines.push(line);
        }
        lines.push(String::new());
        lines.push(format!(
            "{} item{} sorted by {} ({})",
            self.rows.len(),
            if self.rows.len() == 1 { "" } else { "s" },
            self.sort,
            match self.direction {
                SortDirection::Asc => "ascending",
                SortDirection::Desc => "descending",
            }
        ));
        lines.join("\n")
    }
}

// ---------------------------------------------------------------------------
// stats
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsReport {
    #[serde(flatten)]
    pub stats: WorkItemStats,
    pub open: usize,
    pub completion_rate: f64,
    pub filters_active: usize,
}

pub fn stats(ctx: &Context) -> StatsReport {
    let stats = WorkItemStats::from_items(ctx.filtered(), ctx.field, ctx.now);
    StatsReport {
        open: stats.open(),
        completion_rate: stats.completion_rate(),
        filters_active: ctx.filters_active(),
        stats,
    }
}

fn stats_lines(stats: &WorkItemStats) -> Vec<String> {
    let mut lines = vec![format!(
        "{} work items ({} open, {} overdue, {:.0}% complete)",
        stats.total,
        stats.open(),
        stats.overdue,
        stats.completion_rate() * 100.0
    )];

    lines.push("By status:".to_string());
    for status in WorkItemStatus::all() {
        let count = stats.by_status.get(*status);
        if count > 0 {
            let meta = status_meta(*status);
            lines.push(format!("  {} {:<12} {}", meta.icon, meta.label, count));
        }
    }
    if stats.by_status.other > 0 {
        lines.push(format!("  ? {:<12} {}", "Other", stats.by_status.other));
    }

    lines.push("By priority:".to_string());
    for bucket in PriorityBucket::all() {
        let meta = priority_meta(*bucket);
        lines.push(format!(
            "  {} {:<12} {}",
            meta.icon,
            meta.label,
            stats.by_priority.get(*bucket)
        ));
    }

    if !stats.by_type.is_empty() {
        lines.push("By type:".to_string());
        for (item_type, count) in &stats.by_type {
            let label = match item_type.parse::<WorkItemType>() {
                Ok(t) => type_meta(t).label,
                Err(_) => item_type.as_str(),
            };
            lines.push(format!("  {:<14} {}", label, count));
        }
    }
    lines
}

impl Output for StatsReport {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        if self.stats.total == 0 {
            return EMPTY_STATE.to_string();
        }
        let mut lines = stats_lines(&self.stats);
        if let Some(note) = filter_note(self.filters_active) {
            lines.push(String::new());
            lines.push(note);
        }
        lines.join("\n")
    }
}

// ---------------------------------------------------------------------------
// dashboard
// ---------------------------------------------------------------------------

pub fn dashboard(ctx: &Context) -> DashboardView {
    dashboard::build(&ctx.filtered(), ctx.field, ctx.now)
}

impl Output for DashboardView {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        if self.is_empty() {
            return EMPTY_STATE.to_string();
        }
        let mut lines = stats_lines(&self.stats);
        for (title, cards) in [
            ("Recently updated", &self.recent),
            ("Top priority", &self.top_priority),
            ("Due in the next two weeks", &self.upcoming),
        ] {
            lines.push(String::new());
            lines.push(format!("{}:", title));
            if cards.is_empty() {
                lines.push("  (none)".to_string());
            }
            for card in cards {
                lines.push(format!("  {}", card_line(card)));
            }
        }
        lines.join("\n")
    }
}

// ---------------------------------------------------------------------------
// kanban
// ---------------------------------------------------------------------------

pub fn kanban(ctx: &Context, hide_empty: bool) -> KanbanBoard {
    kanban::build(&ctx.filtered(), ctx.field, hide_empty)
}

impl Output for KanbanBoard {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        if self.total_cards() == 0 {
            return EMPTY_STATE.to_string();
        }
        let mut lines = Vec::new();
        for column in &self.columns {
            let meta = status_meta(column.status);
            lines.push(format!("{} {} ({})", meta.icon, column.label, column.count));
            for card in &column.cards {
                lines.push(format!(
                    "    [{}] {} {}",
                    priority_meta(card.priority).label,
                    card.id,
                    card.title
                ));
            }
        }
        lines.join("\n")
    }
}

// ---------------------------------------------------------------------------
// calendar
// ---------------------------------------------------------------------------

/// Build the calendar for `month` (`YYYY-MM`), or the month containing `now`.
pub fn calendar(ctx: &Context, month: Option<&str>) -> Result<CalendarMonth> {
    let start = match month {
        Some(m) => calendar::parse_month(m)?,
        None => {
            let today = ctx.now.date_naive();
            NaiveDate::from_ymd_opt(today.year(), today.month(), 1).unwrap_or(today)
        }
    };
    Ok(calendar::build(&ctx.filtered(), start, ctx.field))
}

impl Output for CalendarMonth {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        let title = NaiveDate::from_ymd_opt(self.year, self.month, 1)
            .map(|d| d.format("%B %Y").to_string())
            .unwrap_or_else(|| format!("{}-{:02}", self.year, self.month));
        let mut lines = vec![title, " Mo  Tu  We  Th  Fr  Sa  Su".to_string()];

        for week in &self.weeks {
            let cells: Vec<String> = week
                .iter()
                .map(|day| {
                    if !day.in_month {
                        "    ".to_string()
                    } else if day.items.is_empty() {
                        format!(" {:>2} ", day.date.day())
                    } else {
                        format!(" {:>2}*", day.date.day())
                    }
                })
                .collect();
            lines.push(cells.concat().trim_end().to_string());
        }

        let due: Vec<String> = self
            .weeks
            .iter()
            .flatten()
            .filter(|day| day.in_month)
            .flat_map(|day| {
                day.items
                    .iter()
                    .map(move |card| format!("  {} {}", day.date.format("%d"), card_line(card)))
            })
            .collect();

        lines.push(String::new());
        if due.is_empty() {
            lines.push("Nothing due this month.".to_string());
        } else {
            lines.push(format!("Due this month ({}):", due.len()));
            lines.extend(due);
        }
        if !self.undated.is_empty() {
            lines.push(format!("{} item(s) without a due date", self.undated.len()));
        }
        lines.join("\n")
    }
}

// ---------------------------------------------------------------------------
// gantt
// ---------------------------------------------------------------------------

/// Width of the bar area in the text rendering.
const GANTT_WIDTH: usize = 40;

pub fn gantt(ctx: &Context) -> GanttChart {
    gantt::build(&ctx.filtered(), ctx.field, ctx.now)
}

impl Output for GanttChart {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        let (Some(start), Some(end)) = (self.start, self.end) else {
            return EMPTY_STATE.to_string();
        };
        let span = (end - start).num_seconds().max(1) as f64;
        let column = |ts: DateTime<Utc>| -> usize {
            let offset = (ts - start).num_seconds().max(0) as f64;
            ((offset / span) * GANTT_WIDTH as f64).round() as usize
        };

        let mut lines = vec![format!("{} .. {}", short_date(start), short_date(end))];
        for bar in &self.bars {
            let from = column(bar.start).min(GANTT_WIDTH);
            let to = column(bar.end).clamp(from + 1, GANTT_WIDTH.max(from + 1));
            let filled = ((to - from) * bar.progress as usize) / 100;
            let mut track = " ".repeat(from);
            track.push_str(&"█".repeat(filled));
            track.push_str(&"░".repeat(to - from - filled));
            lines.push(format!(
                "{:<12} {:<width$} {:>3}%{}",
                bar.card.id,
                track,
                bar.progress,
                if bar.overdue { " overdue" } else { "" },
                width = GANTT_WIDTH + 1
            ));
        }
        lines.join("\n")
    }
}

// ---------------------------------------------------------------------------
// graph
// ---------------------------------------------------------------------------

pub fn graph(ctx: &Context) -> GraphSummary {
    graph::build(&ctx.filtered(), &ctx.dataset.edges)
}

impl Output for GraphSummary {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        if self.nodes.is_empty() {
            return EMPTY_STATE.to_string();
        }
        let mut lines = vec![format!(
            "{} nodes, {} edges ({} dangling), {} isolated",
            self.nodes.len(),
            self.edge_count,
            self.dangling_edges,
            self.isolated
        )];
        if !self.edge_types.is_empty() {
            lines.push("Edge types:".to_string());
            for (edge_type, count) in &self.edge_types {
                let label = EdgeType::all()
                    .iter()
                    .find(|t| t.as_str() == edge_type)
                    .map_or(edge_type.as_str(), |t| edge_meta(*t).label);
                lines.push(format!("  {:<12} {}", label, count));
            }
        }
        let top = self.most_connected(5);
        if top.iter().any(|n| n.connections() > 0) {
            lines.push("Most connected:".to_string());
            for node in top.into_iter().filter(|n| n.connections() > 0) {
                lines.push(format!(
                    "  {} {} (in {}, out {})",
                    node.id, node.title, node.incoming, node.outgoing
                ));
            }
        }
        if !self.clusters.is_empty() {
            lines.push(format!("Clusters ({}):", self.clusters.len()));
            for cluster in &self.clusters {
                lines.push(format!("  [{}] {}", cluster.len(), cluster.join(", ")));
            }
        }
        lines.join("\n")
    }
}

// ---------------------------------------------------------------------------
// activity
// ---------------------------------------------------------------------------

/// Activity command options, independent of the CLI parser.
#[derive(Debug, Clone, Default)]
pub struct ActivityQuery {
    pub filter: FeedFilter,
    pub page: usize,
    pub page_size: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityReport {
    /// Seed the synthesized events were drawn with, to reproduce the feed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    #[serde(skip)]
    pub now: DateTime<Utc>,
    #[serde(flatten)]
    pub page: Page<ActivityEvent>,
}

/// Synthesize, filter and paginate the feed for the filtered items.
pub fn activity<R: Rng + ?Sized>(ctx: &Context, query: &ActivityQuery, rng: &mut R) -> ActivityReport {
    let events = activity::synthesize_all(ctx.filtered(), ctx.field, rng);
    let matching: Vec<ActivityEvent> = query
        .filter
        .apply(&events, ctx.now)
        .into_iter()
        .cloned()
        .collect();
    tracing::debug!(
        synthesized = events.len(),
        matching = matching.len(),
        "activity feed built"
    );
    ActivityReport {
        seed: None,
        now: ctx.now,
        page: paginate(&matching, query.page, query.page_size),
    }
}

impl Output for ActivityReport {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        if self.page.items.is_empty() {
            return "No activity matches the current filters".to_string();
        }
        let mut lines: Vec<String> = self
            .page
            .items
            .iter()
            .map(|e| {
                format!(
                    "{:>4}  {} {:<16} {} ({})",
                    e.relative_time(self.now),
                    e.kind.icon(),
                    e.actor,
                    e.description,
                    e.item_id
                )
            })
            .collect();
        lines.push(String::new());
        lines.push(format!(
            "Page {} of {} ({} events)",
            self.page.page, self.page.total_pages, self.page.total_items
        ));
        lines.join("\n")
    }
}

// ---------------------------------------------------------------------------
// config show
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct ConfigShow {
    pub settings: Vec<ConfigEntry>,
    /// Snapshot file in use instead of the endpoint
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input: Option<String>,
}

pub fn config_show(resolved: &ResolvedConfig, input: Option<&std::path::Path>) -> ConfigShow {
    ConfigShow {
        settings: resolved.entries(),
        input: input.map(|p| p.display().to_string()),
    }
}

impl Output for ConfigShow {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        let mut lines: Vec<String> = self
            .settings
            .iter()
            .map(|entry| match (&entry.value, &entry.source) {
                (Some(value), Some(source)) => {
                    format!("{:<22} {}  ({})", entry.key, value, source)
                }
                _ => format!("{:<22} (not set)", entry.key),
            })
            .collect();
        if let Some(input) = &self.input {
            lines.push(format!("{:<22} {}  (cli)", "input", input));
        }
        lines.join("\n")
    }
}

// ---------------------------------------------------------------------------
// watch
// ---------------------------------------------------------------------------

/// One refresh of `wb watch`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchReport {
    pub tick: u32,
    /// "live" or "stale (N failed)"
    pub state: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fetched_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<WorkItemStats>,
}

impl Output for WatchReport {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        let mut line = format!("#{} [{}]", self.tick, self.state);
        if let Some(stats) = &self.stats {
            line.push_str(&format!(
                " {} items, {} open, {} blocked, {} overdue",
                stats.total,
                stats.open(),
                stats.by_status.blocked,
                stats.overdue
            ));
        }
        if let Some(fetched_at) = self.fetched_at {
            line.push_str(&format!(" (data from {})", fetched_at.format("%H:%M:%S")));
        }
        if let Some(error) = &self.error {
            line.push_str(&format!(" error: {}", error));
        }
        line
    }
}
