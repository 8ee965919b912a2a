//! Workboard CLI - work item dashboards from a GraphQL backend.

use clap::Parser;
use std::env;
use std::path::Path;
use std::process;
use std::sync::Arc;
use std::thread;

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use workboard::cli::{ActivityArgs, Cli, Commands, ConfigCommands};
use workboard::client::{GraphqlClient, Poller, Scope, SnapshotSource, WorkItemSource};
use workboard::commands::{self, ActivityQuery, Context, Output, WatchReport};
use workboard::config::{
    ConfigLayers, ConfigOverrides, OutputFormat, ResolvedConfig, resolve_config,
};
use workboard::config::schema::MAX_PAGE_SIZE;
use workboard::filter::FilterSelection;
use workboard::stats::WorkItemStats;
use workboard::views::table::SortDirection;
use workboard::{Error, Result};

/// Log filter env var, e.g. `WB_LOG=workboard=debug`
const LOG_ENV: &str = "WB_LOG";

/// Set to 1 for JSON log lines on stderr
const LOG_JSON_ENV: &str = "WB_LOG_JSON";

fn main() {
    let cli = Cli::parse();
    let _log_guard = init_tracing(&cli);

    let mut human = cli.human_readable;
    let result = resolve(&cli).and_then(|config| {
        human = human || config.output_format() == OutputFormat::Human;
        run_command(cli, &config, human)
    });

    if let Err(e) = result {
        if human {
            eprintln!("Error: {}", e);
        } else {
            eprintln!("{}", serde_json::json!({ "error": e.to_string() }));
        }
        process::exit(1);
    }
}

fn env_bool(name: &str) -> bool {
    matches!(
        env::var(name).as_deref(),
        Ok("1" | "true" | "TRUE" | "yes" | "YES")
    )
}

/// Keeps the TUI log writer flushing until main returns.
#[cfg(feature = "tui")]
type LogGuard = tracing_appender::non_blocking::WorkerGuard;
#[cfg(not(feature = "tui"))]
type LogGuard = ();

/// Logs go to stderr so stdout stays parseable. The TUI owns the terminal,
/// so it logs to a file instead.
fn init_tracing(cli: &Cli) -> Option<LogGuard> {
    let default_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(format!("workboard={}", default_level)));

    #[cfg(feature = "tui")]
    let filter = match cli.command {
        Some(Commands::Tui) => return Some(workboard::tui::init_file_logging(filter)),
        _ => filter,
    };

    if env_bool(LOG_JSON_ENV) {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
    None
}

/// Load config layers and apply the command line on top.
fn resolve(cli: &Cli) -> Result<ResolvedConfig> {
    let cwd = env::current_dir()?;
    let layers = ConfigLayers::load(cli.config.as_deref(), &cwd)?;

    let mut overrides = ConfigOverrides::new();
    if let Some(endpoint) = &cli.endpoint {
        overrides = overrides.with_endpoint(endpoint);
    }
    if let Some(graph) = &cli.graph {
        overrides = overrides.with_graph(graph);
    }
    if let Some(team) = &cli.team {
        overrides = overrides.with_team(team);
    }
    if let Some(field) = cli.priority_field {
        overrides = overrides.with_priority_field(field);
    }
    if cli.human_readable {
        overrides = overrides.with_output_format(OutputFormat::Human);
    }
    match &cli.command {
        Some(Commands::Activity(ActivityArgs {
            page_size: Some(size),
            ..
        })) => {
            if !(1..=MAX_PAGE_SIZE).contains(size) {
                return Err(Error::InvalidInput(format!(
                    "--page-size must be between 1 and {}, got {}",
                    MAX_PAGE_SIZE, size
                )));
            }
            overrides = overrides.with_page_size(*size);
        }
        Some(Commands::Watch {
            interval: Some(secs),
            ..
        }) => {
            if *secs == 0 {
                return Err(Error::InvalidInput(
                    "--interval must be at least 1 second".to_string(),
                ));
            }
            overrides = overrides.with_poll_interval(*secs);
        }
        _ => {}
    }

    Ok(resolve_config(&layers, &overrides))
}

/// Pick the data source: a snapshot file wins over the endpoint.
fn build_source(input: Option<&Path>, config: &ResolvedConfig) -> Result<Arc<dyn WorkItemSource>> {
    if let Some(path) = input {
        return Ok(Arc::new(SnapshotSource::new(path)));
    }
    match config.endpoint() {
        Some(endpoint) => Ok(Arc::new(GraphqlClient::new(
            endpoint,
            config.token().map(str::to_string),
            std::time::Duration::from_secs(config.request_timeout_secs.value),
        ))),
        None => Err(Error::Config(
            "no endpoint configured; pass --endpoint, set WB_ENDPOINT, add `endpoint` to .workboard.kdl, or use --input".to_string(),
        )),
    }
}

fn run_command(cli: Cli, config: &ResolvedConfig, human: bool) -> Result<()> {
    let field = config.priority_field();
    let selection = cli.filters.selection(field);
    let scope = Scope::new(
        config.graph().map(str::to_string),
        config.team().map(str::to_string),
    );

    if let Some(Commands::Config {
        command: ConfigCommands::Show,
    }) = &cli.command
    {
        output(&commands::config_show(config, cli.input.as_deref()), human);
        return Ok(());
    }

    let source = build_source(cli.input.as_deref(), config)?;

    match cli.command {
        Some(Commands::Watch { count, .. }) => {
            return watch(source.as_ref(), &scope, config, &selection, count, human);
        }
        #[cfg(feature = "tui")]
        Some(Commands::Tui) => {
            return workboard::tui::run(workboard::tui::TuiOptions {
                source,
                scope,
                selection,
                field,
                poll_interval_secs: config.poll_interval_secs.value,
                max_backoff_secs: config.max_backoff_secs.value,
                page_size: config.page_size.value,
            });
        }
        _ => {}
    }

    let dataset = source.fetch(&scope)?;
    tracing::info!(
        source = %source.describe(),
        items = dataset.work_items.len(),
        edges = dataset.edges.len(),
        "dataset loaded"
    );
    let ctx = Context::new(dataset, selection, field).with_source(source.describe());

    match cli.command {
        None => output(&commands::overview(&ctx), human),
        Some(Commands::Items { sort, asc }) => {
            let direction = if asc {
                SortDirection::Asc
            } else {
                SortDirection::Desc
            };
            output(&commands::items(&ctx, sort, direction), human);
        }
        Some(Commands::Stats) => output(&commands::stats(&ctx), human),
        Some(Commands::Dashboard) => output(&commands::dashboard(&ctx), human),
        Some(Commands::Kanban { hide_empty }) => output(&commands::kanban(&ctx, hide_empty), human),
        Some(Commands::Calendar { month }) => {
            output(&commands::calendar(&ctx, month.as_deref())?, human)
        }
        Some(Commands::Gantt) => output(&commands::gantt(&ctx), human),
        Some(Commands::Graph) => output(&commands::graph(&ctx), human),
        Some(Commands::Activity(args)) => {
            let seed = args.seed.unwrap_or_else(rand::random);
            let mut filter = workboard::activity::FeedFilter::new().with_range(args.since);
            if let Some(kind) = args.kind {
                filter = filter.with_kind(kind);
            }
            if let Some(category) = args.category {
                filter = filter.with_category(category);
            }
            if let Some(priority) = args.activity_priority {
                filter = filter.with_priority(priority);
            }
            if let Some(search) = args.activity_search {
                filter = filter.with_search(search);
            }
            let query = ActivityQuery {
                filter,
                page: args.page,
                page_size: config.page_size.value,
            };
            let mut rng = <rand::rngs::StdRng as rand::SeedableRng>::seed_from_u64(seed);
            let mut report = commands::activity(&ctx, &query, &mut rng);
            report.seed = Some(seed);
            output(&report, human);
        }
        // Handled before the fetch
        Some(Commands::Config { .. }) | Some(Commands::Watch { .. }) => {}
        #[cfg(feature = "tui")]
        Some(Commands::Tui) => {}
    }

    Ok(())
}

/// Print stats on every refresh. Without a graph selected there is nothing
/// to poll, so a single fetch is made.
fn watch(
    source: &dyn WorkItemSource,
    scope: &Scope,
    config: &ResolvedConfig,
    selection: &FilterSelection,
    count: Option<u32>,
    human: bool,
) -> Result<()> {
    let mut poller = Poller::from_secs(
        config.poll_interval_secs.value,
        config.max_backoff_secs.value,
    );
    let pollable = scope.is_pollable();
    if !pollable {
        tracing::info!("no graph selected, fetching once");
    }

    let mut tick = 0u32;
    loop {
        tick += 1;
        let error = match poller.poll_once(source, scope) {
            Ok(_) => None,
            Err(e) if !pollable => return Err(e),
            Err(e) => Some(e.to_string()),
        };

        let now = chrono::Utc::now();
        let report = WatchReport {
            tick,
            state: poller.state().label(),
            error,
            fetched_at: poller.dataset().map(|d| d.fetched_at),
            stats: poller.dataset().map(|d| {
                WorkItemStats::from_items(
                    selection.apply(&d.work_items, now),
                    selection.priority_field,
                    now,
                )
            }),
        };
        output(&report, human);

        if !pollable || count.is_some_and(|c| tick >= c) {
            return Ok(());
        }
        let delay = poller.next_delay();
        tracing::debug!(delay_secs = delay.as_secs(), "sleeping until next poll");
        thread::sleep(delay);
    }
}

/// Print output in JSON or human-readable format.
fn output<T: Output>(result: &T, human: bool) {
    if human {
        println!("{}", result.to_human());
    } else {
        println!("{}", result.to_json());
    }
}
