//! Configuration for workboard.
//!
//! ## config.kdl - User preferences and connection settings
//!
//! Located at:
//! - System: `~/.config/workboard/config.kdl` (or `$WB_CONFIG_HOME/config.kdl`)
//! - Project: `./.workboard.kdl`
//! - Explicit: `wb --config <path>` (replaces the project file)
//!
//! Contains:
//! - `endpoint`, `token`, `graph`, `team` - where work items come from
//! - `poll-interval-secs`, `max-backoff-secs`, `request-timeout-secs` - fetch timing
//! - `priority-field` - which score counts as "the" priority
//! - `page-size` - activity feed page size
//! - `output-format` - "json" or "human"
//!
//! Use the [`resolver`] module for precedence resolution.

pub mod resolver;
pub mod schema;

pub use resolver::{
    CONFIG_HOME_ENV, ConfigEntry, ConfigLayers, ConfigOverrides, ENDPOINT_ENV, GRAPH_ENV,
    Resolved, ResolvedConfig, TOKEN_ENV, ValueSource, resolve_config,
};
pub use schema::{OutputFormat, WorkboardConfig, mask_secret};
