//! Workboard - work item dashboards from a GraphQL backend.
//!
//! This library provides the core functionality for the `wb` CLI tool:
//! filtering, statistics, priority bucketing, activity synthesis and the
//! view models every dashboard renders, plus the client boundary that
//! fetches work items and edges.

pub mod activity;
pub mod cli;
pub mod client;
pub mod commands;
pub mod config;
pub mod filter;
pub mod models;
pub mod priority;
pub mod registry;
pub mod stats;
#[cfg(feature = "tui")]
pub mod tui;
pub mod views;

/// Error types for workboard operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config parse error: {0}")]
    Kdl(#[from] kdl::KdlError),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("GraphQL error: {0}")]
    Graphql(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for workboard operations.
pub type Result<T> = std::result::Result<T, Error>;
