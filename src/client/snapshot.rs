//! Work items read from a JSON file.
//!
//! Three layouts are accepted:
//! - `{"workItems": [...], "edges": [...]}`
//! - a saved GraphQL response, `{"data": {"workItems": [...], "edges": [...]}}`
//! - a bare array of work items (no edges)

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::Result;
use crate::client::{Scope, WorkItemSource};
use crate::models::{Dataset, WorkItem};

#[derive(Deserialize)]
#[serde(untagged)]
enum SnapshotFile {
    Response { data: Dataset },
    Dataset(Dataset),
    Items(Vec<WorkItem>),
}

/// Parse snapshot JSON in any of the accepted layouts.
pub fn parse_snapshot(content: &str) -> Result<Dataset> {
    let dataset = match serde_json::from_str(content)? {
        SnapshotFile::Response { data } => data,
        SnapshotFile::Dataset(dataset) => dataset,
        SnapshotFile::Items(items) => Dataset::new(items, Vec::new()),
    };
    Ok(dataset)
}

/// A JSON file re-read on every fetch.
#[derive(Debug, Clone)]
pub struct SnapshotSource {
    path: PathBuf,
}

impl SnapshotSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl WorkItemSource for SnapshotSource {
    fn fetch(&self, scope: &Scope) -> Result<Dataset> {
        tracing::debug!(path = %self.path.display(), "reading snapshot");
        let content = std::fs::read_to_string(&self.path)?;
        let mut dataset = parse_snapshot(&content)?;
        dataset.work_items.retain(|item| scope.admits(item));
        Ok(dataset)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}
