//! Common test utilities for workboard integration tests.
//!
//! Provides `TestEnv` for isolated runs that never read the user's
//! `~/.config/workboard/config.kdl` or hit a real endpoint.

#![allow(dead_code)]

use assert_cmd::Command;
use std::path::{Path, PathBuf};
pub use tempfile::TempDir;

/// Four items across three statuses and two graphs, plus three edges (one
/// of them pointing at an item that is not in the list).
pub const SAMPLE_DATASET: &str = r#"{
  "workItems": [
    {
      "id": "wi-1",
      "title": "Fix login redirect",
      "description": "Users land on a blank page after SSO",
      "type": "BUG",
      "status": "IN_PROGRESS",
      "priorityComp": 0.85,
      "createdAt": "2026-03-01T09:00:00Z",
      "updatedAt": "2026-03-05T10:00:00Z",
      "dueDate": "2026-03-20T00:00:00Z",
      "tags": ["auth"],
      "assignedTo": {"id": "u1", "name": "Robin Park", "username": "robin"},
      "graph": {"id": "g1", "name": "Platform"}
    },
    {
      "id": "wi-2",
      "title": "Dashboard charts",
      "type": "FEATURE",
      "status": "COMPLETED",
      "priorityComp": 0.55,
      "createdAt": "2026-02-10T09:00:00Z",
      "updatedAt": "2026-03-02T16:30:00Z",
      "dueDate": "2026-03-01T00:00:00Z",
      "assignedTo": {"id": "u2", "name": "Sam Lee", "username": "sam"},
      "graph": {"id": "g1", "name": "Platform"}
    },
    {
      "id": "wi-3",
      "title": "Upgrade database",
      "type": "TASK",
      "status": "BLOCKED",
      "priorityComp": 0.35,
      "createdAt": "2026-02-20T09:00:00Z",
      "updatedAt": "2026-02-25T12:00:00Z",
      "dueDate": "2020-01-15T00:00:00Z",
      "owner": {"id": "u1", "name": "Robin Park", "username": "robin"},
      "graph": {"id": "g2", "name": "Infra"}
    },
    {
      "id": "wi-4",
      "title": "Write onboarding docs",
      "type": "TASK",
      "status": "NOT_STARTED",
      "priorityComp": 0.1,
      "createdAt": "2026-03-03T09:00:00Z",
      "tags": null,
      "graph": {"id": "g1", "name": "Platform"}
    }
  ],
  "edges": [
    {"id": "e1", "source": "wi-3", "target": "wi-1", "type": "BLOCKS"},
    {"id": "e2", "source": "wi-1", "target": "wi-2", "type": "DEPENDS_ON"},
    {"id": "e3", "source": "wi-9", "target": "wi-4", "type": "RELATES_TO"}
  ]
}"#;

/// Environment variables the binary reads that must not leak in from the
/// developer's shell.
const ISOLATED_VARS: &[&str] = &[
    "WB_ENDPOINT",
    "WB_TOKEN",
    "WB_GRAPH",
    "WB_INPUT",
    "WB_LOG",
    "WB_LOG_JSON",
];

/// A test environment with an isolated working and config directory.
///
/// - `work_dir`: current directory for the command (project config lives here)
/// - `config_home`: stands in for `~/.config/workboard` (via `WB_CONFIG_HOME`)
pub struct TestEnv {
    pub work_dir: TempDir,
    pub config_home: TempDir,
}

impl TestEnv {
    /// Create a new test environment with isolated directories.
    pub fn new() -> Self {
        Self {
            work_dir: TempDir::new().unwrap(),
            config_home: TempDir::new().unwrap(),
        }
    }

    /// Create a test environment with [`SAMPLE_DATASET`] at `items.json`.
    pub fn with_sample() -> Self {
        let env = Self::new();
        env.write_snapshot(SAMPLE_DATASET);
        env
    }

    /// Get a Command for the wb binary, isolated from the user's config.
    pub fn wb(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_wb"));
        cmd.current_dir(self.work_dir.path());
        cmd.env("WB_CONFIG_HOME", self.config_home.path());
        for var in ISOLATED_VARS {
            cmd.env_remove(var);
        }
        cmd
    }

    /// `wb --input items.json ...`
    pub fn wb_sample(&self) -> Command {
        let mut cmd = self.wb();
        cmd.arg("--input").arg(self.snapshot_path());
        cmd
    }

    pub fn snapshot_path(&self) -> PathBuf {
        self.work_dir.path().join("items.json")
    }

    pub fn write_snapshot(&self, json: &str) -> PathBuf {
        let path = self.snapshot_path();
        std::fs::write(&path, json).unwrap();
        path
    }

    /// Write `./.workboard.kdl` in the working directory.
    pub fn write_project_config(&self, kdl: &str) -> PathBuf {
        let path = self.work_dir.path().join(".workboard.kdl");
        std::fs::write(&path, kdl).unwrap();
        path
    }

    /// Write the system-level `config.kdl`.
    pub fn write_system_config(&self, kdl: &str) -> PathBuf {
        let path = self.config_home.path().join("config.kdl");
        std::fs::write(&path, kdl).unwrap();
        path
    }

    pub fn path(&self) -> &Path {
        self.work_dir.path()
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse a command's stdout as JSON.
pub fn parse_json(output: &[u8]) -> serde_json::Value {
    serde_json::from_slice(output).unwrap_or_else(|e| {
        panic!(
            "stdout is not JSON ({}): {}",
            e,
            String::from_utf8_lossy(output)
        )
    })
}
