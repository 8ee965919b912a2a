//! KDL schema for config.kdl.
//!
//! This module provides:
//! - The `WorkboardConfig` struct mirroring the file
//! - Conversion to and from `KdlDocument`
//! - Layer merging and validation
//! - Loading from disk

use kdl::{KdlDocument, KdlValue};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::priority::PriorityField;
use crate::{Error, Result};

/// Lowest accepted poll interval.
pub const MIN_POLL_INTERVAL_SECS: u64 = 1;

/// Largest accepted activity page size.
pub const MAX_PAGE_SIZE: usize = 500;

/// Output format preference for CLI commands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// JSON output (default, machine-readable)
    #[default]
    Json,
    /// Human-readable output
    Human,
}

impl OutputFormat {
    /// Parse from string, case-insensitive.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "json" => Some(OutputFormat::Json),
            "human" => Some(OutputFormat::Human),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Human => "human",
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Settings stored in config.kdl. Every field is optional; unset fields fall
/// through to the next layer.
///
/// # KDL Schema
///
/// ```kdl
/// endpoint "https://example.com/graphql"
/// token "..."
/// graph "graph-1"
/// team "team-1"
/// poll-interval-secs 5
/// max-backoff-secs 60
/// request-timeout-secs 30
/// priority-field "comp"
/// page-size 20
/// output-format "human"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkboardConfig {
    /// GraphQL endpoint URL
    pub endpoint: Option<String>,
    /// Bearer token sent with every request
    pub token: Option<String>,
    /// Graph to scope queries to
    pub graph: Option<String>,
    /// Team to scope queries to
    pub team: Option<String>,
    pub poll_interval_secs: Option<u64>,
    pub max_backoff_secs: Option<u64>,
    pub request_timeout_secs: Option<u64>,
    pub priority_field: Option<PriorityField>,
    /// Activity feed page size
    pub page_size: Option<usize>,
    pub output_format: Option<OutputFormat>,
}

fn first_value<'a>(doc: &'a KdlDocument, name: &str) -> Option<&'a KdlValue> {
    doc.get(name)
        .and_then(|node| node.entries().first())
        .map(|entry| entry.value())
}

fn string_value(doc: &KdlDocument, name: &str) -> Option<String> {
    first_value(doc, name)
        .and_then(|v| v.as_string())
        .map(str::to_string)
}

fn integer_value(doc: &KdlDocument, name: &str) -> Option<i128> {
    first_value(doc, name).and_then(|v| v.as_integer())
}

impl WorkboardConfig {
    /// Create an empty config with no values set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the config values.
    ///
    /// Returns an error message if any value is invalid.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if let Some(secs) = self.poll_interval_secs {
            if secs < MIN_POLL_INTERVAL_SECS {
                return Err(format!("poll-interval-secs must be at least 1, got {}", secs));
            }
        }
        if let Some(secs) = self.request_timeout_secs {
            if secs == 0 {
                return Err("request-timeout-secs must be at least 1, got 0".to_string());
            }
        }
        if let Some(size) = self.page_size {
            if !(1..=MAX_PAGE_SIZE).contains(&size) {
                return Err(format!(
                    "page-size must be 1-{}, got {}",
                    MAX_PAGE_SIZE, size
                ));
            }
        }
        if let (Some(poll), Some(max)) = (self.poll_interval_secs, self.max_backoff_secs) {
            if max < poll {
                return Err(format!(
                    "max-backoff-secs ({}) must not be below poll-interval-secs ({})",
                    max, poll
                ));
            }
        }
        if let Some(endpoint) = &self.endpoint {
            if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
                return Err(format!("endpoint must be an http(s) URL, got {}", endpoint));
            }
        }
        Ok(())
    }

    /// Parse config from a KDL document.
    ///
    /// Values of the wrong KDL type are rejected so a typo surfaces in
    /// validation instead of silently falling back to a default.
    pub fn from_kdl(doc: &KdlDocument) -> std::result::Result<Self, String> {
        let mut config = Self::new();

        let string = |name: &str| -> std::result::Result<Option<String>, String> {
            match (doc.get(name), string_value(doc, name)) {
                (None, _) => Ok(None),
                (Some(_), Some(s)) => Ok(Some(s)),
                (Some(_), None) => Err(format!("{} must be a string", name)),
            }
        };
        config.endpoint = string("endpoint")?;
        config.token = string("token")?;
        config.graph = string("graph")?;
        config.team = string("team")?;

        let unsigned = |name: &str| -> std::result::Result<Option<u64>, String> {
            match (doc.get(name), integer_value(doc, name)) {
                (None, _) => Ok(None),
                (Some(_), Some(i)) => u64::try_from(i)
                    .map(Some)
                    .map_err(|_| format!("{} must be a non-negative integer, got {}", name, i)),
                (Some(_), None) => Err(format!("{} must be an integer", name)),
            }
        };
        config.poll_interval_secs = unsigned("poll-interval-secs")?;
        config.max_backoff_secs = unsigned("max-backoff-secs")?;
        config.request_timeout_secs = unsigned("request-timeout-secs")?;
        config.page_size = unsigned("page-size")?.map(|n| n as usize);

        if let Some(s) = string("priority-field")? {
            config.priority_field = Some(s.parse()?);
        }
        if let Some(s) = string("output-format")? {
            config.output_format = Some(
                OutputFormat::parse(&s).ok_or_else(|| format!("Unknown output-format: {}", s))?,
            );
        }

        Ok(config)
    }

    /// Read, parse and validate a config file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let doc: KdlDocument = content.parse()?;
        let config = Self::from_kdl(&doc)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        config
            .validate()
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        Ok(config)
    }

    /// Like [`WorkboardConfig::load`], but a missing file is an empty config.
    pub fn load_if_exists(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::new())
        }
    }
}

/// Mask a secret for display: first and last four characters.
pub fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 12 {
        let head: String = chars.iter().take(4).collect();
        format!("{}...", head)
    } else {
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{}...{}", head, tail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_output_format_parse() {
        assert_eq!(OutputFormat::parse("json"), Some(OutputFormat::Json));
        assert_eq!(OutputFormat::parse("HUMAN"), Some(OutputFormat::Human));
        assert_eq!(OutputFormat::parse("yaml"), None);
    }

    #[test]
    fn test_config_from_kdl_empty() {
        let doc = KdlDocument::new();
        let config = WorkboardConfig::from_kdl(&doc).unwrap();
        assert_eq!(config, WorkboardConfig::default());
    }

    #[test]
    fn test_config_from_kdl_full() {
        let kdl = r#"
            endpoint "https://example.com/graphql"
            token "secret-token-value"
            graph "graph-1"
            team "team-1"
            poll-interval-secs 5
            max-backoff-secs 60
            request-timeout-secs 30
            priority-field "exec"
            page-size 25
            output-format "human"
        "#;
        let doc: KdlDocument = kdl.parse().unwrap();
        let config = WorkboardConfig::from_kdl(&doc).unwrap();

        assert_eq!(config.endpoint.as_deref(), Some("https://example.com/graphql"));
        assert_eq!(config.token.as_deref(), Some("secret-token-value"));
        assert_eq!(config.graph.as_deref(), Some("graph-1"));
        assert_eq!(config.team.as_deref(), Some("team-1"));
        assert_eq!(config.poll_interval_secs, Some(5));
        assert_eq!(config.max_backoff_secs, Some(60));
        assert_eq!(config.request_timeout_secs, Some(30));
        assert_eq!(config.priority_field, Some(PriorityField::Exec));
        assert_eq!(config.page_size, Some(25));
        assert_eq!(config.output_format, Some(OutputFormat::Human));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_from_kdl_rejects_wrong_types() {
        let doc: KdlDocument = r#"poll-interval-secs "fast""#.parse().unwrap();
        assert!(WorkboardConfig::from_kdl(&doc).is_err());

        let doc: KdlDocument = "page-size -3".parse().unwrap();
        assert!(WorkboardConfig::from_kdl(&doc).is_err());

        let doc: KdlDocument = r#"priority-field "loudest""#.parse().unwrap();
        assert!(WorkboardConfig::from_kdl(&doc).is_err());
    }

    #[test]
    fn test_config_from_kdl_rejects_non_string_settings() {
        for kdl in ["endpoint 8080", "token #true", "graph 3", "team 1.5", "priority-field 2"] {
            let doc: KdlDocument = kdl.parse().unwrap();
            let err = WorkboardConfig::from_kdl(&doc).unwrap_err();
            assert!(err.ends_with("must be a string"), "{}: {}", kdl, err);
        }
    }

    #[test]
    fn test_validate_bounds() {
        let config = WorkboardConfig {
            poll_interval_secs: Some(0),
            ..Default::default()
        };
        assert!(config.validate().is_err());

        for size in [0, 501] {
            let config = WorkboardConfig {
                page_size: Some(size),
                ..Default::default()
            };
            assert!(config.validate().is_err(), "page size {}", size);
        }

        let config = WorkboardConfig {
            request_timeout_secs: Some(0),
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = WorkboardConfig {
            poll_interval_secs: Some(30),
            max_backoff_secs: Some(10),
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = WorkboardConfig {
            endpoint: Some("ftp://example.com".to_string()),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_reports_invalid_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.kdl");
        std::fs::write(&path, "page-size 9000\n").unwrap();
        let err = WorkboardConfig::load(&path).unwrap_err();
        assert!(matches!(err, Error::Config(_)));

        std::fs::write(&path, "page-size {{{\n").unwrap();
        assert!(matches!(
            WorkboardConfig::load(&path).unwrap_err(),
            Error::Kdl(_)
        ));
    }

    #[test]
    fn test_load_if_exists_missing_file() {
        let dir = TempDir::new().unwrap();
        let config = WorkboardConfig::load_if_exists(&dir.path().join("nope.kdl")).unwrap();
        assert_eq!(config, WorkboardConfig::default());
    }

    #[test]
    fn test_mask_secret() {
        assert_eq!(mask_secret("ghp_xxxxxxxxxxxxxxxxxxxx"), "ghp_...xxxx");
        assert!(mask_secret("short").starts_with("shor"));
    }
}
