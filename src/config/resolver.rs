//! Precedence resolution for configuration.
//!
//! ## Precedence (highest to lowest)
//!
//! 1. CLI flags (passed at runtime)
//! 2. Environment variables (`WB_ENDPOINT`, `WB_TOKEN`, `WB_GRAPH`)
//! 3. Explicit (`--config`) or project (`./.workboard.kdl`) config file
//! 4. System config file (`~/.config/workboard/config.kdl`)
//! 5. Built-in defaults

use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::Result;
use crate::activity::DEFAULT_PAGE_SIZE;
use crate::client::poll::{DEFAULT_MAX_BACKOFF_SECS, DEFAULT_POLL_INTERVAL_SECS};
use crate::config::{OutputFormat, WorkboardConfig, mask_secret};
use crate::priority::PriorityField;

/// Environment variable overriding the GraphQL endpoint.
pub const ENDPOINT_ENV: &str = "WB_ENDPOINT";
/// Environment variable holding the bearer token.
pub const TOKEN_ENV: &str = "WB_TOKEN";
/// Environment variable selecting the graph.
pub const GRAPH_ENV: &str = "WB_GRAPH";
/// Overrides the directory searched for the system config file.
pub const CONFIG_HOME_ENV: &str = "WB_CONFIG_HOME";

/// File name of the project-level config, looked up in the working directory.
pub const PROJECT_CONFIG_FILE: &str = ".workboard.kdl";

/// Default request timeout in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Tracks where a resolved value came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueSource {
    /// Value from CLI flag
    CliFlag,
    /// Value from environment variable
    EnvVar(String),
    /// Value from an explicit or project config file
    File(String),
    /// Value from the system config file
    System,
    /// Built-in default value
    Default,
}

impl std::fmt::Display for ValueSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValueSource::CliFlag => write!(f, "cli"),
            ValueSource::EnvVar(name) => write!(f, "env:{}", name),
            ValueSource::File(path) => write!(f, "file:{}", path),
            ValueSource::System => write!(f, "system"),
            ValueSource::Default => write!(f, "default"),
        }
    }
}

/// A resolved value with its source.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved<T> {
    /// The resolved value
    pub value: T,
    /// Where the value came from
    pub source: ValueSource,
}

impl<T> Resolved<T> {
    /// Create a new resolved value.
    pub fn new(value: T, source: ValueSource) -> Self {
        Self { value, source }
    }
}

/// First candidate that carries a value.
fn first_set<T>(candidates: impl IntoIterator<Item = (Option<T>, ValueSource)>) -> Option<Resolved<T>> {
    candidates
        .into_iter()
        .find_map(|(value, source)| value.map(|v| Resolved::new(v, source)))
}

/// Like [`first_set`], with a final default.
fn first_or<T>(
    candidates: impl IntoIterator<Item = (Option<T>, ValueSource)>,
    default: T,
) -> Resolved<T> {
    first_set(candidates).unwrap_or_else(|| Resolved::new(default, ValueSource::Default))
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Path of the system config file, if a config directory is known.
pub fn system_config_path() -> Option<PathBuf> {
    match env_value(CONFIG_HOME_ENV) {
        Some(dir) => Some(PathBuf::from(dir).join("config.kdl")),
        None => dirs::config_dir().map(|d| d.join("workboard").join("config.kdl")),
    }
}

/// The config files that take part in resolution.
#[derive(Debug, Clone, Default)]
pub struct ConfigLayers {
    /// System config (empty when the file does not exist)
    pub system: WorkboardConfig,
    /// Explicit or project config and the path it came from
    pub file: Option<(PathBuf, WorkboardConfig)>,
}

impl ConfigLayers {
    /// Load the system file and either `explicit` (which must exist) or the
    /// project file in `cwd` (if present).
    pub fn load(explicit: Option<&Path>, cwd: &Path) -> Result<Self> {
        let system = match system_config_path() {
            Some(path) => WorkboardConfig::load_if_exists(&path)?,
            None => WorkboardConfig::new(),
        };

        let file = match explicit {
            Some(path) => Some((path.to_path_buf(), WorkboardConfig::load(path)?)),
            None => {
                let path = cwd.join(PROJECT_CONFIG_FILE);
                if path.exists() {
                    let config = WorkboardConfig::load(&path)?;
                    Some((path, config))
                } else {
                    None
                }
            }
        };

        Ok(Self { system, file })
    }

    fn file_config(&self) -> Option<&WorkboardConfig> {
        self.file.as_ref().map(|(_, config)| config)
    }

    fn file_source(&self) -> ValueSource {
        ValueSource::File(
            self.file
                .as_ref()
                .map(|(path, _)| path.display().to_string())
                .unwrap_or_default(),
        )
    }
}

/// CLI overrides for configuration resolution.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub endpoint: Option<String>,
    pub graph: Option<String>,
    pub team: Option<String>,
    pub poll_interval_secs: Option<u64>,
    pub priority_field: Option<PriorityField>,
    pub page_size: Option<usize>,
    pub output_format: Option<OutputFormat>,
}

impl ConfigOverrides {
    /// Create empty overrides.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    pub fn with_graph(mut self, graph: impl Into<String>) -> Self {
        self.graph = Some(graph.into());
        self
    }

    pub fn with_team(mut self, team: impl Into<String>) -> Self {
        self.team = Some(team.into());
        self
    }

    pub fn with_poll_interval(mut self, secs: u64) -> Self {
        self.poll_interval_secs = Some(secs);
        self
    }

    pub fn with_priority_field(mut self, field: PriorityField) -> Self {
        self.priority_field = Some(field);
        self
    }

    pub fn with_page_size(mut self, size: usize) -> Self {
        self.page_size = Some(size);
        self
    }

    pub fn with_output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = Some(format);
        self
    }
}

/// Fully resolved configuration with source tracking.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    pub endpoint: Option<Resolved<String>>,
    pub token: Option<Resolved<String>>,
    pub graph: Option<Resolved<String>>,
    pub team: Option<Resolved<String>>,
    pub poll_interval_secs: Resolved<u64>,
    pub max_backoff_secs: Resolved<u64>,
    pub request_timeout_secs: Resolved<u64>,
    pub priority_field: Resolved<PriorityField>,
    pub page_size: Resolved<usize>,
    pub output_format: Resolved<OutputFormat>,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            token: None,
            graph: None,
            team: None,
            poll_interval_secs: Resolved::new(DEFAULT_POLL_INTERVAL_SECS, ValueSource::Default),
            max_backoff_secs: Resolved::new(DEFAULT_MAX_BACKOFF_SECS, ValueSource::Default),
            request_timeout_secs: Resolved::new(
                DEFAULT_REQUEST_TIMEOUT_SECS,
                ValueSource::Default,
            ),
            priority_field: Resolved::new(PriorityField::default(), ValueSource::Default),
            page_size: Resolved::new(DEFAULT_PAGE_SIZE, ValueSource::Default),
            output_format: Resolved::new(OutputFormat::Json, ValueSource::Default),
        }
    }
}

/// One line of `wb config show`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigEntry {
    pub key: &'static str,
    pub value: Option<String>,
    pub source: Option<String>,
}

impl ResolvedConfig {
    pub fn endpoint(&self) -> Option<&str> {
        self.endpoint.as_ref().map(|r| r.value.as_str())
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_ref().map(|r| r.value.as_str())
    }

    pub fn graph(&self) -> Option<&str> {
        self.graph.as_ref().map(|r| r.value.as_str())
    }

    pub fn team(&self) -> Option<&str> {
        self.team.as_ref().map(|r| r.value.as_str())
    }

    pub fn priority_field(&self) -> PriorityField {
        self.priority_field.value
    }

    pub fn output_format(&self) -> OutputFormat {
        self.output_format.value
    }

    /// Every setting as display strings, with the token masked.
    pub fn entries(&self) -> Vec<ConfigEntry> {
        fn optional(key: &'static str, r: &Option<Resolved<String>>) -> ConfigEntry {
            ConfigEntry {
                key,
                value: r.as_ref().map(|r| r.value.clone()),
                source: r.as_ref().map(|r| r.source.to_string()),
            }
        }
        fn required<T: ToString>(key: &'static str, r: &Resolved<T>) -> ConfigEntry {
            ConfigEntry {
                key,
                value: Some(r.value.to_string()),
                source: Some(r.source.to_string()),
            }
        }

        let mut token = optional("token", &self.token);
        token.value = token.value.map(|t| mask_secret(&t));

        vec![
            optional("endpoint", &self.endpoint),
            token,
            optional("graph", &self.graph),
            optional("team", &self.team),
            required("poll-interval-secs", &self.poll_interval_secs),
            required("max-backoff-secs", &self.max_backoff_secs),
            required("request-timeout-secs", &self.request_timeout_secs),
            required("priority-field", &self.priority_field),
            required("page-size", &self.page_size),
            required("output-format", &self.output_format),
        ]
    }
}

/// Resolve configuration with the full precedence chain.
pub fn resolve_config(layers: &ConfigLayers, overrides: &ConfigOverrides) -> ResolvedConfig {
    let system = &layers.system;
    let file = layers.file_config();
    let file_source = layers.file_source();
    let env = |name: &str| (env_value(name), ValueSource::EnvVar(name.to_string()));

    let string_setting = |cli: Option<String>,
                          env_name: Option<&str>,
                          from_file: Option<String>,
                          from_system: Option<String>| {
        let mut candidates = vec![(cli, ValueSource::CliFlag)];
        if let Some(name) = env_name {
            candidates.push(env(name));
        }
        candidates.push((from_file, file_source.clone()));
        candidates.push((from_system, ValueSource::System));
        first_set(candidates)
    };

    let result = ResolvedConfig {
        endpoint: string_setting(
            overrides.endpoint.clone(),
            Some(ENDPOINT_ENV),
            file.and_then(|f| f.endpoint.clone()),
            system.endpoint.clone(),
        ),
        token: string_setting(
            None,
            Some(TOKEN_ENV),
            file.and_then(|f| f.token.clone()),
            system.token.clone(),
        ),
        graph: string_setting(
            overrides.graph.clone(),
            Some(GRAPH_ENV),
            file.and_then(|f| f.graph.clone()),
            system.graph.clone(),
        ),
        team: string_setting(
            overrides.team.clone(),
            None,
            file.and_then(|f| f.team.clone()),
            system.team.clone(),
        ),
        poll_interval_secs: first_or(
            [
                (overrides.poll_interval_secs, ValueSource::CliFlag),
                (file.and_then(|f| f.poll_interval_secs), file_source.clone()),
                (system.poll_interval_secs, ValueSource::System),
            ],
            DEFAULT_POLL_INTERVAL_SECS,
        ),
        max_backoff_secs: first_or(
            [
                (file.and_then(|f| f.max_backoff_secs), file_source.clone()),
                (system.max_backoff_secs, ValueSource::System),
            ],
            DEFAULT_MAX_BACKOFF_SECS,
        ),
        request_timeout_secs: first_or(
            [
                (file.and_then(|f| f.request_timeout_secs), file_source.clone()),
                (system.request_timeout_secs, ValueSource::System),
            ],
            DEFAULT_REQUEST_TIMEOUT_SECS,
        ),
        priority_field: first_or(
            [
                (overrides.priority_field, ValueSource::CliFlag),
                (file.and_then(|f| f.priority_field), file_source.clone()),
                (system.priority_field, ValueSource::System),
            ],
            PriorityField::default(),
        ),
        page_size: first_or(
            [
                (overrides.page_size, ValueSource::CliFlag),
                (file.and_then(|f| f.page_size), file_source.clone()),
                (system.page_size, ValueSource::System),
            ],
            DEFAULT_PAGE_SIZE,
        ),
        output_format: first_or(
            [
                (overrides.output_format, ValueSource::CliFlag),
                (file.and_then(|f| f.output_format), file_source.clone()),
                (system.output_format, ValueSource::System),
            ],
            OutputFormat::Json,
        ),
    };

    tracing::debug!(
        endpoint = ?result.endpoint(),
        graph = ?result.graph(),
        poll_interval_secs = result.poll_interval_secs.value,
        "resolved configuration"
    );
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    /// Sets an environment variable for the lifetime of the guard.
    struct EnvGuard(&'static str);

    impl EnvGuard {
        fn set(name: &'static str, value: &str) -> Self {
            // SAFETY: tests touching the environment are #[serial]
            unsafe { std::env::set_var(name, value) };
            Self(name)
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            // SAFETY: see EnvGuard::set
            unsafe { std::env::remove_var(self.0) };
        }
    }

    fn clear_env() {
        for name in [ENDPOINT_ENV, TOKEN_ENV, GRAPH_ENV, CONFIG_HOME_ENV] {
            // SAFETY: callers are #[serial]
            unsafe { std::env::remove_var(name) };
        }
    }

    fn layers(system: WorkboardConfig, file: Option<WorkboardConfig>) -> ConfigLayers {
        ConfigLayers {
            system,
            file: file.map(|f| (PathBuf::from("/tmp/project/.workboard.kdl"), f)),
        }
    }

    #[test]
    fn test_value_source_display() {
        assert_eq!(ValueSource::EnvVar("FOO".to_string()).to_string(), "env:FOO");
        assert_eq!(ValueSource::File("/a.kdl".to_string()).to_string(), "file:/a.kdl");
        assert_eq!(ValueSource::System.to_string(), "system");
        assert_eq!(ValueSource::CliFlag.to_string(), "cli");
        assert_eq!(ValueSource::Default.to_string(), "default");
    }

    #[test]
    #[serial]
    fn test_resolve_defaults() {
        clear_env();
        let config = resolve_config(&ConfigLayers::default(), &ConfigOverrides::new());

        assert_eq!(config.endpoint, None);
        assert_eq!(config.token, None);
        assert_eq!(config.poll_interval_secs.value, DEFAULT_POLL_INTERVAL_SECS);
        assert_eq!(config.poll_interval_secs.source, ValueSource::Default);
        assert_eq!(config.page_size.value, DEFAULT_PAGE_SIZE);
        assert_eq!(config.priority_field(), PriorityField::Comp);
        assert_eq!(config.output_format(), OutputFormat::Json);
    }

    #[test]
    #[serial]
    fn test_precedence_cli_env_file_system() {
        clear_env();
        let system = WorkboardConfig {
            endpoint: Some("https://system.example/graphql".to_string()),
            poll_interval_secs: Some(30),
            page_size: Some(10),
            ..Default::default()
        };
        let file = WorkboardConfig {
            endpoint: Some("https://file.example/graphql".to_string()),
            poll_interval_secs: Some(15),
            ..Default::default()
        };
        let layers = layers(system, Some(file));

        let config = resolve_config(&layers, &ConfigOverrides::new());
        assert_eq!(config.endpoint(), Some("https://file.example/graphql"));
        assert!(matches!(config.endpoint.as_ref().unwrap().source, ValueSource::File(_)));
        assert_eq!(config.poll_interval_secs.value, 15);
        assert_eq!(config.page_size.value, 10);
        assert_eq!(config.page_size.source, ValueSource::System);

        let _env = EnvGuard::set(ENDPOINT_ENV, "https://env.example/graphql");
        let config = resolve_config(&layers, &ConfigOverrides::new());
        assert_eq!(config.endpoint(), Some("https://env.example/graphql"));
        assert_eq!(
            config.endpoint.as_ref().unwrap().source,
            ValueSource::EnvVar(ENDPOINT_ENV.to_string())
        );

        let overrides = ConfigOverrides::new()
            .with_endpoint("https://cli.example/graphql")
            .with_poll_interval(2);
        let config = resolve_config(&layers, &overrides);
        assert_eq!(config.endpoint(), Some("https://cli.example/graphql"));
        assert_eq!(config.endpoint.as_ref().unwrap().source, ValueSource::CliFlag);
        assert_eq!(config.poll_interval_secs.value, 2);
    }

    #[test]
    #[serial]
    fn test_token_from_env_and_masked() {
        clear_env();
        let _env = EnvGuard::set(TOKEN_ENV, "tok_abcdefghijklmnop");
        let config = resolve_config(&ConfigLayers::default(), &ConfigOverrides::new());
        assert_eq!(config.token(), Some("tok_abcdefghijklmnop"));

        let entries = config.entries();
        let token = entries.iter().find(|e| e.key == "token").unwrap();
        assert_eq!(token.value.as_deref(), Some("tok_...mnop"));
        assert_eq!(token.source.as_deref(), Some("env:WB_TOKEN"));
    }

    #[test]
    #[serial]
    fn test_blank_env_is_ignored() {
        clear_env();
        let _env = EnvGuard::set(GRAPH_ENV, "  ");
        let file = WorkboardConfig {
            graph: Some("from-file".to_string()),
            ..Default::default()
        };
        let config = resolve_config(&layers(WorkboardConfig::new(), Some(file)), &ConfigOverrides::new());
        assert_eq!(config.graph(), Some("from-file"));
    }

    #[test]
    #[serial]
    fn test_layers_load_project_and_system_files() {
        clear_env();
        let home = TempDir::new().unwrap();
        let project = TempDir::new().unwrap();
        std::fs::write(home.path().join("config.kdl"), "page-size 40\nteam \"sys-team\"\n").unwrap();
        std::fs::write(
            project.path().join(PROJECT_CONFIG_FILE),
            "team \"proj-team\"\n",
        )
        .unwrap();
        let _home = EnvGuard::set(CONFIG_HOME_ENV, home.path().to_str().unwrap());

        let layers = ConfigLayers::load(None, project.path()).unwrap();
        let config = resolve_config(&layers, &ConfigOverrides::new());
        assert_eq!(config.team(), Some("proj-team"));
        assert_eq!(config.page_size.value, 40);
        assert_eq!(config.page_size.source, ValueSource::System);
    }

    #[test]
    #[serial]
    fn test_layers_explicit_file_must_exist() {
        clear_env();
        let home = TempDir::new().unwrap();
        let _home = EnvGuard::set(CONFIG_HOME_ENV, home.path().to_str().unwrap());
        let missing = home.path().join("missing.kdl");
        assert!(ConfigLayers::load(Some(missing.as_path()), home.path()).is_err());
    }

    #[test]
    #[serial]
    fn test_entries_cover_every_key() {
        clear_env();
        let config = resolve_config(&ConfigLayers::default(), &ConfigOverrides::new());
        let keys: Vec<&str> = config.entries().iter().map(|e| e.key).collect();
        assert_eq!(
            keys,
            vec![
                "endpoint",
                "token",
                "graph",
                "team",
                "poll-interval-secs",
                "max-backoff-secs",
                "request-timeout-secs",
                "priority-field",
                "page-size",
                "output-format",
            ]
        );
    }
}
