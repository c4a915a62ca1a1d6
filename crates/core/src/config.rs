//! Configuration management for seedbed.
//!
//! This module handles loading and merging configuration from multiple sources,
//! lowest precedence first:
//! - Built-in defaults (Northwind seed, `docker compose`, local Postgres)
//! - Config file (`.seedbed/config.yaml` or an explicit path)
//! - Environment variables (`SEEDBED_*`, `DB_*`)
//! - Command-line flags
//!
//! Relative paths are resolved against the workspace directory.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};

/// Default location of the seed artifact, relative to the workspace.
pub const DEFAULT_SEED_PATH: &str = "init/northwind.sql";

/// Default remote source of the seed artifact.
pub const DEFAULT_SEED_URL: &str =
    "https://raw.githubusercontent.com/pthom/northwind_psql/master/northwind.sql";

/// Default orchestration file, relative to the workspace.
pub const DEFAULT_COMPOSE_FILE: &str = "docker-compose.yml";

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the workspace root (contains .seedbed/)
    pub workspace: PathBuf,

    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// Seed artifact settings
    pub seed: SeedConfig,

    /// Network fetch settings
    pub fetch: FetchConfig,

    /// Orchestration settings
    pub service: ServiceConfig,

    /// Database the orchestration file declares
    pub database: DatabaseConfig,

    /// Log level override
    pub log_level: Option<String>,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,
}

/// Seed artifact location and integrity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedConfig {
    /// Destination of the seed file
    pub path: PathBuf,

    /// Remote URL serving the SQL dump
    pub url: String,

    /// Expected lowercase hex SHA-256 of the downloaded content
    pub sha256: Option<String>,
}

/// HTTP fetch limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Whole-request timeout in seconds
    pub timeout_secs: u64,

    /// Connection timeout in seconds
    pub connect_timeout_secs: u64,

    /// Redirects followed before the fetch is treated as a loop
    pub max_redirects: usize,
}

/// Orchestration command settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Compose file handed to the orchestration command
    pub compose_file: PathBuf,

    /// Program and leading arguments, e.g. `["docker", "compose"]`
    pub command: Vec<String>,

    /// Upper bound on how long the start command may run
    pub timeout_secs: u64,
}

/// Database declared by the compose file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub name: String,
    pub user: String,
    pub password: String,
    pub image: String,
    pub container_name: String,
}

/// Full configuration file structure. Every field is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ConfigFile {
    workspace: Option<WorkspaceSection>,
    seed: Option<SeedSection>,
    fetch: Option<FetchSection>,
    service: Option<ServiceSection>,
    database: Option<DatabaseSection>,
    logging: Option<LoggingSection>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct WorkspaceSection {
    path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SeedSection {
    path: Option<String>,
    url: Option<String>,
    sha256: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct FetchSection {
    #[serde(rename = "timeoutSecs")]
    timeout_secs: Option<u64>,
    #[serde(rename = "connectTimeoutSecs")]
    connect_timeout_secs: Option<u64>,
    #[serde(rename = "maxRedirects")]
    max_redirects: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ServiceSection {
    #[serde(rename = "composeFile")]
    compose_file: Option<String>,
    command: Option<Vec<String>>,
    #[serde(rename = "timeoutSecs")]
    timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct DatabaseSection {
    host: Option<String>,
    port: Option<u16>,
    name: Option<String>,
    user: Option<String>,
    password: Option<String>,
    image: Option<String>,
    #[serde(rename = "containerName")]
    container_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LoggingSection {
    level: Option<String>,
    color: Option<bool>,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_SEED_PATH),
            url: DEFAULT_SEED_URL.to_string(),
            sha256: None,
        }
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 300,
            connect_timeout_secs: 10,
            max_redirects: 10,
        }
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            compose_file: PathBuf::from(DEFAULT_COMPOSE_FILE),
            command: vec!["docker".to_string(), "compose".to_string()],
            timeout_secs: 120,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5432,
            name: "northwind".to_string(),
            user: "postgres".to_string(),
            password: "postgres".to_string(),
            image: "postgres:16".to_string(),
            container_name: "seedbed-postgres".to_string(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            workspace: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            config_file: None,
            seed: SeedConfig::default(),
            fetch: FetchConfig::default(),
            service: ServiceConfig::default(),
            database: DatabaseConfig::default(),
            log_level: None,
            verbose: false,
            no_color: false,
        }
    }
}

impl DatabaseConfig {
    /// Connection URL with the password masked, safe for logs and output.
    pub fn redacted_url(&self) -> String {
        format!(
            "postgresql://{}:***@{}:{}/{}",
            self.user, self.host, self.port, self.name
        )
    }
}

impl AppConfig {
    /// Load configuration from the config file and process environment.
    ///
    /// `workspace` and `config_file` come from the command line when given,
    /// since they decide which file is read. Environment variables:
    /// - `SEEDBED_WORKSPACE`, `SEEDBED_CONFIG`
    /// - `SEEDBED_SEED_PATH`, `SEEDBED_SEED_URL`, `SEEDBED_SEED_SHA256`
    /// - `SEEDBED_FETCH_TIMEOUT`
    /// - `SEEDBED_COMPOSE_FILE`, `SEEDBED_COMPOSE_COMMAND` (space separated)
    /// - `DB_HOST`, `DB_PORT`, `DB_NAME`, `DB_USER`, `DB_PASSWORD`
    /// - `RUST_LOG`, `NO_COLOR`
    ///
    /// # Example
    /// ```no_run
    /// use seedbed_core::config::AppConfig;
    ///
    /// let config = AppConfig::load(None, None).expect("Failed to load config");
    /// println!("Seed: {:?}", config.seed_path());
    /// ```
    pub fn load(workspace: Option<PathBuf>, config_file: Option<PathBuf>) -> AppResult<Self> {
        Self::load_with(workspace, config_file, |key| std::env::var(key).ok())
    }

    /// Same as [`AppConfig::load`] with an injectable environment lookup.
    pub fn load_with<F>(
        workspace: Option<PathBuf>,
        config_file: Option<PathBuf>,
        lookup: F,
    ) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(ws) = workspace.or_else(|| lookup("SEEDBED_WORKSPACE").map(PathBuf::from)) {
            config.workspace = ws;
        }
        config.config_file =
            config_file.or_else(|| lookup("SEEDBED_CONFIG").map(PathBuf::from));

        if !config.workspace.exists() {
            return Err(AppError::Config(format!(
                "Workspace directory does not exist: {:?}",
                config.workspace
            )));
        }

        let config_path = match config.config_file {
            Some(ref cf) => config.workspace.join(cf),
            None => config.seedbed_dir().join("config.yaml"),
        };

        if config_path.exists() {
            tracing::debug!("Loading config file {:?}", config_path);
            config = config.merge_yaml(&config_path)?;
        } else if config.config_file.is_some() {
            return Err(AppError::Config(format!(
                "Config file not found: {:?}",
                config_path
            )));
        } else {
            tracing::debug!("No config file at {:?}, using defaults", config_path);
        }

        config.apply_env(&lookup)?;

        // Child processes run with the workspace as their cwd, so every
        // derived path must be independent of ours.
        config.workspace = absolute_workspace(&config.workspace)?;

        Ok(config)
    }

    /// Merge a YAML configuration file into this config.
    fn merge_yaml(&self, path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        let mut result = self.clone();

        if let Some(path) = file.workspace.and_then(|ws| ws.path) {
            result.workspace = PathBuf::from(path);
        }

        if let Some(seed) = file.seed {
            if let Some(path) = seed.path {
                result.seed.path = PathBuf::from(path);
            }
            if let Some(url) = seed.url {
                result.seed.url = url;
            }
            if seed.sha256.is_some() {
                result.seed.sha256 = seed.sha256;
            }
        }

        if let Some(fetch) = file.fetch {
            if let Some(t) = fetch.timeout_secs {
                result.fetch.timeout_secs = t;
            }
            if let Some(t) = fetch.connect_timeout_secs {
                result.fetch.connect_timeout_secs = t;
            }
            if let Some(r) = fetch.max_redirects {
                result.fetch.max_redirects = r;
            }
        }

        if let Some(service) = file.service {
            if let Some(cf) = service.compose_file {
                result.service.compose_file = PathBuf::from(cf);
            }
            if let Some(cmd) = service.command {
                result.service.command = cmd;
            }
            if let Some(t) = service.timeout_secs {
                result.service.timeout_secs = t;
            }
        }

        if let Some(db) = file.database {
            let target = &mut result.database;
            if let Some(v) = db.host {
                target.host = v;
            }
            if let Some(v) = db.port {
                target.port = v;
            }
            if let Some(v) = db.name {
                target.name = v;
            }
            if let Some(v) = db.user {
                target.user = v;
            }
            if let Some(v) = db.password {
                target.password = v;
            }
            if let Some(v) = db.image {
                target.image = v;
            }
            if let Some(v) = db.container_name {
                target.container_name = v;
            }
        }

        if let Some(logging) = file.logging {
            if let Some(level) = logging.level {
                result.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                result.no_color = !color;
            }
        }

        Ok(result)
    }

    /// Environment variables override the config file.
    fn apply_env<F>(&mut self, lookup: &F) -> AppResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let overridden: Vec<&str> = ENV_KEYS
            .iter()
            .copied()
            .filter(|key| lookup(key).is_some())
            .collect();
        if !overridden.is_empty() {
            tracing::debug!("Environment overrides: {}", overridden.join(", "));
        }

        if let Some(path) = lookup("SEEDBED_SEED_PATH") {
            self.seed.path = PathBuf::from(path);
        }
        if let Some(url) = lookup("SEEDBED_SEED_URL") {
            self.seed.url = url;
        }
        if let Some(sha) = lookup("SEEDBED_SEED_SHA256") {
            self.seed.sha256 = Some(sha);
        }
        if let Some(timeout) = lookup("SEEDBED_FETCH_TIMEOUT") {
            self.fetch.timeout_secs = parse_env("SEEDBED_FETCH_TIMEOUT", &timeout)?;
        }
        if let Some(cf) = lookup("SEEDBED_COMPOSE_FILE") {
            self.service.compose_file = PathBuf::from(cf);
        }
        if let Some(cmd) = lookup("SEEDBED_COMPOSE_COMMAND") {
            self.service.command = cmd.split_whitespace().map(str::to_string).collect();
        }

        if let Some(host) = lookup("DB_HOST") {
            self.database.host = host;
        }
        if let Some(port) = lookup("DB_PORT") {
            self.database.port = parse_env("DB_PORT", &port)?;
        }
        if let Some(name) = lookup("DB_NAME") {
            self.database.name = name;
        }
        if let Some(user) = lookup("DB_USER") {
            self.database.user = user;
        }
        if let Some(password) = lookup("DB_PASSWORD") {
            self.database.password = password;
        }

        if let Some(level) = lookup("RUST_LOG") {
            self.log_level = Some(level);
        }
        if lookup("NO_COLOR").is_some() {
            self.no_color = true;
        }

        Ok(())
    }

    /// Apply CLI overrides to the configuration.
    pub fn with_overrides(
        mut self,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if verbose {
            self.verbose = true;
            // Verbose mode implies debug logging
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        self
    }

    /// Get the path to the .seedbed directory.
    pub fn seedbed_dir(&self) -> PathBuf {
        self.workspace.join(".seedbed")
    }

    /// Absolute (workspace-resolved) seed artifact path.
    pub fn seed_path(&self) -> PathBuf {
        self.workspace.join(&self.seed.path)
    }

    /// Directory the database container mounts for first-boot scripts.
    pub fn init_dir(&self) -> PathBuf {
        self.seed_path()
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.workspace.clone())
    }

    /// Workspace-resolved compose file path.
    pub fn compose_file_path(&self) -> PathBuf {
        self.workspace.join(&self.service.compose_file)
    }

    /// Validate configuration before any side effect happens.
    pub fn validate(&self) -> AppResult<()> {
        let url = self.seed.url.trim();
        if url.is_empty() {
            return Err(AppError::Config("Seed URL cannot be empty".to_string()));
        }
        if !(url.starts_with("https://") || url.starts_with("http://")) {
            return Err(AppError::Config(format!(
                "Seed URL must use http or https: {}",
                url
            )));
        }

        if self.seed.path.as_os_str().is_empty() {
            return Err(AppError::Config("Seed path cannot be empty".to_string()));
        }

        if let Some(ref sha) = self.seed.sha256 {
            if sha.len() != 64 || !sha.chars().all(|c| c.is_ascii_hexdigit()) {
                return Err(AppError::Config(format!(
                    "Invalid seed sha256 (expected 64 hex characters): {}",
                    sha
                )));
            }
        }

        if self.service.command.is_empty() || self.service.command[0].trim().is_empty() {
            return Err(AppError::Config(
                "Orchestration command cannot be empty".to_string(),
            ));
        }

        if self.fetch.timeout_secs == 0
            || self.fetch.connect_timeout_secs == 0
            || self.service.timeout_secs == 0
        {
            return Err(AppError::Config(
                "Timeouts must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}

/// Keys read by [`AppConfig::apply_env`], listed for diagnostics.
const ENV_KEYS: &[&str] = &[
    "SEEDBED_SEED_PATH",
    "SEEDBED_SEED_URL",
    "SEEDBED_SEED_SHA256",
    "SEEDBED_FETCH_TIMEOUT",
    "SEEDBED_COMPOSE_FILE",
    "SEEDBED_COMPOSE_COMMAND",
    "DB_HOST",
    "DB_PORT",
    "DB_NAME",
    "DB_USER",
    "DB_PASSWORD",
    "RUST_LOG",
    "NO_COLOR",
];

/// Anchor a possibly relative workspace at the current directory.
pub fn absolute_workspace(workspace: &Path) -> AppResult<PathBuf> {
    std::path::absolute(workspace).map_err(|e| {
        AppError::Config(format!(
            "Cannot resolve workspace directory {:?}: {}",
            workspace, e
        ))
    })
}

fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> AppResult<T> {
    value.trim().parse().map_err(|_| {
        AppError::Config(format!("Invalid value for {}: {}", key, value))
    })
}
