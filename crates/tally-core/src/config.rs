//! Configuration loading and typed config structures for Tally.
//!
//! The canonical configuration lives in `tally-config.yaml`. This module
//! defines strongly-typed structs that mirror the YAML structure, and a
//! loader that reads, applies environment overrides, and validates it.
//! Every field has a default, so an empty file is a valid configuration.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tally_history::HistoryLimit;

use crate::activity::Activity;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// The configuration parsed but is inconsistent.
    #[error("invalid config: {0}")]
    Invalid(String),
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level Tally configuration.
///
/// Mirrors the structure of `tally-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TallyConfig {
    /// Scoreboard shape and activity catalog.
    #[serde(default)]
    pub board: BoardConfig,

    /// Undo/redo settings.
    #[serde(default)]
    pub history: HistoryConfig,

    /// Where the scoreboard is persisted.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Remote spreadsheet connection settings.
    #[serde(default)]
    pub sheets: SheetsConfig,

    /// Budget tracker settings.
    #[serde(default)]
    pub budget: BudgetConfig,

    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl TallyConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// Environment variables override YAML values:
    /// - `TALLY_SHEETS_TOKEN` overrides `sheets.access_token`
    /// - `TALLY_SHEETS_ID` overrides `sheets.spreadsheet_id`
    /// - `TALLY_PORT` overrides `server.port`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::Invalid`] if validation fails.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
    /// [`ConfigError::Invalid`] if validation fails.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_yml::from_str(yaml)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Override values with environment variables when set.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("TALLY_SHEETS_TOKEN") {
            self.sheets.access_token = val;
        }
        if let Ok(val) = std::env::var("TALLY_SHEETS_ID") {
            self.sheets.spreadsheet_id = val;
        }
        if let Ok(val) = std::env::var("TALLY_PORT") {
            match val.parse() {
                Ok(port) => self.server.port = port,
                Err(e) => tracing::warn!(value = %val, error = %e, "ignoring invalid TALLY_PORT"),
            }
        }
    }

    /// Check cross-field consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when there are no categories, an
    /// activity references an undeclared category, or activity names
    /// repeat.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.board.categories.iter().all(|c| c.trim().is_empty()) {
            return Err(ConfigError::Invalid(
                "board.categories must name at least one category".to_owned(),
            ));
        }

        let mut seen = BTreeSet::new();
        for activity in &self.board.activities {
            if !self.board.categories.iter().any(|c| c.trim() == activity.category) {
                return Err(ConfigError::Invalid(format!(
                    "activity {:?} references unknown category {:?}",
                    activity.name, activity.category
                )));
            }
            if !seen.insert(activity.name.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate activity name {:?}",
                    activity.name
                )));
            }
        }

        let uses_sheets = matches!(
            self.storage.backend,
            BoardBackend::Sheets | BoardBackend::CachedSheets
        ) || (self.budget.enabled && self.budget.backend == LedgerBackend::Sheets);
        if uses_sheets && self.sheets.spreadsheet_id.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "sheets.spreadsheet_id is required for spreadsheet backends".to_owned(),
            ));
        }

        Ok(())
    }
}

/// Scoreboard shape and the activities that award points.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BoardConfig {
    /// Page title.
    #[serde(default = "default_title")]
    pub title: String,

    /// Participants present on a fresh board.
    #[serde(default)]
    pub participants: Vec<String>,

    /// Category names, in display order.
    #[serde(default = "default_categories")]
    pub categories: Vec<String>,

    /// Point-awarding activities.
    #[serde(default = "default_activities")]
    pub activities: Vec<Activity>,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            participants: Vec::new(),
            categories: default_categories(),
            activities: default_activities(),
        }
    }
}

/// Undo/redo configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct HistoryConfig {
    /// Maximum snapshots per stack; `0` means unbounded.
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

impl HistoryConfig {
    /// The configured cap as a [`HistoryLimit`].
    pub const fn limit(&self) -> HistoryLimit {
        HistoryLimit::from_depth(self.max_depth)
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
        }
    }
}

/// Scoreboard persistence backend selector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoardBackend {
    /// Keep state in process memory only.
    Memory,
    /// A local JSON document.
    #[default]
    JsonFile,
    /// A remote spreadsheet range.
    Sheets,
    /// A remote spreadsheet range behind a read cache.
    CachedSheets,
}

/// Scoreboard storage configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StorageConfig {
    /// Which backend stores the scoreboard.
    #[serde(default)]
    pub backend: BoardBackend,

    /// File path for the `json_file` backend.
    #[serde(default = "default_scores_path")]
    pub json_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: BoardBackend::default(),
            json_path: default_scores_path(),
        }
    }
}

/// Remote spreadsheet connection settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SheetsConfig {
    /// Base URL of the values API.
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Spreadsheet identifier.
    #[serde(default)]
    pub spreadsheet_id: String,

    /// A1 range holding the scoreboard (header row plus one row per
    /// participant).
    #[serde(default = "default_scores_range")]
    pub scores_range: String,

    /// A1 range holding budget rows.
    #[serde(default = "default_budget_range")]
    pub budget_range: String,

    /// OAuth bearer token. Empty sends unauthenticated requests.
    #[serde(default)]
    pub access_token: String,

    /// How long a cached read stays fresh (`cached_sheets` only).
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,

    /// Per-request timeout.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl Default for SheetsConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            spreadsheet_id: String::new(),
            scores_range: default_scores_range(),
            budget_range: default_budget_range(),
            access_token: String::new(),
            cache_ttl_secs: default_cache_ttl_secs(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

/// Budget ledger backend selector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LedgerBackend {
    /// Keep entries in process memory only.
    Memory,
    /// A local JSON document.
    #[default]
    JsonFile,
    /// Rows appended to a remote spreadsheet.
    Sheets,
}

/// Budget tracker configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BudgetConfig {
    /// Whether the budget pages are served.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Which backend stores budget entries.
    #[serde(default)]
    pub backend: LedgerBackend,

    /// File path for the `json_file` backend.
    #[serde(default = "default_budget_path")]
    pub json_path: PathBuf,

    /// Prefix used when formatting amounts.
    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,
}

impl Default for BudgetConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            backend: LedgerBackend::default(),
            json_path: default_budget_path(),
            currency_symbol: default_currency_symbol(),
        }
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerConfig {
    /// The host address to bind to.
    #[serde(default = "default_host")]
    pub host: String,

    /// The TCP port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Maximum live editing sessions before the oldest is evicted.
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_sessions: default_max_sessions(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format.
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

fn default_title() -> String {
    "Champion Tracker".to_owned()
}

fn default_categories() -> Vec<String> {
    vec!["prospecting".to_owned(), "recruitment".to_owned()]
}

fn default_activities() -> Vec<Activity> {
    vec![
        Activity {
            name: "Prospect contacted".to_owned(),
            category: "prospecting".to_owned(),
            points: 1,
        },
        Activity {
            name: "Presentation booked".to_owned(),
            category: "prospecting".to_owned(),
            points: 3,
        },
        Activity {
            name: "Recruit signed".to_owned(),
            category: "recruitment".to_owned(),
            points: 5,
        },
    ]
}

const fn default_max_depth() -> usize {
    50
}

fn default_scores_path() -> PathBuf {
    PathBuf::from("data/scores.json")
}

fn default_budget_path() -> PathBuf {
    PathBuf::from("data/budget.json")
}

fn default_api_base() -> String {
    "https://sheets.googleapis.com".to_owned()
}

fn default_scores_range() -> String {
    "Sheet1".to_owned()
}

fn default_budget_range() -> String {
    "Budget!A:D".to_owned()
}

const fn default_cache_ttl_secs() -> u64 {
    30
}

const fn default_request_timeout_ms() -> u64 {
    10_000
}

fn default_currency_symbol() -> String {
    "₱".to_owned()
}

fn default_host() -> String {
    "0.0.0.0".to_owned()
}

const fn default_port() -> u16 {
    8080
}

const fn default_max_sessions() -> usize {
    256
}

fn default_log_level() -> String {
    "info".to_owned()
}

const fn default_true() -> bool {
    true
}
