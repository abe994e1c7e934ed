//! Dispatcher configuration
//!
//! Static settings (rule table, filters, backend query, pacing, logging) come
//! from a TOML file; when no file is given the embedded `config/default.toml`
//! is used. Secrets and deployment values are read from the environment after
//! loading a `.env` file if one is present:
//! - `API_TOKEN`: bearer token for the tracker (required)
//! - `JIRA_BASE_URL`: overrides `backend.base_url`
//!
//! The resulting [`DispatchConfig`] is built once at startup and passed
//! explicitly to everything that needs it.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use url::Url;

use crate::core::{AssetTagRule, RuleTable, TeamRule};
use crate::error::{DispatchError, DispatchResult};

const DEFAULT_CONFIG: &str = include_str!("../config/default.toml");

pub const API_TOKEN_VAR: &str = "API_TOKEN";
pub const BASE_URL_VAR: &str = "JIRA_BASE_URL";

/// Bearer token that never shows up in debug output
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ApiToken(String);

impl ApiToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Debug for ApiToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiToken(***)")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchConfig {
    pub backend: BackendConfig,
    pub routing: RoutingConfig,
    #[serde(default)]
    pub pacing: PacingConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    #[serde(default)]
    pub base_url: String,
    #[serde(skip)]
    pub api_token: ApiToken,
    #[serde(default = "default_transition_id")]
    pub transition_id: String,
    /// JQL selecting tickets waiting for dispatch
    pub pending_query: String,
    /// Statuses counted as open work when probing a candidate's load
    pub open_statuses: Vec<String>,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingConfig {
    #[serde(default)]
    pub ignored_prefixes: Vec<String>,
    #[serde(default)]
    pub asset_tag: AssetTagRule,
    /// Send the assignment even when the transition call failed
    #[serde(default = "default_true")]
    pub assign_on_transition_failure: bool,
    pub teams: Vec<TeamRule>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PacingConfig {
    /// Minimum spacing between mutating backend calls; 0 disables pacing
    #[serde(default = "default_min_interval_ms")]
    pub min_interval_ms: u64,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            min_interval_ms: default_min_interval_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_directory")]
    pub directory: PathBuf,
    #[serde(default = "default_max_bytes")]
    pub max_bytes: u64,
    #[serde(default = "default_backups")]
    pub backups: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            directory: default_log_directory(),
            max_bytes: default_max_bytes(),
            backups: default_backups(),
        }
    }
}

fn default_transition_id() -> String {
    "21".to_string()
}

fn default_page_size() -> u32 {
    50
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_true() -> bool {
    true
}

fn default_min_interval_ms() -> u64 {
    500
}

fn default_log_directory() -> PathBuf {
    PathBuf::from("logs_autojira")
}

fn default_max_bytes() -> u64 {
    shared::logging::DEFAULT_MAX_BYTES
}

fn default_backups() -> usize {
    shared::logging::DEFAULT_BACKUPS
}

impl DispatchConfig {
    /// Parse a TOML document without touching the environment
    pub fn from_toml_str(content: &str) -> DispatchResult<Self> {
        Ok(toml::from_str(content)?)
    }

    /// The configuration compiled into the binary
    pub fn embedded() -> DispatchResult<Self> {
        Self::from_toml_str(DEFAULT_CONFIG)
    }

    /// Read the file at `path`, or the embedded default when `None`
    pub fn load(path: Option<&Path>) -> DispatchResult<Self> {
        match path {
            Some(path) => {
                let content = std::fs::read_to_string(path)?;
                Self::from_toml_str(&content)
            }
            None => Self::embedded(),
        }
    }

    /// Load `.env` if present, then apply environment overrides and secrets
    pub fn apply_process_env(&mut self) {
        // A missing .env file is fine; real environment variables still apply.
        let _ = dotenv::dotenv();
        self.apply_env(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary variable lookup
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(base_url) = lookup(BASE_URL_VAR).filter(|v| !v.trim().is_empty()) {
            self.backend.base_url = base_url.trim().to_string();
        }
        if let Some(token) = lookup(API_TOKEN_VAR) {
            self.backend.api_token = ApiToken::new(token.trim());
        }
    }

    /// Check everything that can be checked before the first backend call
    pub fn validate(&self) -> DispatchResult<()> {
        self.base_url()?;

        if self.backend.api_token.is_empty() {
            return Err(DispatchError::MissingCredential {
                key: API_TOKEN_VAR.to_string(),
            });
        }
        if self.backend.pending_query.trim().is_empty() {
            return Err(DispatchError::config("backend.pending_query", "query is empty"));
        }
        if self.backend.open_statuses.iter().all(|s| s.trim().is_empty()) {
            return Err(DispatchError::config(
                "backend.open_statuses",
                "at least one open status is required for load probing",
            ));
        }
        if self.backend.page_size == 0 {
            return Err(DispatchError::config("backend.page_size", "must be greater than zero"));
        }
        if self.backend.transition_id.trim().is_empty() {
            return Err(DispatchError::config("backend.transition_id", "transition id is empty"));
        }

        self.rule_table().map(|_| ())
    }

    /// Parsed tracker base URL
    pub fn base_url(&self) -> DispatchResult<Url> {
        let raw = self.backend.base_url.trim();
        if raw.is_empty() {
            return Err(DispatchError::config(
                "backend.base_url",
                format!("not set; provide it in the config file or via {BASE_URL_VAR}"),
            ));
        }
        Ok(Url::parse(raw)?)
    }

    /// Validated, normalised rule table
    pub fn rule_table(&self) -> DispatchResult<RuleTable> {
        RuleTable::new(self.routing.teams.clone())
    }
}
