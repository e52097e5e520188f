//! Configuration surface: which services, trees and database to watch, and
//! how the snapshot is refreshed.
//!
//! Settings come from an optional config file merged with `STACKWATCH_*`
//! environment variables (`__` separates nesting levels, e.g.
//! `STACKWATCH_REFRESH__POLICY=interval`).

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use config::{Config, Environment, File};
use serde::Deserialize;

/// Default listen address for the snapshot server.
pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:8080";

const DEFAULT_PROBE_TIMEOUT_SECS: u64 = 3;
const DEFAULT_REFRESH_PERIOD_SECS: u64 = 30;

/// Top-level stackwatch configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StackwatchConfig {
    /// Address the HTTP server binds to.
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// Services to check for TCP reachability, in display order.
    #[serde(default)]
    pub services: Vec<ServiceSpec>,

    /// Source trees to count files in, in display order.
    #[serde(default)]
    pub sizes: Vec<SizeRule>,

    /// Development database to introspect, if any.
    #[serde(default)]
    pub database: Option<DatabaseSpec>,

    /// How snapshots are (re)built.
    #[serde(default)]
    pub refresh: RefreshConfig,
}

impl StackwatchConfig {
    /// Load configuration from an optional file plus the environment.
    ///
    /// Environment variables win over file values, so a checked-in config
    /// can be overridden per shell.
    pub fn load(path: Option<&Path>) -> Result<Self, config::ConfigError> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }

        builder
            .add_source(Environment::with_prefix("STACKWATCH").separator("__"))
            .build()?
            .try_deserialize()
    }
}

impl Default for StackwatchConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            services: Vec::new(),
            sizes: Vec::new(),
            database: None,
            refresh: RefreshConfig::default(),
        }
    }
}

/// One service whose port is checked for reachability.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceSpec {
    /// Identifier shown in the snapshot (e.g. "api").
    pub name: String,

    /// Host to connect to.
    pub host: String,

    /// Port to connect to.
    pub port: u16,

    /// Connect timeout in seconds.
    #[serde(default = "default_probe_timeout_secs")]
    pub timeout_secs: u64,
}

impl ServiceSpec {
    /// The connect timeout as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// One source tree whose matching files are counted.
#[derive(Debug, Clone, Deserialize)]
pub struct SizeRule {
    /// Label shown in the snapshot (e.g. "backend-sources").
    pub label: String,

    /// Directory the count starts from.
    pub root: PathBuf,

    /// File name rules to count (`*.ext` or literal names). Empty counts
    /// every file.
    #[serde(default)]
    pub match_rules: Vec<String>,

    /// File or directory names to skip.
    #[serde(default)]
    pub exclude_rules: Vec<String>,

    /// Expected count representing "complete". Used only for the progress
    /// estimate; never inferred, always configured.
    pub target_count: u64,
}

/// The development database to introspect.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSpec {
    /// Path to the SQLite database file.
    pub path: PathBuf,
}

/// Snapshot refresh behavior.
#[derive(Debug, Clone, Deserialize)]
pub struct RefreshConfig {
    /// Rebuild per request, or in the background on a fixed period.
    #[serde(default)]
    pub policy: RefreshPolicy,

    /// Rebuild period in seconds (interval policy only).
    #[serde(default = "default_refresh_period_secs")]
    pub period_secs: u64,
}

impl RefreshConfig {
    /// The rebuild period as a [`Duration`].
    pub fn period(&self) -> Duration {
        Duration::from_secs(self.period_secs)
    }
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            policy: RefreshPolicy::default(),
            period_secs: default_refresh_period_secs(),
        }
    }
}

/// Recognized refresh policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RefreshPolicy {
    /// Build a fresh snapshot synchronously for every request.
    #[default]
    OnDemand,

    /// Rebuild on a fixed period; requests read the latest completed build.
    Interval,
}

impl RefreshPolicy {
    /// The configuration spelling of this policy.
    pub fn as_str(&self) -> &'static str {
        match self {
            RefreshPolicy::OnDemand => "on-demand",
            RefreshPolicy::Interval => "interval",
        }
    }
}

impl FromStr for RefreshPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "on-demand" => Ok(RefreshPolicy::OnDemand),
            "interval" => Ok(RefreshPolicy::Interval),
            other => Err(format!(
                "unknown refresh policy '{other}' (expected 'on-demand' or 'interval')"
            )),
        }
    }
}

fn default_listen_addr() -> String {
    DEFAULT_LISTEN_ADDR.to_string()
}

fn default_probe_timeout_secs() -> u64 {
    DEFAULT_PROBE_TIMEOUT_SECS
}

fn default_refresh_period_secs() -> u64 {
    DEFAULT_REFRESH_PERIOD_SECS
}
