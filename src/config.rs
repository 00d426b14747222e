//! Settings for a neighbor query.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::data_aquisition::snmp::SNMP_PORT;

/// Query configuration.
///
/// Loaded from an optional `cdpnei.toml` file and `CDPNEI__` environment variables,
/// command-line flags override both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveryConfig {
    /// SNMP v2c community (default: "public").
    #[serde(default = "default_community")]
    pub community: String,

    /// Agent UDP port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Extra attempts after an unanswered request.
    #[serde(default = "default_retries")]
    pub retries: u32,

    /// GETBULK max-repetitions per round.
    #[serde(default = "default_max_repetitions")]
    pub max_repetitions: u32,

    /// Upper bound on GETBULK rounds in one walk.
    #[serde(default = "default_max_rounds")]
    pub max_rounds: usize,

    /// Per-attempt response timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Deadline for the whole query in milliseconds, unbounded when absent.
    #[serde(default)]
    pub deadline_ms: Option<u64>,
}

fn default_community() -> String {
    "public".to_string()
}

fn default_port() -> u16 {
    SNMP_PORT
}

fn default_retries() -> u32 {
    1
}

fn default_max_repetitions() -> u32 {
    10
}

fn default_max_rounds() -> usize {
    64
}

fn default_timeout_ms() -> u64 {
    3000
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            community: default_community(),
            port: default_port(),
            retries: default_retries(),
            max_repetitions: default_max_repetitions(),
            max_rounds: default_max_rounds(),
            timeout_ms: default_timeout_ms(),
            deadline_ms: None,
        }
    }
}

impl DiscoveryConfig {
    /// Loads `<file_prefix>.{toml,json,yaml,...}` if present, then `CDPNEI__*` variables.
    pub fn load(file_prefix: &str) -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::File::with_name(file_prefix).required(false))
            .add_source(
                config::Environment::with_prefix("CDPNEI")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn deadline(&self) -> Option<Duration> {
        self.deadline_ms.map(Duration::from_millis)
    }
}
