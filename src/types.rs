use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::{strategy::Strategy, RaceError};

/// Default deadline for a race, matching the ten second budget of the plain `race` helper.
pub const DEFAULT_RACE_TIMEOUT_MS: u64 = 10_000;

/// One of the two competing targets in a race.
///
/// Only identity matters to the race, so the value is kept opaque and never mutated
/// once constructed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(transparent)]
pub struct Candidate(String);

impl Candidate {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Candidate {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for Candidate {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<Url> for Candidate {
    fn from(url: Url) -> Self {
        Self(url.to_string())
    }
}

impl AsRef<str> for Candidate {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace
}

/// What happens to the probe that did not win.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoserPolicy {
    /// Signal the loser's cancellation token so it drops its in-flight work.
    #[default]
    Cancel,
    /// Leave the loser running in the background; its result is discarded.
    Detach,
}

/// How a probe that fails (as opposed to one that is merely slow) affects the race.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// A failed candidate cannot win; keep waiting on the other one.
    /// If both fail the race ends with `AllProbesFailed` straight away.
    #[default]
    WaitForOther,
    /// The first failure ends the race.
    FailFast,
    /// Treat a failure as a probe that never signals, so a failed candidate is
    /// indistinguishable from a slow one. Both failing means waiting out the deadline.
    Ignore,
}

impl FromStr for LoserPolicy {
    type Err = RaceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cancel" => Ok(LoserPolicy::Cancel),
            "detach" => Ok(LoserPolicy::Detach),
            other => Err(RaceError::Config(format!("unknown loser policy {other:?}"))),
        }
    }
}

impl FromStr for FailurePolicy {
    type Err = RaceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "wait_for_other" | "wait" => Ok(FailurePolicy::WaitForOther),
            "fail_fast" => Ok(FailurePolicy::FailFast),
            "ignore" => Ok(FailurePolicy::Ignore),
            other => Err(RaceError::Config(format!("unknown failure policy {other:?}"))),
        }
    }
}

// serde-facing configuration; see `config::resolve_config` for the normalised form

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RaceConfig {
    pub timeout_ms: u64,
    pub settings: Option<RaceSettings>,
}

impl RaceConfig {
    pub fn new(timeout_ms: u64) -> Self {
        Self {
            timeout_ms,
            settings: Some(RaceSettings::default()),
        }
    }
}

impl Default for RaceConfig {
    fn default() -> Self {
        Self::new(DEFAULT_RACE_TIMEOUT_MS)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RaceSettings {
    pub log_level: LogLevel,
    pub strategy: Strategy,
    pub loser_policy: LoserPolicy,
    pub failure_policy: FailurePolicy,
    /// Per-request bound applied by `HttpProbe`, independent of the race deadline.
    pub probe_timeout_ms: Option<u64>,
    pub http: Option<HttpSettings>,
}

impl Default for RaceSettings {
    fn default() -> Self {
        Self {
            log_level: LogLevel::Info,
            strategy: Strategy::FirstResponder,
            loser_policy: LoserPolicy::Cancel,
            failure_policy: FailurePolicy::WaitForOther,
            probe_timeout_ms: None,
            http: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HttpSettings {
    pub connect_timeout_ms: u64,
    pub user_agent: Option<String>,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            connect_timeout_ms: 3000,
            user_agent: None,
        }
    }
}
