use crate::Candidate;

/// Why a single probe did not signal completion.
#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Candidate {candidate} is not a valid target: {source}")]
    InvalidTarget {
        candidate: Candidate,
        #[source]
        source: url::ParseError,
    },

    #[error("Probe timed out after {duration_ms}ms")]
    TimedOut { duration_ms: u64 },

    /// The race deadline ran out while the probe was still in flight.
    #[error("Race deadline of {duration_ms}ms elapsed before the probe finished")]
    DeadlineElapsed { duration_ms: u64 },

    #[error("Probe was cancelled")]
    Cancelled,

    #[error("Probe failed: {0}")]
    Failed(String),

    #[error("Probe task panicked: {0}")]
    Panicked(String),
}

#[derive(Debug, thiserror::Error)]
pub enum RaceError {
    #[error("Timed out after {duration_ms}ms waiting for {a} and {b}")]
    Timeout {
        a: Candidate,
        b: Candidate,
        duration_ms: u64,
    },

    #[error("Probe for {candidate} failed")]
    ProbeFailed {
        candidate: Candidate,
        #[source]
        source: ProbeError,
    },

    #[error("Both probes failed ({a}: {first}; {b}: {second})")]
    AllProbesFailed {
        a: Candidate,
        b: Candidate,
        first: ProbeError,
        second: ProbeError,
    },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, RaceError>;
