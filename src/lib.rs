pub mod config;
pub mod error;
pub mod performance;
pub mod probe;
pub mod racer;
pub mod strategy;
pub mod types;

pub use error::{ProbeError, RaceError, Result};
pub use racer::{configurable_race, race, RaceOutcome, Racer};
pub use types::{
    Candidate, FailurePolicy, HttpSettings, LogLevel, LoserPolicy, RaceConfig, RaceSettings,
    DEFAULT_RACE_TIMEOUT_MS
};

// Re-export commonly used items
pub use config::{NormalizedConfig, resolve_config};
pub use probe::{HttpProbe, Probe, ScriptedProbe, Script};
pub use strategy::Strategy;
