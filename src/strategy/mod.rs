pub mod get_fastest;

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{Candidate, RaceError, Racer, Result};

pub use get_fastest::get_fastest;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Return as soon as either probe signals; the loser is abandoned.
    #[default]
    FirstResponder,
    /// Let both probes finish and pick the lower latency.
    Measured,
}

impl FromStr for Strategy {
    type Err = RaceError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "first" | "first_responder" => Ok(Strategy::FirstResponder),
            "measured" | "fastest" => Ok(Strategy::Measured),
            other => Err(RaceError::Config(format!("unknown strategy {other:?}"))),
        }
    }
}

pub async fn pick_winner(racer: &Racer, strategy: Strategy, a: Candidate, b: Candidate) -> Result<Candidate> {
    match strategy {
        Strategy::FirstResponder => racer.race(a, b).await,
        Strategy::Measured => get_fastest(racer, a, b).await,
    }
}
