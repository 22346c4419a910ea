use std::{pin::Pin, sync::Arc, time::Duration};

use tokio::{task::JoinHandle, time::{Instant, Sleep}};
use tokio_util::sync::CancellationToken;

use crate::{
    config::{resolve_config, validate_timeout, NormalizedConfig},
    performance::{measure_candidates, ProbeTiming},
    probe::{HttpProbe, Probe},
    strategy, Candidate, FailurePolicy, LogLevel, LoserPolicy, ProbeError, RaceConfig, RaceError, Result,
    DEFAULT_RACE_TIMEOUT_MS,
};

/// The resolved result of a first-responder race.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RaceOutcome {
    pub winner: Candidate,
    pub runner_up: Candidate,
    /// Time from launching both probes until the winner signalled.
    pub elapsed: Duration,
}

/// Races two candidates against each other through an injected `Probe`.
///
/// Each race is one-shot: both probes are spawned as independent tasks, the caller waits
/// once for the first successful signal (or the deadline), and the loser is then either
/// cancelled or left to finish on its own depending on `LoserPolicy`.
pub struct Racer {
    probe: Arc<dyn Probe>,
    config: NormalizedConfig,
}

impl Racer {
    /// Fails with `RaceError::Config` when `timeout` is zero.
    pub fn new(probe: Arc<dyn Probe>, timeout: Duration) -> Result<Self> {
        validate_timeout(timeout)?;
        Ok(Self::from_normalized(probe, NormalizedConfig::with_timeout(timeout)))
    }

    pub fn with_config(probe: Arc<dyn Probe>, config: RaceConfig) -> Result<Self> {
        Ok(Self::from_normalized(probe, resolve_config(config)?))
    }

    pub fn from_normalized(probe: Arc<dyn Probe>, config: NormalizedConfig) -> Self {
        Self { probe, config }
    }

    /// Builds a racer that probes candidates over HTTP.
    pub fn http(config: RaceConfig) -> Result<Self> {
        let config = resolve_config(config)?;
        let probe = HttpProbe::from_config(&config.http)?;
        Ok(Self::from_normalized(Arc::new(probe), config))
    }

    pub fn config(&self) -> &NormalizedConfig {
        &self.config
    }

    pub fn timeout(&self) -> Duration {
        self.config.timeout
    }

    /// Returns whichever candidate's probe signals completion first.
    pub async fn race(&self, a: impl Into<Candidate>, b: impl Into<Candidate>) -> Result<Candidate> {
        self.race_outcome(a, b).await.map(|outcome| outcome.winner)
    }

    /// Picks a winner using the configured `Strategy`.
    pub async fn run(&self, a: impl Into<Candidate>, b: impl Into<Candidate>) -> Result<Candidate> {
        strategy::pick_winner(self, self.config.strategy, a.into(), b.into()).await
    }

    /// Runs both probes to completion (bounded by the deadline) and reports each latency.
    pub async fn measure(&self, a: impl Into<Candidate>, b: impl Into<Candidate>) -> Vec<ProbeTiming> {
        measure_candidates(self.probe.as_ref(), a.into(), b.into(), self.config.timeout).await
    }

    pub async fn race_outcome(&self, a: impl Into<Candidate>, b: impl Into<Candidate>) -> Result<RaceOutcome> {
        let a = a.into();
        let b = b.into();

        let race_token = CancellationToken::new();
        // cancels both probes if this future is dropped before resolving
        let guard = race_token.clone().drop_guard();

        self.log(&a, &b, "race started");
        let started = Instant::now();

        let mut first = self.launch(a.clone(), race_token.child_token());
        let mut second = self.launch(b.clone(), race_token.child_token());

        let deadline = tokio::time::sleep(self.config.timeout);
        tokio::pin!(deadline);

        let mut first_failure: Option<ProbeError> = None;
        let mut second_failure: Option<ProbeError> = None;

        let result = loop {
            tokio::select! {
                joined = &mut first, if first_failure.is_none() => match settle(joined) {
                    Ok(()) => break Ok(RaceOutcome { winner: a.clone(), runner_up: b.clone(), elapsed: started.elapsed() }),
                    Err(err) => {
                        self.log_failure(&a, &err);
                        if self.config.failure_policy == FailurePolicy::FailFast {
                            break Err(RaceError::ProbeFailed { candidate: a.clone(), source: err });
                        }
                        match second_failure.take() {
                            Some(other) => break self.both_failed(&a, &b, err, other, deadline.as_mut()).await,
                            None => first_failure = Some(err),
                        }
                    }
                },
                joined = &mut second, if second_failure.is_none() => match settle(joined) {
                    Ok(()) => break Ok(RaceOutcome { winner: b.clone(), runner_up: a.clone(), elapsed: started.elapsed() }),
                    Err(err) => {
                        self.log_failure(&b, &err);
                        if self.config.failure_policy == FailurePolicy::FailFast {
                            break Err(RaceError::ProbeFailed { candidate: b.clone(), source: err });
                        }
                        match first_failure.take() {
                            Some(other) => break self.both_failed(&a, &b, other, err, deadline.as_mut()).await,
                            None => second_failure = Some(err),
                        }
                    }
                },
                _ = &mut deadline => break Err(self.timeout_error(&a, &b)),
            }
        };

        match self.config.loser_policy {
            LoserPolicy::Cancel => drop(guard),
            LoserPolicy::Detach => {
                let _ = guard.disarm();
            }
        }

        match &result {
            Ok(outcome) => self.log(&outcome.winner, &outcome.runner_up, "race resolved"),
            Err(err) => tracing::warn!(a = %a, b = %b, error = %err, "race failed"),
        }

        result
    }

    fn launch(&self, candidate: Candidate, cancel: CancellationToken) -> JoinHandle<std::result::Result<(), ProbeError>> {
        let probe = Arc::clone(&self.probe);

        tokio::spawn(async move {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => Err(ProbeError::Cancelled),
                result = probe.probe(&candidate, cancel.clone()) => result,
            }
        })
    }

    async fn both_failed(
        &self,
        a: &Candidate,
        b: &Candidate,
        first: ProbeError,
        second: ProbeError,
        deadline: Pin<&mut Sleep>,
    ) -> Result<RaceOutcome> {
        if self.config.failure_policy == FailurePolicy::Ignore {
            // failures are indistinguishable from stalls here, so sit out the deadline
            deadline.await;
            return Err(self.timeout_error(a, b));
        }

        Err(RaceError::AllProbesFailed {
            a: a.clone(),
            b: b.clone(),
            first,
            second,
        })
    }

    fn timeout_error(&self, a: &Candidate, b: &Candidate) -> RaceError {
        RaceError::Timeout {
            a: a.clone(),
            b: b.clone(),
            duration_ms: self.config.timeout.as_millis() as u64,
        }
    }

    fn log_failure(&self, candidate: &Candidate, err: &ProbeError) {
        tracing::debug!(candidate = %candidate, error = %err, "probe failed");
    }

    fn log(&self, first: &Candidate, second: &Candidate, msg: &str) {
        match self.config.log_level {
            LogLevel::Info => tracing::info!(first = %first, second = %second, "{msg}"),
            LogLevel::Error => tracing::error!(first = %first, second = %second, "{msg}"),
            LogLevel::Debug => tracing::debug!(first = %first, second = %second, "{msg}"),
            LogLevel::Trace => tracing::trace!(first = %first, second = %second, "{msg}"),
            LogLevel::Warn => tracing::warn!(first = %first, second = %second, "{msg}"),
        }
    }
}

fn settle(
    joined: std::result::Result<std::result::Result<(), ProbeError>, tokio::task::JoinError>,
) -> std::result::Result<(), ProbeError> {
    joined.map_err(|e| ProbeError::Panicked(e.to_string()))?
}

/// Races two candidates over HTTP with the default ten second deadline.
pub async fn race(a: impl Into<Candidate>, b: impl Into<Candidate>) -> Result<Candidate> {
    configurable_race(a, b, Duration::from_millis(DEFAULT_RACE_TIMEOUT_MS)).await
}

/// Races two candidates over HTTP, failing with `RaceError::Timeout` once `timeout` elapses.
pub async fn configurable_race(
    a: impl Into<Candidate>,
    b: impl Into<Candidate>,
    timeout: Duration,
) -> Result<Candidate> {
    Racer::new(Arc::new(HttpProbe::new()), timeout)?.race(a, b).await
}
