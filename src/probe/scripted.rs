use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;

use crate::{probe::Probe, Candidate, ProbeError};

/// Scripted behaviour for one candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Script {
    /// Signal completion after the delay.
    CompleteAfter(Duration),
    /// Fail after the delay.
    FailAfter(Duration),
    /// Never signal.
    Stall,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeEvent {
    Started(Candidate),
    Completed(Candidate),
    Failed(Candidate),
    /// The probe was cancelled or dropped before it finished.
    Cancelled(Candidate),
}

/// An in-process `Probe` driven by per-candidate scripts rather than a network.
///
/// Delays run on the tokio clock, so under a paused runtime the timings are exact.
/// Every lifecycle transition is written to an event log that callers can inspect.
#[derive(Debug, Default, Clone)]
pub struct ScriptedProbe {
    scripts: Arc<DashMap<Candidate, Script>>,
    events: Arc<Mutex<Vec<ProbeEvent>>>,
}

impl ScriptedProbe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(self, candidate: impl Into<Candidate>, script: Script) -> Self {
        self.set(candidate, script);
        self
    }

    pub fn set(&self, candidate: impl Into<Candidate>, script: Script) {
        self.scripts.insert(candidate.into(), script);
    }

    pub fn events(&self) -> Vec<ProbeEvent> {
        self.events.lock().clone()
    }

    pub fn cancelled(&self) -> Vec<Candidate> {
        self.events
            .lock()
            .iter()
            .filter_map(|event| match event {
                ProbeEvent::Cancelled(c) => Some(c.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn completed(&self) -> Vec<Candidate> {
        self.events
            .lock()
            .iter()
            .filter_map(|event| match event {
                ProbeEvent::Completed(c) => Some(c.clone()),
                _ => None,
            })
            .collect()
    }

    fn record(&self, event: ProbeEvent) {
        self.events.lock().push(event);
    }
}

/// Records `Cancelled` if the probe future is dropped before it settles.
struct InFlight<'a> {
    probe: &'a ScriptedProbe,
    candidate: &'a Candidate,
    settled: bool,
}

impl InFlight<'_> {
    fn settle(mut self, event: ProbeEvent) {
        self.settled = true;
        self.probe.record(event);
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.settled {
            self.probe.record(ProbeEvent::Cancelled(self.candidate.clone()));
        }
    }
}

#[async_trait]
impl Probe for ScriptedProbe {
    async fn probe(&self, candidate: &Candidate, cancel: CancellationToken) -> Result<(), ProbeError> {
        // copy out so the map guard is not held across an await
        let script = self.scripts.get(candidate).map(|entry| *entry.value());
        let Some(script) = script else {
            return Err(ProbeError::Failed(format!("no script for {candidate}")));
        };

        self.record(ProbeEvent::Started(candidate.clone()));
        let guard = InFlight { probe: self, candidate, settled: false };

        let (delay, succeed) = match script {
            Script::CompleteAfter(delay) => (Some(delay), true),
            Script::FailAfter(delay) => (Some(delay), false),
            Script::Stall => (None, false),
        };

        let elapsed = async {
            match delay {
                Some(delay) => tokio::time::sleep(delay).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            _ = cancel.cancelled() => {
                guard.settle(ProbeEvent::Cancelled(candidate.clone()));
                Err(ProbeError::Cancelled)
            }
            _ = elapsed => {
                if succeed {
                    guard.settle(ProbeEvent::Completed(candidate.clone()));
                    Ok(())
                } else {
                    guard.settle(ProbeEvent::Failed(candidate.clone()));
                    Err(ProbeError::Failed(format!("scripted failure for {candidate}")))
                }
            }
        }
    }
}
