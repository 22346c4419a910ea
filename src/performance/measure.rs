use std::time::Duration;

use tokio::time::{timeout, Instant};
use tokio_util::sync::CancellationToken;

use crate::{probe::Probe, Candidate, ProbeError};

#[derive(Debug)]
pub struct ProbeTiming {
    pub candidate: Candidate,
    pub result: Result<Duration, ProbeError>,
}

impl ProbeTiming {
    pub fn latency(&self) -> Option<Duration> {
        self.result.as_ref().ok().copied()
    }
}

/// Probe both candidates concurrently and let each run to completion, bounded by `deadline`.
///
/// Unlike a race, nothing is abandoned early: the caller gets one timing per candidate,
/// in input order, and decides what to do with them.
pub async fn measure_candidates(
    probe: &dyn Probe,
    a: Candidate,
    b: Candidate,
    deadline: Duration,
) -> Vec<ProbeTiming> {
    let token = CancellationToken::new();
    let _guard = token.clone().drop_guard();

    let timed = |candidate: Candidate| {
        let cancel = token.child_token();
        async move {
            let start = Instant::now();
            let result = match timeout(deadline, probe.probe(&candidate, cancel)).await {
                Ok(Ok(())) => Ok(start.elapsed()),
                Ok(Err(e)) => Err(e),
                Err(_) => Err(ProbeError::DeadlineElapsed {
                    duration_ms: deadline.as_millis() as u64,
                }),
            };

            tracing::debug!(candidate = %candidate, ok = result.is_ok(), "measured probe");
            ProbeTiming { candidate, result }
        }
    };

    let (first, second) = futures::join!(timed(a), timed(b));

    vec![first, second]
}
