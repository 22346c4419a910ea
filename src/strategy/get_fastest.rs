use crate::{performance::pick_fastest, Candidate, ProbeError, RaceError, Racer, Result};

/// Measure both candidates and return the one with the lower latency.
pub async fn get_fastest(racer: &Racer, a: Candidate, b: Candidate) -> Result<Candidate> {
    let timings = racer.measure(a.clone(), b.clone()).await;

    if let Some(fastest) = pick_fastest(&timings) {
        return Ok(fastest);
    }

    let mut errors = timings.into_iter().filter_map(|timing| timing.result.err());
    match (errors.next(), errors.next()) {
        (Some(ProbeError::DeadlineElapsed { .. }), Some(ProbeError::DeadlineElapsed { .. })) => Err(RaceError::Timeout {
            a,
            b,
            duration_ms: racer.timeout().as_millis() as u64,
        }),
        (Some(first), Some(second)) => Err(RaceError::AllProbesFailed { a, b, first, second }),
        _ => Err(RaceError::Config("measurement returned fewer than two timings".to_string())),
    }
}
