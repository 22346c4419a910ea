use crate::{performance::ProbeTiming, Candidate};

/// Successful timing with the lowest latency; ties go to the earlier entry.
pub fn pick_fastest(timings: &[ProbeTiming]) -> Option<Candidate> {
    timings
        .iter()
        .filter_map(|timing| timing.latency().map(|latency| (timing, latency)))
        .min_by_key(|(_, latency)| *latency)
        .map(|(timing, _)| timing.candidate.clone())
}
