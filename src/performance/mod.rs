pub mod measure;
pub mod pick_fastest;

pub use measure::{measure_candidates, ProbeTiming};
pub use pick_fastest::pick_fastest;
