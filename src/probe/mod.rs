pub mod http_probe;
pub mod scripted;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::{Candidate, ProbeError};

pub use http_probe::HttpProbe;
pub use scripted::{ProbeEvent, Script, ScriptedProbe};

/// The capability a race needs from its transport: contact a candidate and resolve once it has answered.
///
/// `Ok(())` is the completion signal; the payload is never inspected. Implementations should
/// watch `cancel` and give up their in-flight work once it fires. The racer also drops the
/// probe future when the token is cancelled, so a probe that ignores the token is still torn down.
#[async_trait]
pub trait Probe: Send + Sync {
    async fn probe(&self, candidate: &Candidate, cancel: CancellationToken) -> Result<(), ProbeError>;
}
