use std::time::Duration;

use async_trait::async_trait;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::{config::HttpConfig, probe::Probe, Candidate, ProbeError, RaceError, Result};

/// Probes a candidate by issuing a plain GET against it.
///
/// Any response counts as completion: status, headers and body are ignored. Only transport
/// errors (and the optional per-request timeout) keep a candidate from signalling.
#[derive(Debug, Clone)]
pub struct HttpProbe {
    pub client: reqwest::Client,
    probe_timeout: Option<Duration>,
}

impl HttpProbe {
    pub fn new() -> Self {
        Self::with_client(reqwest::Client::new(), None)
    }

    pub fn with_client(client: reqwest::Client, probe_timeout: Option<Duration>) -> Self {
        Self { client, probe_timeout }
    }

    pub fn from_config(config: &HttpConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder().connect_timeout(config.connect_timeout);
        if let Some(ref agent) = config.user_agent {
            builder = builder.user_agent(agent.clone());
        }
        let client = builder.build().map_err(RaceError::Client)?;

        Ok(Self::with_client(client, config.probe_timeout))
    }

    async fn get(&self, url: Url) -> std::result::Result<reqwest::StatusCode, ProbeError> {
        let request = self.client.get(url).send();

        let response = match self.probe_timeout {
            Some(limit) => timeout(limit, request).await.map_err(|_| ProbeError::TimedOut {
                duration_ms: limit.as_millis() as u64,
            })??,
            None => request.await?,
        };

        Ok(response.status())
    }
}

impl Default for HttpProbe {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Probe for HttpProbe {
    async fn probe(&self, candidate: &Candidate, cancel: CancellationToken) -> std::result::Result<(), ProbeError> {
        let url = Url::parse(candidate.as_str()).map_err(|source| ProbeError::InvalidTarget {
            candidate: candidate.clone(),
            source,
        })?;

        // dropping the in-flight request closes its connection
        tokio::select! {
            _ = cancel.cancelled() => Err(ProbeError::Cancelled),
            status = self.get(url) => {
                let status = status?;
                tracing::trace!(candidate = %candidate, status = %status, "probe answered");
                Ok(())
            }
        }
    }
}
