use std::time::Duration;
use crate::types::{FailurePolicy, HttpSettings, LogLevel, LoserPolicy, RaceConfig};
use crate::{strategy::Strategy, RaceError, Result};

#[derive(Debug, Clone)]
pub struct NormalizedConfig {
    /// Deadline for a whole race; always present
    pub timeout: Duration,
    /// How the winner is chosen
    pub strategy: Strategy,
    /// What happens to the losing probe
    pub loser_policy: LoserPolicy,
    /// How probe failures are treated
    pub failure_policy: FailurePolicy,
    /// Log level for race events
    pub log_level: LogLevel,
    /// Transport settings for `HttpProbe`
    pub http: HttpConfig,
}

#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Per-request timeout, if any
    pub probe_timeout: Option<Duration>,
    /// TCP connect timeout
    pub connect_timeout: Duration,
    pub user_agent: Option<String>,
}

impl NormalizedConfig {
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout,
            strategy: Strategy::FirstResponder,
            loser_policy: LoserPolicy::Cancel,
            failure_policy: FailurePolicy::WaitForOther,
            log_level: LogLevel::Info,
            http: HttpConfig {
                probe_timeout: None,
                connect_timeout: Duration::from_millis(HttpSettings::default().connect_timeout_ms),
                user_agent: None,
            },
        }
    }
}

/// A race needs a non-zero deadline; with zero nothing can ever win.
pub fn validate_timeout(timeout: Duration) -> Result<()> {
    if timeout.is_zero() {
        return Err(RaceError::Config("timeout_ms must be greater than zero".to_string()));
    }
    Ok(())
}

pub fn resolve_config(config: RaceConfig) -> Result<NormalizedConfig> {
    validate_timeout(Duration::from_millis(config.timeout_ms))?;

    let settings = config.settings.unwrap_or_default();
    let http = settings.http.unwrap_or_default();

    if settings.probe_timeout_ms == Some(0) {
        return Err(RaceError::Config("probe_timeout_ms must be greater than zero".to_string()));
    }

    Ok(NormalizedConfig {
        timeout: Duration::from_millis(config.timeout_ms),
        strategy: settings.strategy,
        loser_policy: settings.loser_policy,
        failure_policy: settings.failure_policy,
        log_level: settings.log_level,
        http: HttpConfig {
            probe_timeout: settings.probe_timeout_ms.map(Duration::from_millis),
            connect_timeout: Duration::from_millis(http.connect_timeout_ms),
            user_agent: http.user_agent,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RaceSettings;

    #[test]
    fn resolves_defaults() {
        let cfg = resolve_config(RaceConfig::default()).unwrap();
        assert_eq!(cfg.timeout, Duration::from_secs(10));
        assert_eq!(cfg.loser_policy, LoserPolicy::Cancel);
        assert_eq!(cfg.failure_policy, FailurePolicy::WaitForOther);
        assert!(cfg.http.probe_timeout.is_none());
        assert_eq!(cfg.http.connect_timeout, Duration::from_millis(3000));
    }

    #[test]
    fn missing_settings_fall_back_to_defaults() {
        let cfg = resolve_config(RaceConfig { timeout_ms: 250, settings: None }).unwrap();
        assert_eq!(cfg.timeout, Duration::from_millis(250));
        assert_eq!(cfg.strategy, Strategy::FirstResponder);
    }

    #[test]
    fn rejects_zero_deadline() {
        let err = resolve_config(RaceConfig { timeout_ms: 0, settings: None }).unwrap_err();
        assert!(matches!(err, RaceError::Config(_)));
    }

    #[test]
    fn rejects_zero_probe_timeout() {
        let settings = RaceSettings { probe_timeout_ms: Some(0), ..RaceSettings::default() };
        let err = resolve_config(RaceConfig { timeout_ms: 100, settings: Some(settings) }).unwrap_err();
        assert!(matches!(err, RaceError::Config(_)));
    }
}
