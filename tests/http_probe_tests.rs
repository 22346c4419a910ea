use std::{sync::Arc, time::Duration};

use first_responder::*;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn server_with_delay(delay_ms: u64, status: u16) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(status).set_delay(Duration::from_millis(delay_ms)))
        .mount(&server)
        .await;
    server
}

fn http_racer(timeout_ms: u64) -> Racer {
    Racer::http(RaceConfig::new(timeout_ms)).expect("http racer")
}

#[tokio::test]
async fn test_faster_server_wins() {
    let fast = server_with_delay(0, 200).await;
    let slow = server_with_delay(200, 200).await;

    let racer = http_racer(5000);
    let winner = racer.race(slow.uri(), fast.uri()).await.expect("race resolves");

    assert_eq!(winner, Candidate::from(fast.uri()));
}

#[tokio::test]
async fn test_status_code_does_not_matter() {
    let erroring = server_with_delay(0, 500).await;
    let slow_ok = server_with_delay(200, 200).await;

    let winner = http_racer(5000).race(erroring.uri(), slow_ok.uri()).await.unwrap();

    assert_eq!(winner, Candidate::from(erroring.uri()));
}

#[tokio::test]
async fn test_configurable_race_times_out() {
    let a = server_with_delay(500, 200).await;
    let b = server_with_delay(500, 200).await;

    let err = configurable_race(a.uri(), b.uri(), Duration::from_millis(50)).await.unwrap_err();

    match err {
        RaceError::Timeout { a: ca, b: cb, duration_ms } => {
            assert_eq!(duration_ms, 50);
            assert_eq!(ca, Candidate::from(a.uri()));
            assert_eq!(cb, Candidate::from(b.uri()));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_default_race_over_http() {
    let fast = server_with_delay(0, 204).await;
    let slow = server_with_delay(150, 204).await;

    assert_eq!(race(fast.uri(), slow.uri()).await.unwrap(), Candidate::from(fast.uri()));
}

#[tokio::test]
async fn test_unreachable_candidate_loses_to_live_one() {
    let live = server_with_delay(20, 200).await;
    // nothing listens on port 9 of the loopback, so this fails fast with a connect error
    let refused = "http://127.0.0.1:9/";

    let winner = http_racer(5000).race(refused, live.uri()).await.unwrap();

    assert_eq!(winner, Candidate::from(live.uri()));
}

#[tokio::test]
async fn test_invalid_target_is_a_probe_error() {
    let probe = HttpProbe::new();
    let err = probe.probe(&Candidate::from("not a url"), CancellationToken::new()).await.unwrap_err();

    assert!(matches!(err, ProbeError::InvalidTarget { .. }));
}

#[tokio::test]
async fn test_both_invalid_targets_fail_the_race() {
    let racer = Racer::new(Arc::new(HttpProbe::new()), Duration::from_secs(1)).unwrap();
    let err = racer.race("nope", "also nope").await.unwrap_err();

    assert!(matches!(err, RaceError::AllProbesFailed { .. }));
}

#[tokio::test]
async fn test_probe_timeout_setting_bounds_each_request() {
    let slow = server_with_delay(300, 200).await;
    let settings = RaceSettings { probe_timeout_ms: Some(30), ..RaceSettings::default() };
    let config = resolve_config(RaceConfig { timeout_ms: 1000, settings: Some(settings) }).unwrap();
    let probe = HttpProbe::from_config(&config.http).unwrap();

    let err = probe.probe(&Candidate::from(slow.uri()), CancellationToken::new()).await.unwrap_err();

    assert!(matches!(err, ProbeError::TimedOut { duration_ms: 30 }));
}

#[tokio::test]
async fn test_cancelled_request_returns_promptly() {
    // the server holds its response far longer than the cancel delay
    let stalled = server_with_delay(10_000, 200).await;
    let http = HttpProbe::new();
    let token = CancellationToken::new();
    let cancel = token.clone();

    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        cancel.cancel();
    });

    let started = std::time::Instant::now();
    let err = http.probe(&Candidate::from(stalled.uri()), token).await.unwrap_err();

    assert!(matches!(err, ProbeError::Cancelled), "unexpected error: {err:?}");
    assert!(started.elapsed() < Duration::from_secs(2));
}

#[tokio::test]
async fn test_measured_request_timeouts_are_not_reported_as_race_timeout() {
    let a = server_with_delay(300, 200).await;
    let b = server_with_delay(300, 200).await;
    let settings = RaceSettings {
        strategy: Strategy::Measured,
        probe_timeout_ms: Some(30),
        ..RaceSettings::default()
    };
    let racer = Racer::http(RaceConfig { timeout_ms: 5000, settings: Some(settings) }).unwrap();

    let started = std::time::Instant::now();
    let err = racer.run(a.uri(), b.uri()).await.unwrap_err();

    assert!(started.elapsed() < Duration::from_secs(5));
    match err {
        RaceError::AllProbesFailed { first, second, .. } => {
            assert!(matches!(first, ProbeError::TimedOut { duration_ms: 30 }));
            assert!(matches!(second, ProbeError::TimedOut { duration_ms: 30 }));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_measured_race_deadline_is_reported_as_timeout() {
    let a = server_with_delay(1000, 200).await;
    let b = server_with_delay(1000, 200).await;
    let settings = RaceSettings { strategy: Strategy::Measured, ..RaceSettings::default() };
    let racer = Racer::http(RaceConfig { timeout_ms: 50, settings: Some(settings) }).unwrap();

    let err = racer.run(a.uri(), b.uri()).await.unwrap_err();

    assert!(matches!(err, RaceError::Timeout { duration_ms: 50, .. }), "unexpected error: {err:?}");
}

#[tokio::test]
async fn test_configurable_race_rejects_zero_deadline() {
    let server = server_with_delay(0, 200).await;

    let err = configurable_race(server.uri(), server.uri(), Duration::ZERO).await.unwrap_err();

    assert!(matches!(err, RaceError::Config(_)));
}

#[tokio::test]
async fn test_measure_reports_both_latencies() {
    let fast = server_with_delay(0, 200).await;
    let slow = server_with_delay(100, 200).await;

    let timings = http_racer(5000).measure(fast.uri(), slow.uri()).await;

    assert_eq!(timings.len(), 2);
    let fast_latency = timings[0].latency().expect("fast ok");
    let slow_latency = timings[1].latency().expect("slow ok");
    assert!(slow_latency >= Duration::from_millis(100));
    assert!(fast_latency < slow_latency);
}
