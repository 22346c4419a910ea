use std::{fs, str::FromStr};

use anyhow::{bail, Context};
use chrono::Utc;
use first_responder::{FailurePolicy, LoserPolicy, RaceConfig, RaceSettings, Racer, Strategy};
use tokio::time::Instant;

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn load_config() -> anyhow::Result<RaceConfig> {
    let mut config = match env_var("RACE_CONFIG") {
        Some(path) => {
            let raw = fs::read_to_string(&path).with_context(|| format!("reading {path}"))?;
            serde_json::from_str::<RaceConfig>(&raw).with_context(|| format!("parsing {path}"))?
        }
        None => RaceConfig::default(),
    };

    // env knobs override the file
    if let Some(ms) = env_var("RACE_TIMEOUT_MS") {
        config.timeout_ms = ms.parse().with_context(|| format!("RACE_TIMEOUT_MS={ms}"))?;
    }

    let settings = config.settings.get_or_insert_with(RaceSettings::default);

    if let Some(strategy) = env_var("RACE_STRATEGY") {
        settings.strategy = Strategy::from_str(&strategy)?;
    }

    if let Some(policy) = env_var("RACE_LOSER_POLICY") {
        settings.loser_policy = LoserPolicy::from_str(&policy)?;
    }

    if let Some(policy) = env_var("RACE_FAILURE_POLICY") {
        settings.failure_policy = FailurePolicy::from_str(&policy)?;
    }

    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let [a, b] = args.as_slice() else {
        bail!("usage: race <url-a> <url-b>");
    };

    let config = load_config()?;
    let racer = Racer::http(config)?;

    println!(
        "[race] {} vs {} timeout={}ms strategy={:?}",
        a,
        b,
        racer.timeout().as_millis(),
        racer.config().strategy
    );

    let start = Instant::now();
    let winner = racer.run(a.as_str(), b.as_str()).await?;
    let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;

    let out = serde_json::json!({
        "a": a,
        "b": b,
        "winner": winner,
        "elapsed_ms": elapsed_ms,
        "strategy": racer.config().strategy,
        "timestamp": Utc::now().to_rfc3339(),
    });

    println!("JSON_RESULT {}", serde_json::to_string(&out)?);

    Ok(())
}
