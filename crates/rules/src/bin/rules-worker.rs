//! rules-worker — runs one rule pass for a single change event.
//!
//! Reads the event JSON from a file or stdin, evaluates the owner's enabled
//! rules against it, and prints the run report as JSON on stdout.

use std::io::Read;
use std::time::Duration;

use anyhow::{bail, Context};
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use rulehook_core::config::load_dotenv;
use rulehook_core::{Config, EventData};
use rulehook_rules::RuleEngine;

// ── CLI ─────────────────────────────────────────────────────────────

/// Rule worker — evaluates a user's automation rules against an event.
#[derive(Parser, Debug)]
#[command(name = "rules-worker", version, about)]
struct Cli {
    /// Path to the event JSON, or `-` for stdin.
    #[arg(long, default_value = "-")]
    event: String,

    /// Owner of the rules. Defaults to the event's `userId`.
    #[arg(long, env = "RULEHOOK_USER_ID")]
    user_id: Option<String>,

    /// Backend API endpoint (overrides REST_BACKEND_ENDPOINT).
    #[arg(long)]
    api_endpoint: Option<String>,

    /// Token signing secret (overrides JWT_SECRET).
    #[arg(long)]
    jwt_secret: Option<String>,

    /// Per-call timeout in seconds (overrides RULEHOOK_REQUEST_TIMEOUT_SECS).
    #[arg(long)]
    timeout_secs: Option<u64>,
}

fn read_event(source: &str) -> anyhow::Result<EventData> {
    let raw = if source == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read event from stdin")?;
        buf
    } else {
        std::fs::read_to_string(source).with_context(|| format!("failed to read {source}"))?
    };
    EventData::from_json(&raw).context("invalid event JSON")
}

fn build_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = Config::from_source(|key| {
        let flag = match key {
            rulehook_core::config::ENDPOINT_KEY => cli.api_endpoint.clone(),
            rulehook_core::config::JWT_SECRET_KEY => cli.jwt_secret.clone(),
            _ => None,
        };
        flag.or_else(|| std::env::var(key).ok())
    })?;

    if let Some(secs) = cli.timeout_secs {
        if secs == 0 {
            bail!("--timeout-secs must be positive");
        }
        config = config.with_request_timeout(Duration::from_secs(secs));
    }
    Ok(config)
}

// ── main ────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    load_dotenv();
    let cli = Cli::parse();

    let config = build_config(&cli)?;
    config.log_summary();

    let event = read_event(&cli.event)?;
    let user_id = match cli.user_id.clone().or_else(|| event.user_id.clone()) {
        Some(id) => id,
        None => bail!("no user id: pass --user-id or include userId in the event"),
    };

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, cancelling rule pass");
            on_signal.cancel();
        }
    });

    let engine = RuleEngine::from_config(&config)?.with_cancellation(cancel);

    info!(user_id = %user_id, "rules-worker starting");
    let report = engine.run(&user_id, &event).await?;
    println!("{}", serde_json::to_string_pretty(&report)?);

    if !report.is_clean() {
        warn!("rule pass finished with failures");
    }
    info!("rules-worker exited cleanly");
    Ok(())
}
