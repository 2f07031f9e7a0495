//! Quote Refresh Binary
//!
//! Reads request snapshots as newline-delimited JSON on stdin, feeds them to a
//! refresh engine and prints every changed quote view as one JSON line on
//! stdout. A line containing just `refresh` re-fetches the latest inputs.
//!
//! ```text
//! {"fromAsset":{"address":"0xusdc","symbol":"USDC","decimals":6},"toAsset":{...},"amount":"100"}
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use quote_config::load_config;
use quote_refresh::logging::{init_tracing, LogEmoji};
use quote_refresh::testing::ScriptedProvider;
use quote_refresh::{
    log_error, log_success, log_warning, EngineConfig, HttpProviderConfig, HttpQuoteProvider,
    QuoteProvider, QuoteView, RankingPolicy, RefreshEngine, RequestSnapshot,
};
use quote_types::QuoteCandidate;
use serde::Serialize;
use std::{path::PathBuf, sync::Arc, time::Duration};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

#[derive(Parser)]
#[command(name = "quote_refresh")]
#[command(about = "Debounced quote refresh over newline-delimited JSON snapshots")]
struct Args {
    /// Configuration file path (defaults to config/quote_refresh.toml if present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Environment overlay, loaded from config/environments/<env>.toml
    #[arg(short, long)]
    env: Option<String>,

    /// Ordering applied to printed quotes
    #[arg(short, long, default_value = "most-profit")]
    policy: RankingPolicy,

    /// Override the configured debounce window
    #[arg(long)]
    debounce_ms: Option<u64>,

    /// Simulated latency of the demo provider
    #[arg(long, default_value_t = 300)]
    demo_latency_ms: u64,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    print_config: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ViewOutput {
    is_fetching: bool,
    error: Option<String>,
    policy: RankingPolicy,
    quotes: Vec<QuoteCandidate>,
}

impl ViewOutput {
    fn new(view: &QuoteView, policy: RankingPolicy, is_buy_order: bool) -> Self {
        Self {
            is_fetching: view.is_fetching,
            error: view.error.as_ref().map(|e| e.to_string()),
            policy,
            quotes: view.ranked(policy, is_buy_order),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut settings = load_config(args.config.as_deref(), args.env.as_deref())
        .context("Failed to load configuration")?;
    if let Some(ms) = args.debounce_ms {
        settings.engine.debounce_ms = ms;
    }
    if args.print_config {
        print!("{}", settings.to_toml()?);
        return Ok(());
    }
    init_tracing(&settings.global)?;

    let engine_config = EngineConfig::from_settings(&settings);
    engine_config.validate().context("Invalid engine configuration")?;

    let provider: Arc<dyn QuoteProvider> = match HttpProviderConfig::from_settings(&settings)? {
        Some(http) => {
            info!("📡 Using aggregator at {}", http.base_url);
            Arc::new(HttpQuoteProvider::new(http)?)
        }
        None => {
            log_warning!("No provider.base_url configured, using the demo provider");
            Arc::new(ScriptedProvider::demo(Duration::from_millis(args.demo_latency_ms)))
        }
    };

    info!("🚀 Starting quote refresh (policy: {})", args.policy);
    let grace_period = engine_config.debounce * 2;
    let engine = RefreshEngine::spawn(provider, engine_config);
    let mut views = engine.subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    let mut is_buy_order = false;
    let mut input_open = true;
    let mut grace_elapsed = false;
    let grace = tokio::time::sleep(Duration::ZERO);
    tokio::pin!(grace);

    loop {
        tokio::select! {
            line = lines.next_line(), if input_open => {
                match line.context("Failed to read stdin")? {
                    Some(line) => handle_line(&engine, &line, &mut is_buy_order)?,
                    None => {
                        info!("Input closed, waiting for outstanding quotes");
                        input_open = false;
                        grace.as_mut().reset(tokio::time::Instant::now() + grace_period);
                    }
                }
            }
            changed = views.changed() => {
                if changed.is_err() {
                    break;
                }
                let view = views.borrow_and_update().clone();
                let output = ViewOutput::new(&view, args.policy, is_buy_order);
                println!("{}", serde_json::to_string(&output)?);
                if !input_open && !view.is_fetching {
                    break;
                }
            }
            () = &mut grace, if !input_open && !grace_elapsed => {
                grace_elapsed = true;
                if !engine.current_view().is_fetching {
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("📡 Received shutdown signal");
                break;
            }
        }
    }

    let metrics = engine.metrics();
    info!(
        "{} Up {:.1}s: {} notifications, {} fetches, {} applied, {} superseded, {} failed",
        LogEmoji::CHART,
        metrics.uptime.as_secs_f64(),
        metrics.notifications,
        metrics.fetches_issued,
        metrics.results_applied,
        metrics.results_superseded,
        metrics.failures
    );
    engine.shutdown().await;
    log_success!("Quote refresh stopped");

    Ok(())
}

fn handle_line(engine: &RefreshEngine, line: &str, is_buy_order: &mut bool) -> Result<()> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(());
    }

    if line == "refresh" {
        engine.refresh()?;
        return Ok(());
    }

    match serde_json::from_str::<RequestSnapshot>(line) {
        Ok(snapshot) => {
            *is_buy_order = snapshot.is_buy_order;
            engine.notify(snapshot)?;
        }
        Err(e) => log_error!("Ignoring malformed snapshot: {}", e),
    }

    Ok(())
}
