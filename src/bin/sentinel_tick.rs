//! Thin CLI that drives the Sweeper over HTTP (`POST /api/tick`), for operators who prefer an
//! external cron/systemd timer over `sentinel-hub`'s internal periodic task (§6.5).

use clap::Parser;
use tracing::{error, info, level_filters::LevelFilter};
use tracing_subscriber::{filter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Clone, Parser)]
struct Args {
    /// Base URL of a running sentinel-hub, e.g. http://127.0.0.1:8080
    #[arg(long, default_value = "http://127.0.0.1:8080")]
    url: String,

    /// Request timeout in seconds.
    #[arg(long, default_value_t = 10)]
    timeout_seconds: u64,
}

fn init() {
    let filter = filter::Targets::new().with_targets(vec![("sentinel_tick", LevelFilter::INFO)]);
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().compact().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init();
    let args = Args::parse();

    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(args.timeout_seconds))
        .build()?;

    let endpoint = format!("{}/api/tick", args.url.trim_end_matches('/'));
    let response = client.post(&endpoint).send().await?;

    if !response.status().is_success() {
        error!("tick request failed with status {}", response.status());
        std::process::exit(1);
    }

    let body: serde_json::Value = response.json().await?;
    info!("sweep complete: {body}");
    Ok(())
}
