use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::{error, info, level_filters::LevelFilter, trace};
use tracing_subscriber::{filter, layer::SubscriberExt, util::SubscriberInitExt};

use watch_dog_sentinel::api::{spawn_api_server, ApiState};
use watch_dog_sentinel::clock::{Clock, SystemClock};
use watch_dog_sentinel::config::{read_config_file, AppConfig};
use watch_dog_sentinel::notifier::HttpNotifier;
use watch_dog_sentinel::settings::StoreSettingsProvider;
use watch_dog_sentinel::store::sqlite::SqliteStore;
use watch_dog_sentinel::sweeper::Sweeper;

#[derive(Debug, Clone, Parser)]
struct Args {
    /// Config file; every field is optional and falls back to documented defaults.
    #[arg(short, long)]
    file: Option<String>,
}

fn init(log_level: &str) {
    let level = log_level.parse().unwrap_or(LevelFilter::INFO);
    let filter = filter::Targets::new().with_targets(vec![("watch_dog_sentinel", level)]);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .pretty()
                .with_writer(std::io::stderr)
                .compact(),
        )
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = match &args.file {
        Some(path) => read_config_file(path)?,
        None => AppConfig::default(),
    };
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("invalid configuration: {e}"))?;

    init(&config.log_level);
    trace!("started with config: {config:?}");

    let store = Arc::new(SqliteStore::new(&config.db_path).await?);
    let clock = Arc::new(SystemClock);
    seed_default_settings(&store, &config, clock.now()).await?;
    let notifier = Arc::new(HttpNotifier::new());
    let settings = Arc::new(StoreSettingsProvider::new(store.clone()));

    let sweeper = Arc::new(Sweeper::new(
        store.clone(),
        notifier.clone(),
        settings.clone(),
        clock.clone(),
    ));
    spawn_sweep_task(sweeper, config.sweep_interval_seconds);

    let api_state = ApiState::new(store, notifier, settings, clock);
    let addr = spawn_api_server(config.bind_addr, api_state, config.enable_cors).await?;
    info!("watch-dog sentinel listening on http://{addr}");

    info!("press Ctrl+C to shut down");
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("received shutdown signal, exiting"),
        Err(err) => error!("unable to listen for shutdown signal: {err}"),
    }

    Ok(())
}

/// Seeds the Store's `silence_period_seconds` setting from the config file on first run, so an
/// operator-configured default cooldown actually takes effect; leaves it untouched on later
/// starts since the admin collaborator may have since changed it through the settings table
/// directly (§4.5 -- the core never writes settings itself, except for this one-time seed).
async fn seed_default_settings(store: &SqliteStore, config: &AppConfig, now: i64) -> anyhow::Result<()> {
    use watch_dog_sentinel::store::Store;

    if store.get_setting("silence_period_seconds").await?.is_none() {
        store
            .set_setting(
                "silence_period_seconds",
                &config.silence_period_seconds.to_string(),
                now,
            )
            .await?;
    }
    Ok(())
}

/// Spawns the internal periodic sweep task (§6.5). Operators who prefer an external cron/systemd
/// timer instead can hit `POST /api/tick` directly via `sentinel-tick`; both paths call the same
/// `Sweeper::sweep_once`.
fn spawn_sweep_task(
    sweeper: Arc<watch_dog_sentinel::sweeper::Sweeper<
        SqliteStore,
        HttpNotifier,
        StoreSettingsProvider<SqliteStore>,
        SystemClock,
    >>,
    interval_seconds: u64,
) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(interval_seconds));
        loop {
            ticker.tick().await;
            let summary = sweeper.sweep_once().await;
            info!(
                "sweep complete: checked={} dead={} alerts={} pruned={}",
                summary.checked, summary.marked_dead, summary.alerts_sent, summary.logs_pruned
            );
        }
    });
}
