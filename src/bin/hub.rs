use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use queue_monitoring::{
    actors::{messages::CycleEvent, refresh::RefreshHandle},
    config::{Config, read_config_file},
    service::QueueMonitor,
};
use tokio::sync::broadcast;
use tracing::{debug, error, info, level_filters::LevelFilter, trace, warn};
use tracing_subscriber::{filter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Clone, Parser)]
struct Args {
    /// Config file
    #[arg(short)]
    file: String,

    /// Log level for the hub and the monitoring library
    #[arg(long, default_value = "info")]
    log_level: LevelFilter,
}

fn init(level: LevelFilter) {
    let filter = filter::Targets::new()
        .with_targets(vec![("queue_monitoring", level), ("queue_hub", level)]);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .compact()
                .with_ansi(false),
        )
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let args = Args::parse();
    init(args.log_level);
    trace!("started with args: {args:?}");

    let config = read_config_file(&args.file)
        .with_context(|| format!("failed to load configuration from {}", args.file))?;

    let monitor =
        Arc::new(QueueMonitor::from_config(&config).context("invalid endpoint configuration")?);

    let status = monitor.status();
    info!(
        "monitoring {} endpoints via '{}' admin client",
        status.endpoint_count, status.admin_client
    );
    if !status.admin_available {
        warn!("no admin client binding available, every endpoint will report as unreachable");
    }

    let (cycle_tx, _) = broadcast::channel(64);
    let refresh = spawn_refresh(&config, monitor.clone(), cycle_tx.clone());

    #[cfg(feature = "api")]
    spawn_api(&config, monitor.clone(), &cycle_tx).await?;

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for shutdown signal")?;
    info!("shutdown requested");

    if let Some(refresh) = refresh {
        if let Err(e) = refresh.shutdown().await {
            error!("failed to stop refresh actor: {e:#}");
        }
    }
    monitor.shutdown();

    debug!("hub stopped");
    Ok(())
}

fn spawn_refresh(
    config: &Config,
    monitor: Arc<QueueMonitor>,
    cycle_tx: broadcast::Sender<CycleEvent>,
) -> Option<RefreshHandle> {
    let Some(refresh) = &config.refresh else {
        debug!("periodic refresh disabled");
        return None;
    };

    info!("refreshing alerts every {}s", refresh.interval_secs);
    Some(RefreshHandle::spawn(monitor, refresh.interval_secs, cycle_tx))
}

#[cfg(feature = "api")]
async fn spawn_api(
    config: &Config,
    monitor: Arc<QueueMonitor>,
    cycle_tx: &broadcast::Sender<CycleEvent>,
) -> anyhow::Result<()> {
    use queue_monitoring::api::{ApiConfig, ApiState, spawn_api_server};

    let state = ApiState::new(monitor);
    state.cycles.clone().follow(cycle_tx.subscribe());

    let settings = config.api.clone().with_env_override();
    let addr = spawn_api_server(ApiConfig::from(&settings), state)
        .await
        .context("failed to start API server")?;
    info!("API available at http://{addr}/api/v1");

    Ok(())
}
