use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use stackwatch::collector::Collector;
use stackwatch::config::{RefreshPolicy, StackwatchConfig};
use stackwatch::render;
use stackwatch::server::SnapshotServer;

#[derive(Parser, Debug)]
#[command(name = "stackwatch")]
#[command(about = "Health and completion snapshot server for a local development stack")]
struct Args {
    /// Path to a config file; STACKWATCH_* environment variables override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listen address override (host:port)
    #[arg(short, long)]
    listen: Option<String>,

    /// Refresh policy override: on-demand or interval
    #[arg(long)]
    refresh: Option<RefreshPolicy>,

    /// Refresh period override in seconds (interval policy)
    #[arg(long)]
    period: Option<u64>,

    /// Build one snapshot, print it as JSON and exit
    #[arg(long)]
    oneshot: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("stackwatch=info")),
        )
        .init();

    let args = Args::parse();

    let mut config = StackwatchConfig::load(args.config.as_deref())?;
    if let Some(listen) = args.listen {
        config.listen_addr = listen;
    }
    if let Some(policy) = args.refresh {
        config.refresh.policy = policy;
    }
    if let Some(period) = args.period {
        config.refresh.period_secs = period;
    }

    let collector = Arc::new(Collector::from_config(&config));

    if args.oneshot {
        let snapshot = collector.collect().await;
        println!("{}", render::render_json(&snapshot));
        return Ok(());
    }

    let server = SnapshotServer::new(collector, config.refresh.policy);

    let _refresh_handle = match config.refresh.policy {
        RefreshPolicy::Interval => {
            info!(period_secs = config.refresh.period_secs, "starting background refresh");
            Some(server.start_refresh_loop(config.refresh.period()))
        }
        RefreshPolicy::OnDemand => None,
    };

    tokio::select! {
        result = server.serve(&config.listen_addr) => {
            result.map_err(|e| anyhow::anyhow!(e))?;
        }
        _ = tokio::signal::ctrl_c() => {
            // In-flight probes are read-only; abandon them rather than wait.
            info!("shutting down");
        }
    }

    Ok(())
}
