// roomwatchd: watches the configured actor's reports and logs status alerts.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use roomwatch_daemon::{
    config::DaemonConfig,
    sink::TracingSink,
    source::HttpWatchSource,
    watch::{start_watching, Actor},
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "roomwatchd", about = "Alerts you when someone picks up or resolves your report")]
struct Cli {
    /// Config file (default: ~/.roomwatch/config.toml).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Endpoint listing the actor's entities.
    #[arg(long)]
    source_url: Option<String>,

    #[arg(long)]
    actor_id: Option<String>,

    #[arg(long)]
    actor_name: Option<String>,

    #[arg(long)]
    actor_role: Option<String>,

    #[arg(long)]
    poll_interval_ms: Option<u64>,

    /// Log filter used when RUST_LOG is unset.
    #[arg(long, default_value = "info")]
    log_filter: String,
}

impl Cli {
    fn load_config(&self) -> anyhow::Result<DaemonConfig> {
        let mut config = match &self.config {
            Some(path) => DaemonConfig::load_from(path)
                .with_context(|| format!("failed to load config from {}", path.display()))?,
            None => DaemonConfig::load().context("failed to load ~/.roomwatch/config.toml")?,
        };
        self.apply_overrides(&mut config);
        Ok(config)
    }

    fn apply_overrides(&self, config: &mut DaemonConfig) {
        if let Some(source_url) = &self.source_url {
            config.source_url = Some(source_url.clone());
        }
        if let Some(poll_interval_ms) = self.poll_interval_ms {
            config.poll_interval_ms = poll_interval_ms;
        }
        if self.actor_id.is_some() || self.actor_name.is_some() || self.actor_role.is_some() {
            let actor = config.actor.get_or_insert_with(Actor::default);
            if let Some(id) = &self.actor_id {
                actor.id = id.clone();
            }
            if let Some(name) = &self.actor_name {
                actor.name = name.clone();
            }
            if let Some(role) = &self.actor_role {
                actor.role = role.clone();
            }
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_filter);

    let config = cli.load_config()?;
    let actor = config.actor()?.clone();
    let endpoint = config.source_endpoint()?;
    let source = HttpWatchSource::new(endpoint.clone()).context("failed to build HTTP client")?;

    let handle =
        start_watching(config.watch_config(), actor.clone(), config.policy(), source, TracingSink);
    if !handle.is_active() {
        warn!(
            actor = %actor.id,
            role = %actor.role,
            eligible_roles = ?config.eligible_roles,
            "actor role is not eligible for status alerts; exiting"
        );
        return Ok(());
    }

    info!(actor = %actor.id, source = %endpoint, "roomwatchd running; Ctrl+C to stop");
    tokio::signal::ctrl_c().await.context("failed to listen for Ctrl+C")?;

    info!("shutdown signal received");
    handle.shutdown().await;
    Ok(())
}

fn init_tracing(fallback: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(fallback))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
