use autoptr6_application::ports::{SnapshotSource, SnapshotStore};
use autoptr6_domain::{CliOverrides, LogFormat};
use autoptr6_infrastructure::config::{FileOverrideSource, FileSnapshotSource};
use autoptr6_jobs::ConfigReloadJob;
use clap::{ArgAction, Parser};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

mod bootstrap;
mod di;
mod server;

#[derive(Parser)]
#[command(name = "autoptr6")]
#[command(version)]
#[command(about = "autoptr6 - Authoritative IPv6 reverse DNS with synthesized PTR answers")]
struct Cli {
    /// Configuration file path
    #[arg(short = 'c', long, value_name = "FILE")]
    config: Option<String>,

    /// DNS port
    #[arg(short = 'p', long)]
    port: Option<u16>,

    /// Bind address
    #[arg(short = 'b', long)]
    bind: Option<String>,

    /// Serve over UDP
    #[arg(long, conflicts_with = "no_udp")]
    udp: bool,

    #[arg(long)]
    no_udp: bool,

    /// Serve over TCP
    #[arg(long, conflicts_with = "no_tcp")]
    tcp: bool,

    #[arg(long)]
    no_tcp: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short = 'v', long, action = ArgAction::Count)]
    verbose: u8,

    /// TTL of PTR answers in seconds
    #[arg(long)]
    ttl: Option<u32>,

    /// Suffix appended to synthesized names
    #[arg(short = 'd', long)]
    domain_suffix: Option<String>,

    /// Concurrent resolver workers
    #[arg(short = 'w', long)]
    max_workers: Option<usize>,

    /// Owned prefixes, comma separated (2001:db8:1::/48,...)
    #[arg(short = 's', long, value_delimiter = ',')]
    subnets: Option<Vec<String>>,

    /// Override file path
    #[arg(short = 'o', long, value_name = "FILE")]
    overrides: Option<String>,

    /// Ignore the override file
    #[arg(long)]
    no_custom_overrides: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Log format (text, json)
    #[arg(long)]
    log_format: Option<LogFormat>,

    /// Append logs to this file instead of stdout
    #[arg(long, value_name = "FILE")]
    log_file: Option<String>,
}

impl Cli {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            port: self.port,
            bind_address: self.bind.clone(),
            enable_udp: toggle(self.udp, self.no_udp),
            enable_tcp: toggle(self.tcp, self.no_tcp),
            verbose: (self.verbose > 0).then_some(self.verbose),
            ttl: self.ttl,
            domain_suffix: self.domain_suffix.clone(),
            max_workers: self.max_workers,
            subnets: self.subnets.clone(),
            overrides_file: self.overrides.clone(),
            use_custom_overrides: self.no_custom_overrides.then_some(false),
            log_level: self.log_level.clone(),
            log_format: self.log_format,
            log_file: self.log_file.clone(),
        }
    }
}

fn toggle(on: bool, off: bool) -> Option<bool> {
    match (on, off) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let source = Arc::new(FileSnapshotSource::new(
        cli.config.clone(),
        cli.overrides(),
        Arc::new(FileOverrideSource::new()),
    ));

    let config = bootstrap::load_config(&source)?;

    bootstrap::init_logging(&config)?;

    let shutdown = CancellationToken::new();
    let services = di::Services::new(&config, source.clone(), shutdown.clone())?;

    bootstrap::log_startup(&config, &services.store.current(), &source.describe());

    let reload_job = ConfigReloadJob::new(services.reload.clone())
        .with_watched_paths(source.watched_paths(&config))
        .with_cancellation(shutdown.clone());
    Arc::new(reload_job).start().await;

    let listeners = server::start_dns_server(&config, services.dns_server.clone())?;

    server::shutdown_signal().await;
    info!("Shutdown requested, stopping listeners");
    shutdown.cancel();

    for result in futures::future::join_all(listeners).await {
        if let Err(e) = result {
            error!(error = %e, "Listener task ended abnormally");
        }
    }
    services.dispatcher.join().await;

    let stats = services.dispatcher.stats();
    info!(
        submitted = stats.submitted,
        completed = stats.completed,
        rejected = stats.rejected,
        dropped = stats.dropped,
        expired = stats.expired,
        faults = stats.faults,
        "Server shutdown complete"
    );
    Ok(())
}
