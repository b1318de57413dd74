mod logging;

use anyhow::Context;
use autoptr6_domain::{Config, ConfigSnapshot};
use autoptr6_infrastructure::config::FileSnapshotSource;
use tracing::info;

pub use logging::init_logging;

pub fn load_config(source: &FileSnapshotSource) -> anyhow::Result<Config> {
    source
        .load_config()
        .context("Failed to load configuration")
}

pub fn log_startup(config: &Config, snapshot: &ConfigSnapshot, config_source: &str) {
    let subnets: Vec<String> = snapshot
        .subnets
        .subnets()
        .iter()
        .map(ToString::to_string)
        .collect();

    info!(
        version = env!("CARGO_PKG_VERSION"),
        config = config_source,
        "Starting autoptr6"
    );
    info!(
        bind_address = %config.server.bind_address,
        port = config.server.port,
        udp = snapshot.enable_udp,
        tcp = snapshot.enable_tcp,
        "Listeners"
    );
    info!(
        subnets = %subnets.join(", "),
        domain_suffix = %snapshot.domain_suffix,
        ttl = snapshot.ttl,
        overrides = snapshot.overrides.len(),
        custom_overrides = config.overrides.use_custom,
        "Answer configuration"
    );
    info!(
        max_workers = config.dispatcher.max_workers,
        queue_depth = config.dispatcher.queue_depth,
        backpressure = ?config.dispatcher.backpressure,
        "Dispatcher"
    );
}
