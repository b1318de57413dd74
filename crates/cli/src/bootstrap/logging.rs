use anyhow::Context;
use autoptr6_domain::{Config, LogFormat};
use std::fs::OpenOptions;
use std::sync::Mutex;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// `RUST_LOG` wins over the configured level and verbosity.
pub fn init_logging(config: &Config) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.effective_log_level()));
    let registry = tracing_subscriber::registry().with(env_filter);

    let file = match &config.logging.file {
        Some(path) => Some(Mutex::new(
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file '{}'", path))?,
        )),
        None => None,
    };

    match (config.logging.format, file) {
        (LogFormat::Json, Some(file)) => registry
            .with(fmt::layer().json().with_writer(file))
            .try_init()?,
        (LogFormat::Json, None) => registry.with(fmt::layer().json()).try_init()?,
        (LogFormat::Text, Some(file)) => registry
            .with(fmt::layer().with_ansi(false).with_writer(file))
            .try_init()?,
        (LogFormat::Text, None) => registry.with(fmt::layer()).try_init()?,
    }

    Ok(())
}
