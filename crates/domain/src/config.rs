pub mod dispatcher;
pub mod dns;
pub mod env;
pub mod errors;
pub mod ipv6;
pub mod logging;
pub mod overrides;
pub mod root;
pub mod server;

pub use dispatcher::{Backpressure, DispatcherConfig};
pub use dns::DnsConfig;
pub use errors::ConfigError;
pub use ipv6::Ipv6Config;
pub use logging::{LogFormat, LoggingConfig};
pub use overrides::OverridesConfig;
pub use root::{CliOverrides, Config};
pub use server::ServerConfig;
