//! autoptr6 Domain Layer
pub mod config;
pub mod errors;
pub mod override_table;
pub mod ptr_query;
pub mod reverse_name;
pub mod snapshot;
pub mod subnet;

pub use config::{Backpressure, CliOverrides, Config, ConfigError, LogFormat};
pub use errors::DomainError;
pub use override_table::{OverrideLoad, OverrideLoadWarning, OverrideTable};
pub use ptr_query::{AnswerSource, PtrAnswer, PtrQuery, QueryType, Transport};
pub use reverse_name::{
    normalize_suffix, parse_reverse_name, synthesize_name, to_reverse_name, REVERSE_ZONE,
};
pub use snapshot::ConfigSnapshot;
pub use subnet::{Subnet, SubnetMatcher};
