pub mod config;
pub mod dns;

pub use config::{ReloadConfigUseCase, ReloadOutcome};
pub use dns::ResolvePtrUseCase;
