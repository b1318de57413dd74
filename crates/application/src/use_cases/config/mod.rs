mod reload;

pub use reload::{ReloadConfigUseCase, ReloadOutcome};
