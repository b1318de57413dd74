use crate::ports::{SnapshotSource, SnapshotStore};
use autoptr6_domain::DomainError;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tracing::{error, info, instrument};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReloadOutcome {
    pub generation: u64,
    pub subnets: usize,
    pub overrides: usize,
    pub skipped_lines: usize,
    /// Files to watch for the next change.
    pub watched_paths: Vec<PathBuf>,
}

/// Rebuilds the snapshot from its sources and publishes it atomically.
pub struct ReloadConfigUseCase {
    source: Arc<dyn SnapshotSource>,
    store: Arc<dyn SnapshotStore>,
    reload_lock: Mutex<()>,
}

impl ReloadConfigUseCase {
    pub fn new(source: Arc<dyn SnapshotSource>, store: Arc<dyn SnapshotStore>) -> Self {
        Self {
            source,
            store,
            reload_lock: Mutex::new(()),
        }
    }

    /// On failure nothing is published and the active snapshot keeps serving.
    #[instrument(skip(self))]
    pub fn execute(&self) -> Result<ReloadOutcome, DomainError> {
        // One reload at a time so generations stay ordered.
        let _guard = self
            .reload_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let next_generation = self.store.current().generation + 1;

        let built = match self.source.build(next_generation) {
            Ok(built) => built,
            Err(e) => {
                error!(
                    source = %self.source.describe(),
                    error = %e,
                    "Reload rejected, keeping active configuration"
                );
                return Err(e);
            }
        };

        let outcome = ReloadOutcome {
            generation: built.snapshot.generation,
            subnets: built.snapshot.subnets.len(),
            overrides: built.snapshot.overrides.len(),
            skipped_lines: built.warnings.len(),
            watched_paths: built.watched_paths,
        };

        let previous = self.store.publish(Arc::new(built.snapshot));

        info!(
            source = %self.source.describe(),
            previous_generation = previous.generation,
            generation = outcome.generation,
            subnets = outcome.subnets,
            overrides = outcome.overrides,
            skipped_lines = outcome.skipped_lines,
            "Configuration reloaded"
        );

        Ok(outcome)
    }
}
