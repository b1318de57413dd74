#![allow(dead_code)]

use autoptr6_application::ports::{SnapshotSource, SnapshotStore};
use autoptr6_application::services::BuiltSnapshot;
use autoptr6_domain::{ConfigSnapshot, DomainError, OverrideTable, SubnetMatcher};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, RwLock};

pub fn snapshot(generation: u64) -> ConfigSnapshot {
    ConfigSnapshot::new(
        SubnetMatcher::parse(["2001:db8::/32"]).unwrap(),
        OverrideTable::new(),
        "ip6.example.net.",
        300,
    )
    .with_generation(generation)
}

pub struct InMemorySnapshotStore {
    current: RwLock<Arc<ConfigSnapshot>>,
}

impl InMemorySnapshotStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            current: RwLock::new(Arc::new(snapshot(0))),
        })
    }
}

impl SnapshotStore for InMemorySnapshotStore {
    fn current(&self) -> Arc<ConfigSnapshot> {
        self.current.read().unwrap().clone()
    }

    fn publish(&self, snapshot: Arc<ConfigSnapshot>) -> Arc<ConfigSnapshot> {
        std::mem::replace(&mut *self.current.write().unwrap(), snapshot)
    }
}

pub struct CountingSnapshotSource {
    builds: AtomicUsize,
    should_fail: AtomicBool,
    watched_paths: Mutex<Vec<PathBuf>>,
}

impl CountingSnapshotSource {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            builds: AtomicUsize::new(0),
            should_fail: AtomicBool::new(false),
            watched_paths: Mutex::new(Vec::new()),
        })
    }

    /// Paths reported by every later successful build.
    pub fn set_watched_paths(&self, paths: Vec<PathBuf>) {
        *self.watched_paths.lock().unwrap() = paths;
    }

    pub fn build_count(&self) -> usize {
        self.builds.load(Ordering::SeqCst)
    }

    pub fn set_should_fail(&self, fail: bool) {
        self.should_fail.store(fail, Ordering::SeqCst);
    }
}

impl SnapshotSource for CountingSnapshotSource {
    fn build(&self, generation: u64) -> Result<BuiltSnapshot, DomainError> {
        self.builds.fetch_add(1, Ordering::SeqCst);
        if self.should_fail.load(Ordering::SeqCst) {
            return Err(DomainError::ConfigError("broken config".to_string()));
        }
        Ok(BuiltSnapshot {
            snapshot: snapshot(generation),
            warnings: Vec::new(),
            watched_paths: self.watched_paths.lock().unwrap().clone(),
        })
    }

    fn describe(&self) -> String {
        "counting".to_string()
    }
}
