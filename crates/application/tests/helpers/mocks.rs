use autoptr6_application::ports::{OverrideSource, SnapshotSource, SnapshotStore};
use autoptr6_application::services::BuiltSnapshot;
use autoptr6_domain::{
    to_reverse_name, ConfigSnapshot, DomainError, OverrideTable, PtrQuery, QueryType,
    SubnetMatcher, Transport,
};
use std::collections::{HashMap, VecDeque};
use std::net::{Ipv6Addr, SocketAddr};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, RwLock};

pub const SUFFIX: &str = "ip6.yourdomain.com.";

pub fn client() -> SocketAddr {
    "[2001:db8:ffff::53]:40000".parse().unwrap()
}

pub fn ptr_query_for(addr: &str) -> PtrQuery {
    let addr: Ipv6Addr = addr.parse().unwrap();
    PtrQuery::new(to_reverse_name(addr), QueryType::Ptr, Transport::Udp, client())
}

pub fn snapshot_with(subnets: &[&str], overrides: &[(&str, &str)]) -> ConfigSnapshot {
    let mut table = OverrideTable::new();
    for (addr, target) in overrides {
        table.insert(addr.parse().unwrap(), *target);
    }
    ConfigSnapshot::new(SubnetMatcher::parse(subnets).unwrap(), table, SUFFIX, 3600)
}

pub struct InMemorySnapshotStore {
    inner: RwLock<Arc<ConfigSnapshot>>,
}

impl InMemorySnapshotStore {
    pub fn new(snapshot: ConfigSnapshot) -> Self {
        Self {
            inner: RwLock::new(Arc::new(snapshot)),
        }
    }
}

impl SnapshotStore for InMemorySnapshotStore {
    fn current(&self) -> Arc<ConfigSnapshot> {
        self.inner.read().unwrap().clone()
    }

    fn publish(&self, snapshot: Arc<ConfigSnapshot>) -> Arc<ConfigSnapshot> {
        std::mem::replace(&mut *self.inner.write().unwrap(), snapshot)
    }
}

#[derive(Default)]
pub struct MockOverrideSource {
    files: Mutex<HashMap<String, String>>,
    reads: AtomicUsize,
}

impl MockOverrideSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(self, location: &str, contents: &str) -> Self {
        self.files
            .lock()
            .unwrap()
            .insert(location.to_string(), contents.to_string());
        self
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

impl OverrideSource for MockOverrideSource {
    fn read(&self, location: &str) -> Result<String, DomainError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.files
            .lock()
            .unwrap()
            .get(location)
            .cloned()
            .ok_or_else(|| DomainError::IoError(format!("{}: not found", location)))
    }
}

/// Hands out queued build results in order.
#[derive(Default)]
pub struct MockSnapshotSource {
    results: Mutex<VecDeque<Result<ConfigSnapshot, DomainError>>>,
}

impl MockSnapshotSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_ok(&self, snapshot: ConfigSnapshot) {
        self.results.lock().unwrap().push_back(Ok(snapshot));
    }

    pub fn push_err(&self, error: DomainError) {
        self.results.lock().unwrap().push_back(Err(error));
    }
}

impl SnapshotSource for MockSnapshotSource {
    fn build(&self, generation: u64) -> Result<BuiltSnapshot, DomainError> {
        let next = self
            .results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(DomainError::ConfigError("no queued snapshot".to_string())))?;

        Ok(BuiltSnapshot {
            snapshot: next.with_generation(generation),
            warnings: Vec::new(),
            watched_paths: Vec::new(),
        })
    }

    fn describe(&self) -> String {
        "mock".to_string()
    }
}
