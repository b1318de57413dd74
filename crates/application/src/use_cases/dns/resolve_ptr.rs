use crate::ports::{PtrResolver, SnapshotStore};
use autoptr6_domain::{
    parse_reverse_name, synthesize_name, AnswerSource, ConfigSnapshot, DomainError, PtrAnswer,
    PtrQuery, QueryType,
};
use std::sync::Arc;
use tracing::debug;

/// Resolution pipeline for one reverse query.
pub struct ResolvePtrUseCase {
    store: Arc<dyn SnapshotStore>,
}

impl ResolvePtrUseCase {
    pub fn new(store: Arc<dyn SnapshotStore>) -> Self {
        Self { store }
    }

    /// Resolves against the snapshot active right now. The snapshot is
    /// loaded once, so a concurrent reload cannot mix old and new state.
    pub fn execute(&self, query: &PtrQuery) -> Result<PtrAnswer, DomainError> {
        let snapshot = self.store.current();
        Self::resolve_in(query, &snapshot)
    }

    /// First matching rule wins: type check, name parse, ownership,
    /// override, synthesis.
    pub fn resolve_in(query: &PtrQuery, snapshot: &ConfigSnapshot) -> Result<PtrAnswer, DomainError> {
        if query.query_type != QueryType::Ptr {
            return Err(DomainError::UnsupportedRecordType(query.query_type.to_string()));
        }

        let addr = parse_reverse_name(&query.name)?;

        let Some(subnet) = snapshot.subnets.first_match(addr) else {
            debug!(address = %addr, "Address not in any configured subnet");
            return Err(DomainError::NoMatch(addr));
        };

        if let Some(target) = snapshot.overrides.get(addr) {
            debug!(address = %addr, subnet = %subnet, hostname = target, "Override hit");
            return Ok(PtrAnswer {
                hostname: Arc::from(target),
                ttl: snapshot.ttl,
                source: AnswerSource::Override,
            });
        }

        let hostname = synthesize_name(addr, &snapshot.domain_suffix);
        debug!(address = %addr, subnet = %subnet, hostname = %hostname, "Synthesized PTR");

        Ok(PtrAnswer {
            hostname: Arc::from(hostname),
            ttl: snapshot.ttl,
            source: AnswerSource::Synthesized,
        })
    }

    pub fn snapshot(&self) -> Arc<ConfigSnapshot> {
        self.store.current()
    }
}

impl PtrResolver for ResolvePtrUseCase {
    fn resolve(&self, query: &PtrQuery) -> Result<PtrAnswer, DomainError> {
        self.execute(query)
    }
}
