use autoptr6_domain::{DomainError, PtrAnswer, PtrQuery};

/// Synchronous resolution of one query against the active configuration.
pub trait PtrResolver: Send + Sync {
    fn resolve(&self, query: &PtrQuery) -> Result<PtrAnswer, DomainError>;
}
