use autoptr6_domain::DomainError;

/// Supplies the raw text of an override file.
pub trait OverrideSource: Send + Sync {
    fn read(&self, location: &str) -> Result<String, DomainError>;
}
