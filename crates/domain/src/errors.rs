use std::net::Ipv6Addr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Unsupported record type: {0}")]
    UnsupportedRecordType(String),

    #[error("Malformed reverse query: {0}")]
    MalformedQuery(String),

    #[error("Address {0} is outside all configured subnets")]
    NoMatch(Ipv6Addr),

    #[error("Internal fault while resolving query: {0}")]
    InternalFault(String),

    #[error("Invalid subnet: {0}")]
    InvalidSubnet(String),

    #[error("Invalid domain name: {0}")]
    InvalidDomainName(String),

    #[error("Query queue is full")]
    QueueFull,

    #[error("I/O error: {0}")]
    IoError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl DomainError {
    /// Stable short label used in structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            DomainError::UnsupportedRecordType(_) => "unsupported",
            DomainError::MalformedQuery(_) => "malformed_query",
            DomainError::NoMatch(_) => "no_match",
            DomainError::InternalFault(_) => "internal_fault",
            DomainError::InvalidSubnet(_) => "invalid_subnet",
            DomainError::InvalidDomainName(_) => "invalid_domain_name",
            DomainError::QueueFull => "queue_full",
            DomainError::IoError(_) => "io",
            DomainError::ConfigError(_) => "config",
        }
    }
}
