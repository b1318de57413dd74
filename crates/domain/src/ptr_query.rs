use std::fmt;
use std::net::SocketAddr;
use std::sync::Arc;

/// The record types this server distinguishes: PTR and everything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryType {
    Ptr,
    Other(u16),
}

impl QueryType {
    pub const PTR_CODE: u16 = 12;

    pub fn from_code(code: u16) -> Self {
        if code == Self::PTR_CODE {
            QueryType::Ptr
        } else {
            QueryType::Other(code)
        }
    }

    pub fn code(&self) -> u16 {
        match self {
            QueryType::Ptr => Self::PTR_CODE,
            QueryType::Other(code) => *code,
        }
    }
}

impl fmt::Display for QueryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryType::Ptr => write!(f, "PTR"),
            QueryType::Other(code) => write!(f, "TYPE{}", code),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transport {
    Udp,
    Tcp,
}

impl Transport {
    pub fn as_str(&self) -> &'static str {
        match self {
            Transport::Udp => "UDP",
            Transport::Tcp => "TCP",
        }
    }
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One decoded question, as handed over by a transport.
#[derive(Debug, Clone)]
pub struct PtrQuery {
    pub name: Arc<str>,
    pub query_type: QueryType,
    pub transport: Transport,
    pub client: SocketAddr,
}

impl PtrQuery {
    pub fn new(
        name: impl Into<Arc<str>>,
        query_type: QueryType,
        transport: Transport,
        client: SocketAddr,
    ) -> Self {
        Self {
            name: name.into(),
            query_type,
            transport,
            client,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerSource {
    Override,
    Synthesized,
}

impl AnswerSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnswerSource::Override => "override",
            AnswerSource::Synthesized => "synthesized",
        }
    }
}

/// Successful resolution of a [`PtrQuery`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PtrAnswer {
    pub hostname: Arc<str>,
    pub ttl: u32,
    pub source: AnswerSource,
}
