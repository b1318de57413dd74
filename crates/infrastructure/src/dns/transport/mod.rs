pub mod tcp;
pub mod udp;

use async_trait::async_trait;
use autoptr6_domain::{DomainError, Transport};
use std::net::SocketAddr;

pub use tcp::TcpResponseSink;
pub use udp::UdpResponseSink;

/// Where a worker delivers the encoded response for one query.
///
/// Each transport applies its own framing and size limit, so workers only
/// ever deal in bare DNS messages.
#[async_trait]
pub trait ResponseSink: Send + Sync {
    async fn send(&self, response: Vec<u8>) -> Result<(), DomainError>;

    fn transport(&self) -> Transport;

    fn peer(&self) -> SocketAddr;

    /// Responses above this size are sent truncated.
    fn max_response_len(&self) -> usize;
}
