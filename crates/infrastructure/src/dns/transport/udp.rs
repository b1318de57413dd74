//! UDP responses (RFC 1035 §4.2.1). One datagram per message, no framing.

use super::ResponseSink;
use crate::dns::wire::UDP_MAX_RESPONSE;
use async_trait::async_trait;
use autoptr6_domain::{DomainError, Transport};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::UdpSocket;

/// Largest datagram read from a client.
pub const MAX_UDP_REQUEST_SIZE: usize = 4096;

pub struct UdpResponseSink {
    socket: Arc<UdpSocket>,
    peer: SocketAddr,
}

impl UdpResponseSink {
    pub fn new(socket: Arc<UdpSocket>, peer: SocketAddr) -> Self {
        Self { socket, peer }
    }
}

#[async_trait]
impl ResponseSink for UdpResponseSink {
    async fn send(&self, response: Vec<u8>) -> Result<(), DomainError> {
        self.socket
            .send_to(&response, self.peer)
            .await
            .map_err(|e| {
                DomainError::IoError(format!("Failed to send UDP response to {}: {}", self.peer, e))
            })?;
        Ok(())
    }

    fn transport(&self) -> Transport {
        Transport::Udp
    }

    fn peer(&self) -> SocketAddr {
        self.peer
    }

    fn max_response_len(&self) -> usize {
        UDP_MAX_RESPONSE
    }
}
