//! TCP responses (RFC 1035 §4.2.2). Every message carries a two byte
//! big-endian length prefix.

use super::ResponseSink;
use async_trait::async_trait;
use autoptr6_domain::{DomainError, Transport};
use std::net::SocketAddr;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

pub const MAX_TCP_MESSAGE_SIZE: usize = 65535;

/// Hands responses to the connection's writer task.
///
/// Never waits for the writer. When the client stops reading and the
/// pipeline fills up, the response is discarded and `closed` is cancelled so
/// the connection gets torn down.
#[derive(Clone)]
pub struct TcpResponseSink {
    tx: mpsc::Sender<Vec<u8>>,
    peer: SocketAddr,
    closed: CancellationToken,
}

impl TcpResponseSink {
    pub fn new(tx: mpsc::Sender<Vec<u8>>, peer: SocketAddr, closed: CancellationToken) -> Self {
        Self { tx, peer, closed }
    }
}

#[async_trait]
impl ResponseSink for TcpResponseSink {
    async fn send(&self, response: Vec<u8>) -> Result<(), DomainError> {
        match self.tx.try_send(response) {
            Ok(()) => Ok(()),
            Err(mpsc::error::TrySendError::Full(_)) => {
                debug!(client = %self.peer, "TCP client not reading responses, closing");
                self.closed.cancel();
                Err(DomainError::IoError(format!(
                    "TCP pipeline to {} full, response discarded",
                    self.peer
                )))
            }
            Err(mpsc::error::TrySendError::Closed(_)) => Err(DomainError::IoError(format!(
                "TCP connection to {} already closed",
                self.peer
            ))),
        }
    }

    fn transport(&self) -> Transport {
        Transport::Tcp
    }

    fn peer(&self) -> SocketAddr {
        self.peer
    }

    fn max_response_len(&self) -> usize {
        MAX_TCP_MESSAGE_SIZE
    }
}

pub async fn write_frame<S>(stream: &mut S, message: &[u8]) -> Result<(), DomainError>
where
    S: AsyncWriteExt + Unpin,
{
    let length = u16::try_from(message.len()).map_err(|_| {
        DomainError::IoError(format!(
            "Message too large for TCP: {} bytes (max {})",
            message.len(),
            MAX_TCP_MESSAGE_SIZE
        ))
    })?;

    stream
        .write_all(&length.to_be_bytes())
        .await
        .map_err(|e| DomainError::IoError(format!("Failed to write length prefix: {}", e)))?;
    stream
        .write_all(message)
        .await
        .map_err(|e| DomainError::IoError(format!("Failed to write DNS message: {}", e)))?;
    stream
        .flush()
        .await
        .map_err(|e| DomainError::IoError(format!("Failed to flush stream: {}", e)))?;

    Ok(())
}

/// Reads one framed message. `Ok(None)` means the peer closed the
/// connection between messages.
pub async fn read_frame<S>(stream: &mut S) -> Result<Option<Vec<u8>>, DomainError>
where
    S: AsyncReadExt + Unpin,
{
    let mut len_buf = [0u8; 2];
    match stream.read_exact(&mut len_buf).await {
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(None),
        Err(e) => {
            return Err(DomainError::IoError(format!(
                "Failed to read message length: {}",
                e
            )))
        }
    }

    let message_len = u16::from_be_bytes(len_buf) as usize;
    if message_len == 0 {
        return Err(DomainError::MalformedQuery(
            "Zero-length TCP frame".to_string(),
        ));
    }

    let mut message = vec![0u8; message_len];
    stream
        .read_exact(&mut message)
        .await
        .map_err(|e| DomainError::IoError(format!("Failed to read message body: {}", e)))?;

    Ok(Some(message))
}
