use super::dispatcher::{Dispatcher, Job};
use super::transport::tcp::{read_frame, write_frame};
use super::transport::udp::MAX_UDP_REQUEST_SIZE;
use super::transport::{ResponseSink, TcpResponseSink, UdpResponseSink};
use super::wire::{self, Rejection};
use autoptr6_application::ports::SnapshotStore;
use autoptr6_domain::Transport;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream, UdpSocket};
use tokio::sync::{mpsc, Semaphore};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Responses queued per TCP connection. A client that lets this fill up is
/// disconnected.
const TCP_PIPELINE_DEPTH: usize = 32;

/// Accept loops for UDP and TCP. Both decode requests and hand them to the
/// shared [`Dispatcher`]; neither resolves anything itself.
///
/// Whether a transport takes queries is read from the active snapshot on
/// every request, so a reload can switch one off without a restart.
#[derive(Clone)]
pub struct DnsServer {
    dispatcher: Arc<Dispatcher>,
    store: Arc<dyn SnapshotStore>,
    shutdown: CancellationToken,
}

impl DnsServer {
    pub fn new(
        dispatcher: Arc<Dispatcher>,
        store: Arc<dyn SnapshotStore>,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            dispatcher,
            store,
            shutdown,
        }
    }

    fn accepts(&self, transport: Transport) -> bool {
        let snapshot = self.store.current();
        match transport {
            Transport::Udp => snapshot.enable_udp,
            Transport::Tcp => snapshot.enable_tcp,
        }
    }

    pub async fn serve_udp(&self, socket: Arc<UdpSocket>) {
        let mut recv_buf = vec![0u8; MAX_UDP_REQUEST_SIZE];

        if let Ok(addr) = socket.local_addr() {
            info!(bind_address = %addr, "UDP listener ready");
        }

        loop {
            let (len, peer) = tokio::select! {
                _ = self.shutdown.cancelled() => break,
                received = socket.recv_from(&mut recv_buf) => match received {
                    Ok(received) => received,
                    Err(e) => {
                        warn!(error = %e, "UDP receive failed");
                        continue;
                    }
                },
            };

            if !self.accepts(Transport::Udp) {
                debug!(client = %peer, "UDP disabled by configuration, dropping query");
                continue;
            }

            let sink: Arc<dyn ResponseSink> =
                Arc::new(UdpResponseSink::new(Arc::clone(&socket), peer));
            self.handle_payload(&recv_buf[..len], sink).await;
        }

        debug!("UDP listener stopped");
    }

    pub async fn serve_tcp(&self, listener: TcpListener, idle_timeout: Duration, max_connections: usize) {
        let permits = Arc::new(Semaphore::new(max_connections.max(1)));

        if let Ok(addr) = listener.local_addr() {
            info!(bind_address = %addr, max_connections, "TCP listener ready");
        }

        loop {
            let (stream, peer) = tokio::select! {
                _ = self.shutdown.cancelled() => break,
                accepted = listener.accept() => match accepted {
                    Ok(accepted) => accepted,
                    Err(e) => {
                        warn!(error = %e, "TCP accept failed");
                        continue;
                    }
                },
            };

            if !self.accepts(Transport::Tcp) {
                debug!(client = %peer, "TCP disabled by configuration, closing");
                continue;
            }

            let Ok(permit) = Arc::clone(&permits).try_acquire_owned() else {
                warn!(client = %peer, "TCP connection limit reached, closing");
                continue;
            };

            let server = self.clone();
            tokio::spawn(async move {
                server.handle_connection(stream, peer, idle_timeout).await;
                drop(permit);
            });
        }

        debug!("TCP listener stopped");
    }

    async fn handle_connection(&self, stream: TcpStream, peer: SocketAddr, idle_timeout: Duration) {
        if let Err(e) = stream.set_nodelay(true) {
            debug!(client = %peer, error = %e, "Failed to set TCP_NODELAY");
        }

        let (mut reader, mut writer) = stream.into_split();
        let (tx, mut rx) = mpsc::channel::<Vec<u8>>(TCP_PIPELINE_DEPTH);
        let closed = self.shutdown.child_token();

        let writer_closed = closed.clone();
        let writer_task = tokio::spawn(async move {
            loop {
                let response = tokio::select! {
                    _ = writer_closed.cancelled() => break,
                    response = rx.recv() => match response {
                        Some(response) => response,
                        None => break,
                    },
                };
                let written = tokio::select! {
                    _ = writer_closed.cancelled() => break,
                    written = write_frame(&mut writer, &response) => written,
                };
                if let Err(e) = written {
                    debug!(client = %peer, error = %e, "TCP write failed");
                    break;
                }
            }
        });

        let sink: Arc<dyn ResponseSink> = Arc::new(TcpResponseSink::new(tx, peer, closed.clone()));

        loop {
            let frame = tokio::select! {
                _ = closed.cancelled() => break,
                read = tokio::time::timeout(idle_timeout, read_frame(&mut reader)) => match read {
                    Ok(Ok(Some(frame))) => frame,
                    Ok(Ok(None)) => break,
                    Ok(Err(e)) => {
                        debug!(client = %peer, error = %e, "Closing TCP connection");
                        break;
                    }
                    Err(_) => {
                        debug!(client = %peer, "TCP connection idle, closing");
                        break;
                    }
                },
            };

            if !self.accepts(Transport::Tcp) {
                debug!(client = %peer, "TCP disabled by configuration, closing");
                break;
            }

            self.handle_payload(&frame, Arc::clone(&sink)).await;
        }

        // The writer drains once every in-flight job has released its sink.
        // A peer that never reads gets one idle period to take the rest.
        drop(sink);
        match tokio::time::timeout(idle_timeout, writer_task).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => debug!(client = %peer, error = %e, "TCP writer ended abnormally"),
            Err(_) => {
                debug!(client = %peer, "Pending TCP responses not taken, closing");
                closed.cancel();
            }
        }
    }

    async fn handle_payload(&self, payload: &[u8], sink: Arc<dyn ResponseSink>) {
        match wire::decode_request(payload, sink.transport(), sink.peer()) {
            Ok(decoded) => {
                self.dispatcher
                    .submit(Job::new(decoded.query, decoded.message, sink))
                    .await;
            }
            Err(Rejection::Drop(reason)) => {
                debug!(client = %sink.peer(), reason, "Dropping message");
            }
            Err(Rejection::Respond { response, reason }) => {
                debug!(client = %sink.peer(), reason, "Rejecting message");
                if let Err(e) = sink.send(response).await {
                    debug!(client = %sink.peer(), error = %e, "Failed to deliver error response");
                }
            }
        }
    }
}
