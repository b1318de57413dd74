use async_trait::async_trait;
use autoptr6_application::ports::PtrResolver;
use autoptr6_domain::{AnswerSource, DomainError, PtrAnswer, PtrQuery, Transport};
use autoptr6_infrastructure::dns::ResponseSink;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;

use super::client;

/// Collects every response a worker delivers.
pub struct CapturingSink {
    tx: mpsc::UnboundedSender<Vec<u8>>,
    max_len: usize,
}

impl CapturingSink {
    pub fn new() -> (Arc<Self>, mpsc::UnboundedReceiver<Vec<u8>>) {
        Self::with_max_len(512)
    }

    pub fn with_max_len(max_len: usize) -> (Arc<Self>, mpsc::UnboundedReceiver<Vec<u8>>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Arc::new(Self { tx, max_len }), rx)
    }
}

#[async_trait]
impl ResponseSink for CapturingSink {
    async fn send(&self, response: Vec<u8>) -> Result<(), DomainError> {
        self.tx
            .send(response)
            .map_err(|_| DomainError::IoError("receiver gone".to_string()))
    }

    fn transport(&self) -> Transport {
        Transport::Udp
    }

    fn peer(&self) -> SocketAddr {
        client()
    }

    fn max_response_len(&self) -> usize {
        self.max_len
    }
}

/// Answers every query with a fixed hostname.
pub struct FixedResolver {
    pub hostname: &'static str,
    pub calls: AtomicUsize,
}

impl FixedResolver {
    pub fn new(hostname: &'static str) -> Arc<Self> {
        Arc::new(Self {
            hostname,
            calls: AtomicUsize::new(0),
        })
    }
}

impl PtrResolver for FixedResolver {
    fn resolve(&self, _query: &PtrQuery) -> Result<PtrAnswer, DomainError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(PtrAnswer {
            hostname: Arc::from(self.hostname),
            ttl: 60,
            source: AnswerSource::Synthesized,
        })
    }
}

/// Panics on names containing `marker`, answers everything else.
pub struct PanickingResolver {
    pub marker: &'static str,
}

impl PtrResolver for PanickingResolver {
    fn resolve(&self, query: &PtrQuery) -> Result<PtrAnswer, DomainError> {
        if query.name.contains(self.marker) {
            panic!("resolver exploded on {}", query.name);
        }
        Ok(PtrAnswer {
            hostname: Arc::from("ok.example.net."),
            ttl: 60,
            source: AnswerSource::Synthesized,
        })
    }
}

/// Blocks inside `resolve` while the test holds `gate`, and counts how
/// many workers reached it.
pub struct GatedResolver {
    pub gate: Mutex<()>,
    pub entered: AtomicUsize,
}

impl GatedResolver {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            gate: Mutex::new(()),
            entered: AtomicUsize::new(0),
        })
    }

    pub async fn wait_entered(&self, count: usize) {
        assert!(
            wait_until(|| self.entered.load(Ordering::SeqCst) >= count).await,
            "workers never reached the resolver"
        );
    }
}

impl PtrResolver for GatedResolver {
    fn resolve(&self, _query: &PtrQuery) -> Result<PtrAnswer, DomainError> {
        self.entered.fetch_add(1, Ordering::SeqCst);
        let _open = self.gate.lock().unwrap_or_else(|p| p.into_inner());
        Ok(PtrAnswer {
            hostname: Arc::from("gated.example.net."),
            ttl: 60,
            source: AnswerSource::Synthesized,
        })
    }
}

/// Polls `condition` until it holds or two seconds pass.
pub async fn wait_until(mut condition: impl FnMut() -> bool) -> bool {
    for _ in 0..200 {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    condition()
}
