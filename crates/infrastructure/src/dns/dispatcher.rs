use super::transport::ResponseSink;
use super::wire;
use autoptr6_application::ports::PtrResolver;
use autoptr6_domain::config::DispatcherConfig;
use autoptr6_domain::{Backpressure, DomainError, PtrAnswer, PtrQuery};
use hickory_proto::op::Message;
use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// One accepted query waiting for a worker.
pub struct Job {
    pub query: PtrQuery,
    pub request: Message,
    pub sink: Arc<dyn ResponseSink>,
    pub enqueued_at: Instant,
}

impl Job {
    pub fn new(query: PtrQuery, request: Message, sink: Arc<dyn ResponseSink>) -> Self {
        Self {
            query,
            request,
            sink,
            enqueued_at: Instant::now(),
        }
    }
}

/// What happened to a submitted job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Queued,
    /// Queue full, REFUSED was sent.
    Rejected,
    /// Queue full, the query was discarded.
    Dropped,
    /// Waited for a slot until the deadline passed.
    TimedOut,
    /// The dispatcher is shutting down.
    Closed,
}

#[derive(Debug, Default)]
pub struct DispatcherStats {
    submitted: AtomicU64,
    completed: AtomicU64,
    rejected: AtomicU64,
    dropped: AtomicU64,
    expired: AtomicU64,
    faults: AtomicU64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatcherCounters {
    pub submitted: u64,
    pub completed: u64,
    pub rejected: u64,
    pub dropped: u64,
    pub expired: u64,
    pub faults: u64,
}

impl DispatcherStats {
    pub fn snapshot(&self) -> DispatcherCounters {
        DispatcherCounters {
            submitted: self.submitted.load(Ordering::Relaxed),
            completed: self.completed.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
            expired: self.expired.load(Ordering::Relaxed),
            faults: self.faults.load(Ordering::Relaxed),
        }
    }
}

/// Bounded queue in front of a fixed pool of resolver workers.
///
/// At most `max_workers` queries are resolved at once; up to `queue_depth`
/// more wait in line. A failure or panic while resolving one query becomes
/// that query's SERVFAIL and never reaches another.
pub struct Dispatcher {
    tx: mpsc::Sender<Job>,
    backpressure: Backpressure,
    deadline: Duration,
    stats: Arc<DispatcherStats>,
    workers: std::sync::Mutex<Vec<JoinHandle<()>>>,
}

impl Dispatcher {
    pub fn start(
        resolver: Arc<dyn PtrResolver>,
        config: &DispatcherConfig,
        shutdown: CancellationToken,
    ) -> Arc<Self> {
        let max_workers = config.max_workers.max(1);
        let (tx, rx) = mpsc::channel::<Job>(config.queue_depth.max(1));
        let rx = Arc::new(Mutex::new(rx));
        let stats = Arc::new(DispatcherStats::default());
        let deadline = Duration::from_millis(config.query_timeout_ms);

        let workers = (0..max_workers)
            .map(|id| {
                tokio::spawn(worker_loop(
                    id,
                    Arc::clone(&rx),
                    Arc::clone(&resolver),
                    Arc::clone(&stats),
                    deadline,
                    shutdown.clone(),
                ))
            })
            .collect();

        info!(
            max_workers,
            queue_depth = config.queue_depth,
            backpressure = ?config.backpressure,
            deadline_ms = config.query_timeout_ms,
            "Dispatcher started"
        );

        Arc::new(Self {
            tx,
            backpressure: config.backpressure,
            deadline,
            stats,
            workers: std::sync::Mutex::new(workers),
        })
    }

    /// Queues `job`, applying the backpressure policy when the queue is full.
    pub async fn submit(&self, job: Job) -> SubmitOutcome {
        self.stats.submitted.fetch_add(1, Ordering::Relaxed);

        match self.backpressure {
            Backpressure::Block => {
                let peer = job.sink.peer();
                match tokio::time::timeout(self.deadline, self.tx.send(job)).await {
                    Ok(Ok(())) => SubmitOutcome::Queued,
                    Ok(Err(_)) => SubmitOutcome::Closed,
                    Err(_) => {
                        self.stats.expired.fetch_add(1, Ordering::Relaxed);
                        warn!(client = %peer, "Query queue full past deadline, abandoning query");
                        SubmitOutcome::TimedOut
                    }
                }
            }
            Backpressure::Reject => match self.tx.try_send(job) {
                Ok(()) => SubmitOutcome::Queued,
                Err(mpsc::error::TrySendError::Full(job)) => {
                    self.stats.rejected.fetch_add(1, Ordering::Relaxed);
                    debug!(client = %job.sink.peer(), "Query queue full, refusing");
                    let refused = Err(DomainError::QueueFull);
                    match wire::encode_response(&job.request, &refused, job.sink.max_response_len()) {
                        Ok(bytes) => {
                            if let Err(e) = job.sink.send(bytes).await {
                                debug!(error = %e, "Failed to deliver REFUSED");
                            }
                        }
                        Err(e) => error!(error = %e, "Failed to build REFUSED response"),
                    }
                    SubmitOutcome::Rejected
                }
                Err(mpsc::error::TrySendError::Closed(_)) => SubmitOutcome::Closed,
            },
            Backpressure::Drop => match self.tx.try_send(job) {
                Ok(()) => SubmitOutcome::Queued,
                Err(mpsc::error::TrySendError::Full(job)) => {
                    self.stats.dropped.fetch_add(1, Ordering::Relaxed);
                    debug!(client = %job.sink.peer(), "Query queue full, dropping");
                    SubmitOutcome::Dropped
                }
                Err(mpsc::error::TrySendError::Closed(_)) => SubmitOutcome::Closed,
            },
        }
    }

    pub fn stats(&self) -> DispatcherCounters {
        self.stats.snapshot()
    }

    /// Waits for every worker to exit. Workers stop once the shutdown token
    /// fires.
    pub async fn join(&self) {
        let handles: Vec<_> = match self.workers.lock() {
            Ok(mut workers) => workers.drain(..).collect(),
            Err(poisoned) => poisoned.into_inner().drain(..).collect(),
        };
        for handle in handles {
            if let Err(e) = handle.await {
                warn!(error = %e, "Dispatcher worker ended abnormally");
            }
        }
    }
}

async fn worker_loop(
    id: usize,
    rx: Arc<Mutex<mpsc::Receiver<Job>>>,
    resolver: Arc<dyn PtrResolver>,
    stats: Arc<DispatcherStats>,
    deadline: Duration,
    shutdown: CancellationToken,
) {
    loop {
        let job = tokio::select! {
            _ = shutdown.cancelled() => break,
            job = async { rx.lock().await.recv().await } => match job {
                Some(job) => job,
                None => break,
            },
        };

        process(job, resolver.as_ref(), &stats, deadline).await;
    }

    debug!(worker = id, "Dispatcher worker stopped");
}

async fn process(job: Job, resolver: &dyn PtrResolver, stats: &DispatcherStats, deadline: Duration) {
    let waited = job.enqueued_at.elapsed();
    if waited > deadline {
        stats.expired.fetch_add(1, Ordering::Relaxed);
        debug!(
            name = %job.query.name,
            waited_ms = waited.as_millis() as u64,
            "Query expired in queue"
        );
        return;
    }

    let outcome = resolve_isolated(resolver, &job.query, stats);
    log_outcome(&job.query, &outcome);

    let bytes = match wire::encode_response(&job.request, &outcome, job.sink.max_response_len()) {
        Ok(bytes) => bytes,
        Err(e) => {
            error!(name = %job.query.name, error = %e, "Failed to encode response");
            let fault = Err(e);
            match wire::encode_response(&job.request, &fault, job.sink.max_response_len()) {
                Ok(bytes) => bytes,
                Err(_) => return,
            }
        }
    };

    if let Err(e) = job.sink.send(bytes).await {
        debug!(client = %job.sink.peer(), error = %e, "Failed to deliver response");
    }

    stats.completed.fetch_add(1, Ordering::Relaxed);
}

fn resolve_isolated(
    resolver: &dyn PtrResolver,
    query: &PtrQuery,
    stats: &DispatcherStats,
) -> Result<PtrAnswer, DomainError> {
    match catch_unwind(AssertUnwindSafe(|| resolver.resolve(query))) {
        Ok(outcome) => outcome,
        Err(panic) => {
            stats.faults.fetch_add(1, Ordering::Relaxed);
            let message = panic_message(panic.as_ref());
            error!(name = %query.name, client = %query.client, panic = %message, "Resolver panicked");
            Err(DomainError::InternalFault(message))
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

fn log_outcome(query: &PtrQuery, outcome: &Result<PtrAnswer, DomainError>) {
    match outcome {
        Ok(answer) => debug!(
            name = %query.name,
            client = %query.client,
            transport = %query.transport,
            hostname = %answer.hostname,
            source = answer.source.as_str(),
            "PTR answered"
        ),
        Err(DomainError::InternalFault(_)) => {}
        Err(e) => debug!(
            name = %query.name,
            client = %query.client,
            transport = %query.transport,
            query_type = %query.query_type,
            outcome = e.kind(),
            "Query not answered with a PTR"
        ),
    }
}
