use autoptr6_domain::config::DispatcherConfig;
use autoptr6_domain::Backpressure;
use autoptr6_infrastructure::dns::transport::TcpResponseSink;
use autoptr6_infrastructure::dns::{Dispatcher, Job, ResponseSink, SubmitOutcome};
use hickory_proto::op::{Message, ResponseCode};
use hickory_proto::rr::RecordType;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

mod helpers;
use helpers::*;

fn config(max_workers: usize, queue_depth: usize, backpressure: Backpressure) -> DispatcherConfig {
    DispatcherConfig {
        max_workers,
        queue_depth,
        backpressure,
        query_timeout_ms: 2000,
    }
}

fn job(id: u16, addr: &str, sink: Arc<dyn ResponseSink>) -> Job {
    let request = query_message(id, &reverse_name(addr), RecordType::PTR);
    Job::new(ptr_query(addr), request, sink)
}

async fn next_response(rx: &mut tokio::sync::mpsc::UnboundedReceiver<Vec<u8>>) -> Message {
    let bytes = tokio::time::timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("response in time")
        .expect("sink open");
    parse_response(&bytes)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_answers_queued_query() {
    let resolver = FixedResolver::new("host.example.net.");
    let shutdown = CancellationToken::new();
    let dispatcher = Dispatcher::start(
        resolver.clone(),
        &config(4, 16, Backpressure::Block),
        shutdown.clone(),
    );
    let (sink, mut rx) = CapturingSink::new();

    let outcome = dispatcher.submit(job(11, "2001:db8::1", sink)).await;
    assert_eq!(outcome, SubmitOutcome::Queued);

    let response = next_response(&mut rx).await;
    assert_eq!(response.id(), 11);
    assert_eq!(response.response_code(), ResponseCode::NoError);
    assert_eq!(ptr_targets(&response), vec!["host.example.net.".to_string()]);
    assert_eq!(resolver.calls.load(Ordering::SeqCst), 1);

    shutdown.cancel();
    dispatcher.join().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_panic_becomes_servfail_for_that_query_only() {
    let shutdown = CancellationToken::new();
    let dispatcher = Dispatcher::start(
        Arc::new(PanickingResolver { marker: "f.f.f.f" }),
        &config(1, 16, Backpressure::Block),
        shutdown.clone(),
    );
    let (sink, mut rx) = CapturingSink::new();

    dispatcher.submit(job(1, "2001:db8::ffff", sink.clone())).await;
    let failed = next_response(&mut rx).await;
    assert_eq!(failed.id(), 1);
    assert_eq!(failed.response_code(), ResponseCode::ServFail);

    // Same single worker keeps serving.
    dispatcher.submit(job(2, "2001:db8::1", sink)).await;
    let ok = next_response(&mut rx).await;
    assert_eq!(ok.id(), 2);
    assert_eq!(ok.response_code(), ResponseCode::NoError);

    let stats = dispatcher.stats();
    assert_eq!(stats.faults, 1);
    assert_eq!(stats.completed, 2);

    shutdown.cancel();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_reject_policy_refuses_when_queue_full() {
    let resolver = GatedResolver::new();
    let shutdown = CancellationToken::new();
    let dispatcher = Dispatcher::start(
        resolver.clone(),
        &config(1, 1, Backpressure::Reject),
        shutdown.clone(),
    );
    let (sink, mut rx) = CapturingSink::new();

    let gate = resolver.gate.lock().unwrap();

    assert_eq!(dispatcher.submit(job(1, "2001:db8::1", sink.clone())).await, SubmitOutcome::Queued);
    resolver.wait_entered(1).await;
    assert_eq!(dispatcher.submit(job(2, "2001:db8::2", sink.clone())).await, SubmitOutcome::Queued);
    assert_eq!(dispatcher.submit(job(3, "2001:db8::3", sink.clone())).await, SubmitOutcome::Rejected);

    let refused = next_response(&mut rx).await;
    assert_eq!(refused.id(), 3);
    assert_eq!(refused.response_code(), ResponseCode::Refused);

    drop(gate);

    let mut answered: Vec<u16> = vec![next_response(&mut rx).await.id(), next_response(&mut rx).await.id()];
    answered.sort_unstable();
    assert_eq!(answered, vec![1, 2]);
    assert_eq!(dispatcher.stats().rejected, 1);

    shutdown.cancel();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_drop_policy_discards_silently() {
    let resolver = GatedResolver::new();
    let shutdown = CancellationToken::new();
    let dispatcher = Dispatcher::start(
        resolver.clone(),
        &config(1, 1, Backpressure::Drop),
        shutdown.clone(),
    );
    let (sink, mut rx) = CapturingSink::new();

    let gate = resolver.gate.lock().unwrap();

    dispatcher.submit(job(1, "2001:db8::1", sink.clone())).await;
    resolver.wait_entered(1).await;
    dispatcher.submit(job(2, "2001:db8::2", sink.clone())).await;
    assert_eq!(dispatcher.submit(job(3, "2001:db8::3", sink.clone())).await, SubmitOutcome::Dropped);

    drop(gate);

    let mut answered: Vec<u16> = vec![next_response(&mut rx).await.id(), next_response(&mut rx).await.id()];
    answered.sort_unstable();
    assert_eq!(answered, vec![1, 2]);
    assert!(tokio::time::timeout(Duration::from_millis(100), rx.recv()).await.is_err());
    assert_eq!(dispatcher.stats().dropped, 1);

    shutdown.cancel();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_block_policy_gives_up_at_deadline() {
    let resolver = GatedResolver::new();
    let shutdown = CancellationToken::new();
    let mut cfg = config(1, 1, Backpressure::Block);
    cfg.query_timeout_ms = 50;
    let dispatcher = Dispatcher::start(resolver.clone(), &cfg, shutdown.clone());
    let (sink, _rx) = CapturingSink::new();

    let gate = resolver.gate.lock().unwrap();

    dispatcher.submit(job(1, "2001:db8::1", sink.clone())).await;
    resolver.wait_entered(1).await;
    dispatcher.submit(job(2, "2001:db8::2", sink.clone())).await;
    let outcome = dispatcher.submit(job(3, "2001:db8::3", sink.clone())).await;

    assert_eq!(outcome, SubmitOutcome::TimedOut);
    drop(gate);
    shutdown.cancel();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_query_expired_in_queue_is_not_answered() {
    let resolver = GatedResolver::new();
    let shutdown = CancellationToken::new();
    let mut cfg = config(1, 4, Backpressure::Block);
    cfg.query_timeout_ms = 50;
    let dispatcher = Dispatcher::start(resolver.clone(), &cfg, shutdown.clone());
    let (sink, mut rx) = CapturingSink::new();

    let gate = resolver.gate.lock().unwrap();
    dispatcher.submit(job(1, "2001:db8::1", sink.clone())).await;
    resolver.wait_entered(1).await;
    dispatcher.submit(job(2, "2001:db8::2", sink.clone())).await;

    tokio::time::sleep(Duration::from_millis(120)).await;
    drop(gate);

    assert_eq!(next_response(&mut rx).await.id(), 1);
    assert!(wait_until(|| dispatcher.stats().expired == 1).await);
    assert!(tokio::time::timeout(Duration::from_millis(100), rx.recv()).await.is_err());

    shutdown.cancel();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_workers_resolve_concurrently() {
    let resolver = GatedResolver::new();
    let shutdown = CancellationToken::new();
    let dispatcher = Dispatcher::start(
        resolver.clone(),
        &config(2, 8, Backpressure::Block),
        shutdown.clone(),
    );
    let (sink, _rx) = CapturingSink::new();

    let gate = resolver.gate.lock().unwrap();
    dispatcher.submit(job(1, "2001:db8::1", sink.clone())).await;
    dispatcher.submit(job(2, "2001:db8::2", sink.clone())).await;

    // Both workers reach the resolver while the gate is closed.
    resolver.wait_entered(2).await;

    drop(gate);
    assert!(wait_until(|| dispatcher.stats().completed == 2).await);
    shutdown.cancel();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_client_not_reading_tcp_does_not_stall_workers() {
    let resolver = FixedResolver::new("host.example.net.");
    let shutdown = CancellationToken::new();
    let dispatcher = Dispatcher::start(
        resolver.clone(),
        &config(4, 64, Backpressure::Block),
        shutdown.clone(),
    );

    // Writer side of the connection never drains.
    let (tx, _stalled_rx) = tokio::sync::mpsc::channel(32);
    let closed = CancellationToken::new();
    let stalled: Arc<dyn ResponseSink> = Arc::new(TcpResponseSink::new(tx, client(), closed.clone()));
    for id in 0..40 {
        dispatcher.submit(job(id, "2001:db8::1", stalled.clone())).await;
    }

    let (sink, mut rx) = CapturingSink::new();
    dispatcher.submit(job(500, "2001:db8::2", sink)).await;

    let response = next_response(&mut rx).await;
    assert_eq!(response.id(), 500);
    assert_eq!(response.response_code(), ResponseCode::NoError);
    assert!(wait_until(|| closed.is_cancelled()).await);
    assert!(wait_until(|| dispatcher.stats().completed == 41).await);

    shutdown.cancel();
    dispatcher.join().await;
}
