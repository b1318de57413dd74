pub mod dispatcher;
pub mod server;
pub mod transport;
pub mod wire;

pub use dispatcher::{Dispatcher, DispatcherCounters, DispatcherStats, Job, SubmitOutcome};
pub use server::DnsServer;
pub use transport::ResponseSink;
pub use wire::{decode_request, encode_response, DecodedRequest, Rejection};
