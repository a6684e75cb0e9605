//! Retrying failover reverse proxy library.
//!
//! Forwards each inbound request to one of a rotating pool of backend hosts.
//! When an attempt's outcome (a response or a transport error) matches a
//! caller-supplied predicate, the same request is replayed against the next
//! host in the rotation after an exponentially growing delay, up to a bounded
//! number of attempts.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod proxy;
pub mod resilience;

pub use config::schema::ProxyConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use proxy::retry::{OutcomeView, RetryPolicy};
