//! Proxy core: the per-request retry/failover machinery.
//!
//! # Data Flow
//! ```text
//! Inbound request
//!     → replay.rs (buffer the request body once, seal for replay)
//!     → rotation.rs (pick the next backend host, round-robin)
//!     → attempt.rs (fresh connection, forward method/path/headers/body)
//!     → retry.rs (predicate decides whether the outcome warrants a retry)
//!     → orchestrator.rs (budget check, backoff sleep, loop, or finalize)
//! ```
//!
//! # Design Decisions
//! - One orchestrator future per request; no retry state crosses requests
//! - The rotation cursor is the only shared mutable state (a single atomic)
//! - Request bodies are buffered once and replayed; response bodies stream
//!   through without buffering
//! - The client response is completed exactly once per request

pub mod attempt;
pub mod orchestrator;
pub mod replay;
pub mod retry;
pub mod rotation;

pub use attempt::AttemptOutcome;
pub use orchestrator::RetryOrchestrator;
pub use retry::{OutcomeView, RetryPolicy};
pub use rotation::{BackendTarget, HostRotator};
