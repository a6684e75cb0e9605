//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured tracing events, request ID attached)
//!     → metrics.rs (counters, histograms; Prometheus scrape endpoint)
//! ```
//!
//! # Design Decisions
//! - Structured logging via the tracing crate; `RUST_LOG` overrides config
//! - Metric updates are cheap atomic operations
//! - The retry counter is labeled by target so a flapping backend is visible

pub mod logging;
pub mod metrics;
