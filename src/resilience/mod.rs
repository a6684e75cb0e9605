//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Retry scheduled by the orchestrator:
//!     → backoff.rs (compute delay for this retry, clamp to configured cap)
//!     → orchestrator sleeps the delay, then rotates to the next host
//! ```
//!
//! # Design Decisions
//! - Backoff is a pure function of the retry count; no jitter, so a given
//!   scenario always produces the same delay sequence
//! - Delay grows quadratically with the retry count
//! - The retry budget itself lives in the orchestrator, not here

pub mod backoff;
