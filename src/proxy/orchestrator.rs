//! Per-request retry state machine.

use std::sync::Arc;
use std::time::Duration;

use axum::body::{Body, Bytes};
use axum::http::{Request, Response, StatusCode};
use axum::response::IntoResponse;

use crate::config::schema::TimeoutConfig;
use crate::http::request::X_REQUEST_ID;
use crate::observability::metrics;
use crate::proxy::attempt::{AttemptOutcome, ProxyAttempt};
use crate::proxy::replay::{CaptureError, ReplayBuffer};
use crate::proxy::retry::RetryPolicy;
use crate::proxy::rotation::{BackendTarget, HostRotator};
use crate::resilience::backoff::delay_for;

/// Per-request mutable state, owned by the orchestrator future.
struct RetryContext {
    /// Number of retries scheduled so far; 0 while the first attempt runs.
    attempt: u32,
    body: Bytes,
    terminated: bool,
}

/// The states of one request's retry cycle.
enum RetryState {
    Attempting { target: BackendTarget },
    Deciding { outcome: AttemptOutcome },
    Retrying { delay: Duration },
    Finalizing { outcome: AttemptOutcome },
}

enum Decision {
    Retry { delay: Duration },
    Finalize,
}

/// Drives a request through attempt/decide/retry cycles until the client
/// response can be finalized, exactly once.
///
/// Attempts within one request are strictly sequential: the next attempt
/// starts only after the previous outcome is decided and the backoff delay
/// has elapsed. Dropping the future (client disconnect) cancels the in-flight
/// attempt and any pending backoff timer.
#[derive(Debug)]
pub struct RetryOrchestrator {
    policy: RetryPolicy,
    rotator: Arc<HostRotator>,
    attempt: ProxyAttempt,
    max_body_bytes: usize,
}

impl RetryOrchestrator {
    pub fn new(
        policy: RetryPolicy,
        rotator: Arc<HostRotator>,
        timeouts: &TimeoutConfig,
        max_body_bytes: usize,
    ) -> Self {
        Self {
            policy,
            rotator,
            attempt: ProxyAttempt::new(timeouts),
            max_body_bytes,
        }
    }

    /// Handle one inbound request to completion.
    pub async fn run(&self, request: Request<Body>) -> Response<Body> {
        let (parts, inbound_body) = request.into_parts();
        let request_id = parts
            .headers
            .get(X_REQUEST_ID)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("unknown")
            .to_string();

        // Start: capture the inbound body once; every attempt replays it.
        let body = match ReplayBuffer::capture(inbound_body, self.max_body_bytes).await {
            Ok(body) => body,
            Err(err) => {
                tracing::warn!(request_id = %request_id, error = %err, "rejecting request body");
                let status = match err {
                    CaptureError::TooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
                    CaptureError::Read(_) => StatusCode::BAD_REQUEST,
                };
                return (status, err.to_string()).into_response();
            }
        };

        let mut ctx = RetryContext {
            attempt: 0,
            body,
            terminated: false,
        };
        let mut state = RetryState::Attempting {
            target: self.rotator.next(),
        };

        loop {
            state = match state {
                RetryState::Attempting { target } => {
                    let outcome = self
                        .attempt
                        .execute(&target, &parts, ctx.body.clone())
                        .await;
                    if let AttemptOutcome::TransportError(message) = &outcome {
                        tracing::error!(
                            request_id = %request_id,
                            retry = ctx.attempt,
                            backend = %target,
                            error = %message,
                            "attempt failed"
                        );
                    }
                    RetryState::Deciding { outcome }
                }
                RetryState::Deciding { outcome } => match self.decide(&mut ctx, &outcome) {
                    Decision::Retry { delay } => RetryState::Retrying { delay },
                    Decision::Finalize => RetryState::Finalizing { outcome },
                },
                RetryState::Retrying { delay } => {
                    tokio::time::sleep(delay).await;
                    let target = self.rotator.next();
                    tracing::info!(
                        request_id = %request_id,
                        retry = ctx.attempt,
                        backend = %target,
                        delay_ms = delay.as_millis() as u64,
                        "retrying request"
                    );
                    metrics::record_retry(&target.to_string());
                    RetryState::Attempting { target }
                }
                RetryState::Finalizing { outcome } => break finalize(&mut ctx, outcome),
            };
        }
    }

    /// Decide whether the outcome warrants another attempt within budget.
    ///
    /// Budget precedence: `allow_retry` starts true; the backoff cap may
    /// veto; a configured retry-count cap overwrites the backoff cap's
    /// verdict.
    fn decide(&self, ctx: &mut RetryContext, outcome: &AttemptOutcome) -> Decision {
        if !self.policy.should_retry(outcome) {
            return Decision::Finalize;
        }

        ctx.attempt += 1;
        let delay = delay_for(ctx.attempt, self.policy.max_backoff_ms);

        let mut allow_retry = true;
        if let Some(max_ms) = self.policy.max_backoff_ms {
            allow_retry = delay < Duration::from_millis(max_ms);
        }
        if let Some(max_retries) = self.policy.max_retries {
            allow_retry = ctx.attempt < max_retries;
        }

        if allow_retry {
            Decision::Retry { delay }
        } else {
            Decision::Finalize
        }
    }
}

/// Complete the client response. Called exactly once per request.
fn finalize(ctx: &mut RetryContext, outcome: AttemptOutcome) -> Response<Body> {
    debug_assert!(!ctx.terminated, "response finalized twice");
    ctx.terminated = true;

    match outcome {
        // Forward the backend response verbatim; the body streams through.
        AttemptOutcome::Response(response) => response,
        AttemptOutcome::TransportError(message) => {
            (StatusCode::INTERNAL_SERVER_ERROR, message).into_response()
        }
    }
}
