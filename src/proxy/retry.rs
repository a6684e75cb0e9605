//! Retry decision: the caller-supplied predicate over attempt outcomes.

use std::fmt;
use std::sync::Arc;

use axum::http::{HeaderMap, StatusCode};

use crate::config::schema::RetryConfig;
use crate::proxy::attempt::AttemptOutcome;

/// The slice of an outcome the retry predicate may inspect.
///
/// A predicate sees either the response metadata or the transport error,
/// never both; response bodies are not readable here, so evaluating the
/// predicate can never consume the stream that may still be forwarded to the
/// client.
#[derive(Debug, Clone, Copy)]
pub enum OutcomeView<'a> {
    Response {
        status: StatusCode,
        headers: &'a HeaderMap,
    },
    TransportError {
        message: &'a str,
    },
}

impl AttemptOutcome {
    /// Project this outcome into the view handed to the retry predicate.
    pub fn view(&self) -> OutcomeView<'_> {
        match self {
            AttemptOutcome::Response(response) => OutcomeView::Response {
                status: response.status(),
                headers: response.headers(),
            },
            AttemptOutcome::TransportError(message) => OutcomeView::TransportError { message },
        }
    }
}

pub type RetryPredicate = Arc<dyn Fn(OutcomeView<'_>) -> bool + Send + Sync>;

/// The retry policy for all requests: budget caps plus the predicate.
///
/// Immutable and shared read-only across requests. The default predicate
/// never retries.
#[derive(Clone)]
pub struct RetryPolicy {
    pub max_retries: Option<u32>,
    pub max_backoff_ms: Option<u64>,
    should_retry: RetryPredicate,
}

impl RetryPolicy {
    /// Policy that never retries, with no budget caps.
    pub fn never() -> Self {
        Self {
            max_retries: None,
            max_backoff_ms: None,
            should_retry: Arc::new(|_| false),
        }
    }

    /// Compile a policy from configuration.
    ///
    /// `retry_on_statuses` and `retry_on_transport_error` become the
    /// predicate; both empty/false yields the never-retry default.
    pub fn from_config(config: &RetryConfig) -> Self {
        let statuses = config.retry_on_statuses.clone();
        let on_transport_error = config.retry_on_transport_error;

        Self {
            max_retries: config.max_retries,
            max_backoff_ms: config.max_backoff_ms,
            should_retry: Arc::new(move |view| match view {
                OutcomeView::Response { status, .. } => statuses.contains(&status.as_u16()),
                OutcomeView::TransportError { .. } => on_transport_error,
            }),
        }
    }

    /// Replace the predicate with an arbitrary closure.
    pub fn with_predicate<F>(mut self, predicate: F) -> Self
    where
        F: Fn(OutcomeView<'_>) -> bool + Send + Sync + 'static,
    {
        self.should_retry = Arc::new(predicate);
        self
    }

    /// Evaluate the predicate against an attempt's outcome.
    pub fn should_retry(&self, outcome: &AttemptOutcome) -> bool {
        (self.should_retry)(outcome.view())
    }
}

impl fmt::Debug for RetryPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryPolicy")
            .field("max_retries", &self.max_retries)
            .field("max_backoff_ms", &self.max_backoff_ms)
            .finish_non_exhaustive()
    }
}
