//! A single forwarding attempt against one backend.

use std::time::Duration;

use axum::body::{Body, Bytes};
use axum::http::header::{HeaderName, HeaderValue, HOST};
use axum::http::request::Parts;
use axum::http::uri::PathAndQuery;
use axum::http::{Request, Response, Uri};
use hyper::client::conn::http1;
use hyper_util::rt::TokioIo;
use thiserror::Error;
use tokio::net::TcpStream;
use tokio::time::timeout;

use crate::config::schema::TimeoutConfig;
use crate::proxy::rotation::BackendTarget;

/// What one attempt produced: a backend response, or a transport error.
///
/// Exactly one outcome is produced per attempt. The response body is a
/// pass-through stream; only the request body is buffered.
#[derive(Debug)]
pub enum AttemptOutcome {
    Response(Response<Body>),
    TransportError(String),
}

#[derive(Debug, Error)]
enum AttemptError {
    #[error("connect to {target} failed: {source}")]
    Connect {
        target: BackendTarget,
        source: std::io::Error,
    },

    #[error("connect to {target} timed out after {seconds}s")]
    ConnectTimeout { target: BackendTarget, seconds: u64 },

    #[error("http handshake with {target} failed: {source}")]
    Handshake {
        target: BackendTarget,
        source: hyper::Error,
    },

    #[error("request to {target} failed: {source}")]
    Request {
        target: BackendTarget,
        source: hyper::Error,
    },

    #[error("request to {target} timed out after {seconds}s")]
    Timeout { target: BackendTarget, seconds: u64 },
}

/// Hop-by-hop headers are connection-level and must not be replayed to the
/// backend; the outbound connection frames the buffered body itself.
const HOP_BY_HOP: [&str; 7] = [
    "connection",
    "keep-alive",
    "proxy-connection",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

fn is_hop_by_hop(name: &HeaderName) -> bool {
    HOP_BY_HOP.contains(&name.as_str())
}

/// Executes one forwarding attempt.
///
/// Every attempt opens a fresh TCP connection; connections are never reused
/// across attempts, even to the same host. Retry logic lives entirely in the
/// orchestrator.
#[derive(Debug, Clone)]
pub struct ProxyAttempt {
    connect_timeout: Duration,
    request_timeout: Duration,
    connect_secs: u64,
    request_secs: u64,
}

impl ProxyAttempt {
    pub fn new(timeouts: &TimeoutConfig) -> Self {
        Self {
            connect_timeout: Duration::from_secs(timeouts.connect_secs),
            request_timeout: Duration::from_secs(timeouts.request_secs),
            connect_secs: timeouts.connect_secs,
            request_secs: timeouts.request_secs,
        }
    }

    /// Forward the buffered request to `target` and observe the outcome.
    pub async fn execute(&self, target: &BackendTarget, parts: &Parts, body: Bytes) -> AttemptOutcome {
        let result = timeout(self.request_timeout, self.send(target, parts, body)).await;
        match result {
            Ok(Ok(response)) => AttemptOutcome::Response(response),
            Ok(Err(err)) => AttemptOutcome::TransportError(err.to_string()),
            Err(_) => AttemptOutcome::TransportError(
                AttemptError::Timeout {
                    target: target.clone(),
                    seconds: self.request_secs,
                }
                .to_string(),
            ),
        }
    }

    async fn send(
        &self,
        target: &BackendTarget,
        parts: &Parts,
        body: Bytes,
    ) -> Result<Response<Body>, AttemptError> {
        let stream = timeout(
            self.connect_timeout,
            TcpStream::connect((target.host.as_str(), target.port)),
        )
        .await
        .map_err(|_| AttemptError::ConnectTimeout {
            target: target.clone(),
            seconds: self.connect_secs,
        })?
        .map_err(|source| AttemptError::Connect {
            target: target.clone(),
            source,
        })?;

        let io = TokioIo::new(stream);
        let (mut sender, connection) =
            http1::handshake(io)
                .await
                .map_err(|source| AttemptError::Handshake {
                    target: target.clone(),
                    source,
                })?;

        // The connection task owns the socket; it finishes once the response
        // body has been fully forwarded and the sender is dropped.
        let conn_target = target.clone();
        tokio::spawn(async move {
            if let Err(err) = connection.await {
                tracing::debug!(backend = %conn_target, error = %err, "outbound connection closed with error");
            }
        });

        let request = build_outbound_request(parts, body, target);
        let response = sender
            .send_request(request)
            .await
            .map_err(|source| AttemptError::Request {
                target: target.clone(),
                source,
            })?;

        // Hand the backend body straight through as the client response body.
        Ok(response.map(Body::new))
    }
}

/// Rebuild the inbound request for one outbound attempt: same method, same
/// origin-form path, inbound headers minus hop-by-hop, buffered body. An
/// HTTP/2 inbound request carries its authority in the URI, not a Host
/// header, so one is synthesized from the target in that case.
fn build_outbound_request(parts: &Parts, body: Bytes, target: &BackendTarget) -> Request<Body> {
    let path_and_query = parts
        .uri
        .path_and_query()
        .cloned()
        .unwrap_or_else(|| PathAndQuery::from_static("/"));

    let mut uri_parts = axum::http::uri::Parts::default();
    uri_parts.path_and_query = Some(path_and_query);
    let uri = Uri::from_parts(uri_parts).unwrap_or_else(|_| Uri::from_static("/"));

    let mut request = Request::new(Body::from(body));
    *request.method_mut() = parts.method.clone();
    *request.uri_mut() = uri;

    let headers = request.headers_mut();
    for (name, value) in parts.headers.iter() {
        if !is_hop_by_hop(name) {
            headers.append(name.clone(), value.clone());
        }
    }
    if !headers.contains_key(HOST) {
        if let Ok(value) = HeaderValue::from_str(&target.to_string()) {
            headers.insert(HOST, value);
        }
    }

    request
}
