//! Request body capture for replay across attempts.

use axum::body::{Body, Bytes};
use futures_util::StreamExt;
use thiserror::Error;

/// Error raised while capturing the inbound body.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("request body exceeds the configured limit of {limit} bytes")]
    TooLarge { limit: usize },

    #[error("failed to read request body: {0}")]
    Read(String),
}

/// Buffers the inbound request body so it can be replayed on every attempt.
///
/// The original inbound stream is consumed exactly once; after [`seal`]
/// the buffered bytes are immutable and cheap to hand to any number of
/// attempts.
///
/// [`seal`]: Self::seal
#[derive(Debug, Default)]
pub struct ReplayBuffer {
    chunks: Vec<Bytes>,
    len: usize,
}

impl ReplayBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk of inbound data.
    pub fn ingest(&mut self, chunk: Bytes) {
        self.len += chunk.len();
        self.chunks.push(chunk);
    }

    /// Total bytes buffered so far.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Finish the buffer, producing the full concatenated body.
    pub fn seal(mut self) -> Bytes {
        match self.chunks.len() {
            0 => Bytes::new(),
            // Single chunk: hand it back without copying.
            1 => self.chunks.remove(0),
            _ => {
                let mut buf = Vec::with_capacity(self.len);
                for chunk in &self.chunks {
                    buf.extend_from_slice(chunk);
                }
                Bytes::from(buf)
            }
        }
    }

    /// Drain an inbound body stream into a sealed buffer.
    ///
    /// Enforces `limit` as it reads, so an oversized body is rejected without
    /// being held in memory in full.
    pub async fn capture(body: Body, limit: usize) -> Result<Bytes, CaptureError> {
        let mut buffer = ReplayBuffer::new();
        let mut stream = body.into_data_stream();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|err| CaptureError::Read(err.to_string()))?;
            if buffer.len() + chunk.len() > limit {
                return Err(CaptureError::TooLarge { limit });
            }
            buffer.ingest(chunk);
        }

        Ok(buffer.seal())
    }
}
