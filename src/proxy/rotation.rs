//! Round-robin rotation over the configured backend hosts.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

use thiserror::Error;

use crate::config::schema::HostConfig;

/// One candidate backend server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendTarget {
    pub host: String,
    pub port: u16,
}

impl BackendTarget {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

impl From<&HostConfig> for BackendTarget {
    fn from(config: &HostConfig) -> Self {
        Self::new(config.host.clone(), config.port)
    }
}

impl fmt::Display for BackendTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Error raised when a rotator is constructed without any targets.
#[derive(Debug, Error)]
#[error("backend host pool is empty")]
pub struct EmptyPool;

/// Rotates through a fixed pool of backend targets.
///
/// The pool is immutable after construction; rotation advances an atomic
/// cursor, so the rotator can be shared across all in-flight requests without
/// locking. With N targets, N consecutive calls to [`next`](Self::next) return
/// each target exactly once before the sequence repeats.
#[derive(Debug)]
pub struct HostRotator {
    targets: Vec<BackendTarget>,
    cursor: AtomicUsize,
}

impl HostRotator {
    /// Create a rotator over the given targets.
    ///
    /// An empty pool is a configuration error: the proxy must refuse to start
    /// rather than fail per-request.
    pub fn new(targets: Vec<BackendTarget>) -> Result<Self, EmptyPool> {
        if targets.is_empty() {
            return Err(EmptyPool);
        }
        Ok(Self {
            targets,
            cursor: AtomicUsize::new(0),
        })
    }

    /// Return the next target in rotation.
    pub fn next(&self) -> BackendTarget {
        let n = self.cursor.fetch_add(1, Ordering::Relaxed);
        self.targets[n % self.targets.len()].clone()
    }

    /// Number of targets in the pool.
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool() -> Vec<BackendTarget> {
        vec![
            BackendTarget::new("10.0.0.1", 8080),
            BackendTarget::new("10.0.0.2", 8080),
            BackendTarget::new("10.0.0.3", 8080),
        ]
    }

    #[test]
    fn test_full_cycle_visits_each_target_once() {
        let targets = pool();
        let rotator = HostRotator::new(targets.clone()).unwrap();

        let round: Vec<_> = (0..targets.len()).map(|_| rotator.next()).collect();
        assert_eq!(round, targets);

        // The (N+1)-th call wraps back to the front.
        assert_eq!(rotator.next(), targets[0]);
    }

    #[test]
    fn test_empty_pool_is_refused() {
        assert!(HostRotator::new(Vec::new()).is_err());
    }

    #[test]
    fn test_display_is_host_port() {
        assert_eq!(BackendTarget::new("backend.local", 9000).to_string(), "backend.local:9000");
    }
}
