//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the proxy.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the retrying proxy.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listener configuration (bind address, body limit).
    pub listener: ListenerConfig,

    /// Backend host pool the proxy rotates through.
    pub upstream: UpstreamConfig,

    /// Retry budget and default predicate rules.
    pub retry: RetryConfig,

    /// Per-attempt timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Maximum inbound request body size in bytes. Bodies are buffered in
    /// full for replay, so this bounds per-request memory.
    pub max_body_bytes: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            max_body_bytes: 2 * 1024 * 1024,
        }
    }
}

/// The backend host pool.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Candidate backend hosts, in rotation order. Must be non-empty.
    pub hosts: Vec<HostConfig>,
}

/// One backend host.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HostConfig {
    /// Host name or address (e.g., "127.0.0.1").
    pub host: String,

    /// TCP port.
    pub port: u16,
}

/// Retry configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RetryConfig {
    /// Hard cap on attempts. When reached, no further retries regardless of
    /// the predicate. Unset means unbounded.
    pub max_retries: Option<u32>,

    /// Cap on the computed backoff delay in milliseconds. Also vetoes the
    /// retry decision once the computed delay saturates it, unless
    /// `max_retries` is configured (the count cap then governs).
    pub max_backoff_ms: Option<u64>,

    /// Response status codes the default predicate retries on.
    pub retry_on_statuses: Vec<u16>,

    /// Whether the default predicate retries transport errors.
    pub retry_on_transport_error: bool,
}

/// Per-attempt timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// Deadline for one attempt (connect through response head) in seconds.
    /// Expiry is a transport error and feeds the normal retry decision.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 5,
            request_secs: 30,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: true,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_parses_with_defaults() {
        let config: ProxyConfig = toml::from_str(
            r#"
            [[upstream.hosts]]
            host = "127.0.0.1"
            port = 3000
            "#,
        )
        .unwrap();

        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
        assert_eq!(config.upstream.hosts.len(), 1);
        assert_eq!(config.upstream.hosts[0].port, 3000);
        assert_eq!(config.retry.max_retries, None);
        assert!(!config.retry.retry_on_transport_error);
    }

    #[test]
    fn test_full_retry_section_parses() {
        let config: ProxyConfig = toml::from_str(
            r#"
            [retry]
            max_retries = 5
            max_backoff_ms = 30000
            retry_on_statuses = [500, 502, 503]
            retry_on_transport_error = true

            [[upstream.hosts]]
            host = "10.0.0.1"
            port = 80

            [[upstream.hosts]]
            host = "10.0.0.2"
            port = 80
            "#,
        )
        .unwrap();

        assert_eq!(config.retry.max_retries, Some(5));
        assert_eq!(config.retry.max_backoff_ms, Some(30_000));
        assert_eq!(config.retry.retry_on_statuses, vec![500, 502, 503]);
        assert!(config.retry.retry_on_transport_error);
        assert_eq!(config.upstream.hosts.len(), 2);
    }
}
