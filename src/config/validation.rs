//! Configuration validation.
//!
//! Semantic checks on an already-deserialized [`ProxyConfig`]; serde handles
//! the syntactic layer. Returns all validation errors, not just the first.

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::ProxyConfig;

/// A single semantic configuration error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("upstream host pool is empty; at least one host is required")]
    EmptyHostPool,

    #[error("upstream host #{index} has an empty host name")]
    EmptyHostName { index: usize },

    #[error("upstream host #{index} ({host}) has port 0")]
    ZeroPort { index: usize, host: String },

    #[error("listener bind address {address:?} is not a valid socket address")]
    InvalidBindAddress { address: String },
}

/// Validate a configuration, collecting every error.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress {
            address: config.listener.bind_address.clone(),
        });
    }

    if config.upstream.hosts.is_empty() {
        errors.push(ValidationError::EmptyHostPool);
    }

    for (index, host) in config.upstream.hosts.iter().enumerate() {
        if host.host.trim().is_empty() {
            errors.push(ValidationError::EmptyHostName { index });
        }
        if host.port == 0 {
            errors.push(ValidationError::ZeroPort {
                index,
                host: host.host.clone(),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
