//! Service settings loaded via OrthoConfig.
//!
//! Every field can be supplied as a `REGISTRAR_*` environment variable, a
//! CLI flag or a config file entry. Without a database URL the service runs on
//! the in-memory store.

use std::net::SocketAddr;

use ortho_config::OrthoConfig;
use serde::Deserialize;

use registrar::domain::{AllocationStrategy, DEFAULT_RECONCILE_BATCH, UnknownAllocationStrategy};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_POOL_MAX_SIZE: u32 = 8;

/// Invalid setting value.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// `bind_addr` is not a socket address.
    #[error("invalid bind address `{value}`: {source}")]
    BindAddr {
        /// Raw configured value.
        value: String,
        /// Parse failure.
        source: std::net::AddrParseError,
    },
    /// `allocation_strategy` names no known allocator.
    #[error(transparent)]
    Strategy(#[from] UnknownAllocationStrategy),
}

/// Configuration values for the registrar service.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "REGISTRAR")]
pub struct RegistrarSettings {
    /// Socket address the HTTP server binds to.
    pub bind_addr: Option<String>,
    /// PostgreSQL connection URL; unset selects the in-memory store.
    pub database_url: Option<String>,
    /// Maximum pooled database connections.
    pub pool_max_size: Option<u32>,
    /// `sequence` (default) or `count`.
    pub allocation_strategy: Option<String>,
    /// Users examined per reconciliation pass.
    pub reconcile_batch: Option<usize>,
}

impl RegistrarSettings {
    /// Parsed bind address, defaulting to `0.0.0.0:8080`.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let value = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        value.parse().map_err(|source| SettingsError::BindAddr {
            value: value.to_owned(),
            source,
        })
    }

    /// Database URL, ignoring blank values.
    pub fn database_url(&self) -> Option<&str> {
        self.database_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    /// Pool size, defaulting to 8.
    pub fn pool_max_size(&self) -> u32 {
        self.pool_max_size.unwrap_or(DEFAULT_POOL_MAX_SIZE)
    }

    /// Selected allocator, defaulting to the sequence strategy.
    pub fn allocation_strategy(&self) -> Result<AllocationStrategy, SettingsError> {
        match self.allocation_strategy.as_deref() {
            Some(raw) => Ok(raw.parse()?),
            None => Ok(AllocationStrategy::default()),
        }
    }

    /// Reconciliation batch size.
    pub fn reconcile_batch(&self) -> usize {
        self.reconcile_batch.unwrap_or(DEFAULT_RECONCILE_BATCH)
    }
}
