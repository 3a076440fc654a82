//! SDK configuration
//!
//! The API origin is the only externally configured value the core reads
//! (`CAMPUS_API_URL`). Cache tuning is set in code or by the CLI.

use crate::error::ConfigError;
use std::time::Duration;

/// Environment variable selecting the API origin
pub const BASE_URL_ENV: &str = "CAMPUS_API_URL";

/// Default API origin used when the environment does not set one
pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the admin API, without trailing slash
    pub base_url: String,
    /// Request timeout in seconds (default: 30)
    pub timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 30,
        }
    }
}

impl ClientConfig {
    /// Configuration pointing at the given origin
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            ..Default::default()
        }
    }

    /// Read the origin from `CAMPUS_API_URL`, falling back to the default
    pub fn from_env() -> Self {
        match std::env::var(BASE_URL_ENV) {
            Ok(url) if !url.trim().is_empty() => Self::with_base_url(url.trim()),
            _ => Self::default(),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = self.base_url.as_str();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::InvalidBaseUrl(url.to_string()));
        }
        Ok(())
    }
}

/// Query cache configuration
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Age after which a successful entry is stale. Zero means entries are
    /// stale as soon as they resolve and every `get` revalidates.
    pub max_age: Duration,
    /// Maximum number of entries kept before LRU eviction
    pub max_entries: usize,
    /// Silent retries for network-class fetch failures
    pub network_retries: u32,
    /// Capacity of the change-event channel
    pub event_capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_age: Duration::ZERO,
            max_entries: 256,
            network_retries: 1,
            event_capacity: 256,
        }
    }
}

impl CacheConfig {
    /// Configuration for interactive dashboards (entries fresh for 30 seconds)
    pub fn for_interactive() -> Self {
        Self {
            max_age: Duration::from_secs(30),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_entries == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        Ok(())
    }
}

/// Mutation tracking configuration
#[derive(Debug, Clone)]
pub struct MutationConfig {
    /// Settled records kept for inspection; the oldest are dropped past this.
    /// Zero keeps none. Pending records are never dropped.
    pub max_records: usize,
}

impl Default for MutationConfig {
    fn default() -> Self {
        Self { max_records: 64 }
    }
}

/// Top-level configuration for [`crate::AdminContext`]
#[derive(Debug, Clone, Default)]
pub struct SdkConfig {
    pub client: ClientConfig,
    pub cache: CacheConfig,
    pub mutations: MutationConfig,
}

impl SdkConfig {
    pub fn from_env() -> Self {
        Self {
            client: ClientConfig::from_env(),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.client.validate()?;
        self.cache.validate()
    }
}
