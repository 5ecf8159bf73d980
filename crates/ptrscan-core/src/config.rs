//! Scan configuration: cache location, fetch policy and parser switches.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::retry::{Backoff, RetryConfig};
use crate::throttling::RequestPacer;

/// Runtime settings shared by the cache and the parser.
///
/// Every field has a default, so a config file only needs the keys it changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Flat directory holding cached documents.
    pub cache_dir: PathBuf,
    /// Total fetch attempts per document.
    pub fetch_attempts: u32,
    /// Delay after the first failed attempt; doubles afterwards.
    pub backoff_base_ms: u64,
    /// Upper bound for a single backoff delay.
    pub backoff_max_ms: u64,
    /// Scale each backoff delay by a random factor in `[0.5, 1.5)`.
    pub backoff_jitter: bool,
    /// Per-request timeout.
    pub timeout_ms: u64,
    /// Minimum gap between outgoing requests. `None` disables pacing.
    pub min_request_interval_ms: Option<u64>,
    /// Try the text-line pattern on PDF pages without a layout table.
    pub text_fallback: bool,
    pub user_agent: String,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            cache_dir: resolve_ptrscan_home().join("cache"),
            fetch_attempts: 3,
            backoff_base_ms: 1_000,
            backoff_max_ms: 30_000,
            backoff_jitter: false,
            timeout_ms: 30_000,
            min_request_interval_ms: None,
            text_fallback: true,
            user_agent: format!("ptrscan/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ScanConfig {
    /// Load a JSON config file; missing keys keep their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn retry(&self) -> RetryConfig {
        RetryConfig {
            max_attempts: self.fetch_attempts,
            backoff: Backoff::Exponential {
                base: Duration::from_millis(self.backoff_base_ms),
                factor: 2.0,
                max: Duration::from_millis(self.backoff_max_ms),
                jitter: self.backoff_jitter,
            },
        }
    }

    pub fn pacer(&self) -> Option<RequestPacer> {
        self.min_request_interval_ms
            .and_then(|ms| RequestPacer::new(Duration::from_millis(ms)))
    }
}

fn resolve_ptrscan_home() -> PathBuf {
    if let Some(path) = env::var_os("PTRSCAN_HOME") {
        let path = PathBuf::from(path);
        if !path.as_os_str().is_empty() {
            return path;
        }
    }

    if let Some(home) = env::var_os("HOME") {
        return PathBuf::from(home).join(".ptrscan");
    }

    PathBuf::from(".ptrscan")
}
