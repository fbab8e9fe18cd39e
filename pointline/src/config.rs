//! Client configuration.
//!
//! [`Config`] is a plain value: the client takes a snapshot at each call, so a
//! new config applies from the next operation on. Every field has a default,
//! and durations are expressed in milliseconds when serialized.
//!
//! # Example
//!
//! ```rust
//! use std::time::Duration;
//! use pointline::config::Config;
//!
//! let config = Config::default()
//!     .with_max_retries(5)
//!     .with_retry_delay(Duration::from_millis(250));
//! assert!(config.validate().is_ok());
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};
use crate::retry::{Backoff, RetryPolicy};

/// Runtime options for a [`Client`](crate::client::Client).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Base delay between attempts.
    #[serde(with = "duration_ms")]
    pub retry_delay: Duration,
    /// How the delay evolves between retries.
    pub backoff: Backoff,
    /// Per-request transport timeout.
    #[serde(with = "duration_ms")]
    pub timeout: Duration,
    /// Log every recorded error at `warn` instead of `debug`.
    pub debug_mode: bool,
    /// Try to re-establish the link before a send when it is down.
    pub auto_reconnect: bool,
    /// Wait before a reconnection attempt.
    #[serde(with = "duration_ms")]
    pub reconnect_delay: Duration,
    /// Largest accepted encoded point, in bytes.
    pub max_point_size: usize,
    /// Bound the batch payload by `static_buffer_size`.
    pub use_static_buffer: bool,
    /// Batch payload budget in bytes when `use_static_buffer` is set.
    pub static_buffer_size: usize,
    /// Enter deep sleep from `manage_power`.
    pub use_low_power_mode: bool,
    /// Deep sleep length. Zero disables sleeping.
    #[serde(with = "duration_ms")]
    pub deep_sleep_duration: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_retries: 3,
            retry_delay: Duration::from_millis(1000),
            backoff: Backoff::Fixed,
            timeout: Duration::from_millis(5000),
            debug_mode: false,
            auto_reconnect: true,
            reconnect_delay: Duration::from_millis(5000),
            max_point_size: 1024,
            use_static_buffer: false,
            static_buffer_size: 2048,
            use_low_power_mode: false,
            deep_sleep_duration: Duration::ZERO,
        }
    }
}

impl Config {
    /// Reads a JSON config file. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Load`] or [`ConfigError::Parse`] if the file
    /// cannot be read or parsed, or [`ConfigError::Invalid`] if the values fail
    /// [`validate`](Self::validate).
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path).map_err(|e| ConfigError::Load {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: Self = serde_json::from_str(&data).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that the values are usable together.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] describing the first problem.
    pub fn validate(&self) -> Result<()> {
        if self.timeout.is_zero() {
            return Err(invalid("timeout must be greater than zero"));
        }
        if self.max_point_size == 0 {
            return Err(invalid("max_point_size must be greater than zero"));
        }
        if self.use_static_buffer && self.static_buffer_size < self.max_point_size {
            return Err(invalid(format!(
                "static_buffer_size ({}) must hold at least one point of max_point_size ({})",
                self.static_buffer_size, self.max_point_size
            )));
        }
        match self.backoff {
            Backoff::Exponential { factor: 0, .. } => {
                return Err(invalid("exponential backoff factor must be at least 1"));
            }
            Backoff::Jittered { spread } if spread > self.retry_delay => {
                return Err(invalid("jitter spread must not exceed retry_delay"));
            }
            _ => {}
        }
        Ok(())
    }

    /// The retry policy described by this config.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_retries, self.retry_delay).with_backoff(self.backoff)
    }

    /// Payload budget for the batch buffer, if one applies.
    pub fn batch_byte_limit(&self) -> Option<usize> {
        self.use_static_buffer.then_some(self.static_buffer_size)
    }

    /// Sets the maximum number of retries.
    #[must_use]
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Sets the base delay between attempts.
    #[must_use]
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Sets the backoff strategy.
    #[must_use]
    pub fn with_backoff(mut self, backoff: Backoff) -> Self {
        self.backoff = backoff;
        self
    }

    /// Sets the transport timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Enables or disables debug-level error reporting.
    #[must_use]
    pub fn with_debug_mode(mut self, enabled: bool) -> Self {
        self.debug_mode = enabled;
        self
    }

    /// Enables or disables automatic reconnection.
    #[must_use]
    pub fn with_auto_reconnect(mut self, enabled: bool) -> Self {
        self.auto_reconnect = enabled;
        self
    }

    /// Sets the wait before a reconnection attempt.
    #[must_use]
    pub fn with_reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay = delay;
        self
    }

    /// Sets the maximum encoded point size.
    #[must_use]
    pub fn with_max_point_size(mut self, bytes: usize) -> Self {
        self.max_point_size = bytes;
        self
    }

    /// Bounds the batch payload to `bytes`.
    #[must_use]
    pub fn with_static_buffer(mut self, bytes: usize) -> Self {
        self.use_static_buffer = true;
        self.static_buffer_size = bytes;
        self
    }

    /// Enables low-power mode with the given deep sleep duration.
    #[must_use]
    pub fn with_low_power(mut self, deep_sleep: Duration) -> Self {
        self.use_low_power_mode = true;
        self.deep_sleep_duration = deep_sleep;
        self
    }
}

fn invalid(reason: impl Into<String>) -> crate::error::PointlineError {
    ConfigError::Invalid {
        reason: reason.into(),
    }
    .into()
}

/// Serializes a [`Duration`] as integer milliseconds.
pub(crate) mod duration_ms {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(u64::try_from(value.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
