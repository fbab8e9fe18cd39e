//! # pointline
//!
//! Line-protocol point writer for constrained sensor devices.
//!
//! pointline encodes measurements into the InfluxDB line protocol, attaches a
//! bounded set of device tags, optionally accumulates points into a bounded
//! batch, and sends them to a v2 write endpoint through a pluggable transport
//! with bounded retries.
//!
//! **Status**: This crate is in early development. The API is not yet stable.
//!
//! ## Key Properties
//!
//! - Bounded memory: at most 10 tags, 50 batched points and a configurable
//!   point size
//! - One status classification for every response: fail fast on auth and
//!   data errors, retry on server and network errors
//! - A last-error slot per client, alongside `Result` returns
//! - Network, clock, delays and deep sleep all behind traits, so the whole
//!   write path runs without a network in tests
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! # #[cfg(feature = "http")]
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use pointline::{Client, Credentials, Device, Location};
//! use pointline::transport::http::HttpTransport;
//!
//! let mut client = Client::new(
//!     Credentials::new("my-token", "acme", "sensors"),
//!     HttpTransport::new()?,
//! );
//! client.begin("https://cloud2.influxdata.com")?;
//! client.validate_credentials()?;
//!
//! client.set_device(Device::new(
//!     "esp32-01",
//!     Location::new("HQ", "2", "201", ""),
//!     "climate",
//!     "",
//! ));
//!
//! // Immediate write
//! client.write_point("temperature", "value", 23.5)?;
//!
//! // Batched write: one request for both points
//! client.begin_batch();
//! client.write_point("humidity", "value", 41)?;
//! client.write_point("door", "state", "open")?;
//! client.end_batch()?;
//! # Ok(())
//! # }
//! # #[cfg(not(feature = "http"))]
//! # fn main() {}
//! ```
//!
//! ## Architecture
//!
//! - [`Client`] — Per-device handle; owns tags, batch, config and error slot
//! - [`Transport`] — Network seam; the `http` feature provides a `reqwest`
//!   implementation
//! - [`Config`] — Retry, timeout, size and power settings, loadable from JSON
//! - [`RetryPolicy`] — Bounded retry loop with fixed, exponential or jittered
//!   delays
//!
//! ## Modules
//!
//! - [`line`] — Escaping and line-protocol encoding
//! - [`point`] — Field values, measurements and time units
//! - [`tags`] — Bounded tag set
//! - [`device`] — Device identity and location
//! - [`batch`] — Bounded batch buffer
//! - [`retry`] — Retry policy and backoff
//! - [`config`] — Client configuration
//! - [`transport`] — Transport trait, endpoints and status classification
//! - [`clock`] — Timestamp sources
//! - [`power`] — Deep sleep seam
//! - [`error`] — Error codes, error types and the last-error slot

pub mod batch;
pub mod client;
pub mod clock;
pub mod config;
pub mod device;
pub mod error;
pub mod line;
pub mod point;
pub mod power;
pub mod retry;
pub mod tags;
pub mod transport;

// Re-export primary API types at crate root for convenience.
pub use batch::{BatchBuffer, BatchState, MAX_BATCH_SIZE};
pub use client::Client;
pub use clock::{Clock, FixedClock, SystemClock, UptimeClock};
pub use config::Config;
pub use device::{Device, Location};
pub use error::{ErrorCode, ErrorState, PointlineError, Result};
pub use point::{FieldValue, Measurement, TimeUnit};
pub use power::{PowerControl, ThreadSuspend};
pub use retry::{Attempt, Backoff, RetryPolicy, Sleeper, ThreadSleeper};
pub use tags::{MAX_TAGS, Tag, TagSet};
pub use transport::{Credentials, Response, Transport, WriteRequest};
