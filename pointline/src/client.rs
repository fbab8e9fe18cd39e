//! The per-device client.
//!
//! A [`Client`] exclusively owns everything a device needs to report points:
//! its tag set, batch buffer, last-error slot, bound [`Device`] and [`Config`].
//! All methods take `&mut self`, so one instance is driven by one caller at a
//! time.
//!
//! # Write path
//!
//! Every write runs **validate → encode → size check → dispatch**:
//!
//! 1. Empty or oversized names, keys and values are rejected as
//!    [`ErrorCode::InvalidData`] before anything is encoded.
//! 2. The point is rendered with the current tags.
//! 3. A line longer than [`Config::max_point_size`] is rejected.
//! 4. While batching, the line is buffered. Otherwise it is sent through the
//!    [`RetryPolicy`](crate::retry::RetryPolicy) built from the config.
//!
//! Each write operation clears the error slot on entry and records any failure
//! in it, so [`Client::last_error`] always describes the most recent call.
//!
//! # Example
//!
//! ```rust,no_run
//! use pointline::client::Client;
//! use pointline::device::{Device, Location};
//! use pointline::transport::Credentials;
//! # use pointline::transport::{Response, Transport, WriteRequest};
//! # use pointline::error::TransportError;
//! # use std::time::Duration;
//! # struct Link;
//! # impl Transport for Link {
//! #     fn is_connected(&mut self) -> bool { true }
//! #     fn send(&mut self, _: &WriteRequest<'_>) -> Result<Response, TransportError> {
//! #         Ok(Response::new(204, ""))
//! #     }
//! #     fn health_check(&mut self, _: &str, _: &str, _: Duration) -> Result<Response, TransportError> {
//! #         Ok(Response::new(200, ""))
//! #     }
//! # }
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut client = Client::new(Credentials::new("token", "acme", "sensors"), Link);
//! client.begin("https://cloud2.influxdata.com")?;
//!
//! client.set_device(Device::new("d1", Location::new("B1", "2", "201", ""), "sensor", ""));
//! client.write_point("temperature", "value", 23.5)?;
//!
//! client.begin_batch();
//! client.write_point("humidity", "value", 41)?;
//! client.write_point("status", "state", "ok")?;
//! client.end_batch()?;
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use crate::batch::BatchBuffer;
use crate::clock::{Clock, UptimeClock};
use crate::config::Config;
use crate::device::Device;
use crate::error::{
    ConfigError, ErrorCode, ErrorState, PointlineError, Result, TransportError, ValidationError,
};
use crate::line;
use crate::point::{
    FieldValue, MAX_FIELD_KEY_LEN, MAX_MEASUREMENT_LEN, Measurement, TimeUnit, check_required,
};
use crate::power::PowerControl;
use crate::retry::{Attempt, Sleeper, ThreadSleeper};
use crate::tags::{MAX_TAG_KEY_LEN, MAX_TAG_VALUE_LEN, TagSet};
use crate::transport::{Credentials, Transport, WriteRequest, check_status, health_url};

/// Single-device, single-destination point writer.
pub struct Client<T: Transport> {
    credentials: Credentials,
    /// Set by `begin`; `None` means not started.
    write_url: Option<String>,
    transport: T,
    config: Config,
    tags: TagSet,
    batch: BatchBuffer,
    errors: ErrorState,
    device: Option<Device>,
    /// Unit used when stamping points from the clock.
    time_unit: TimeUnit,
    clock: Box<dyn Clock>,
    sleeper: Box<dyn Sleeper>,
}

impl<T: Transport> Client<T> {
    /// Creates a client with the default config, an uptime clock and
    /// thread-blocking retry delays.
    pub fn new(credentials: Credentials, transport: T) -> Self {
        Self {
            credentials,
            write_url: None,
            transport,
            config: Config::default(),
            tags: TagSet::new(),
            batch: BatchBuffer::new(),
            errors: ErrorState::new(),
            device: None,
            time_unit: TimeUnit::Milliseconds,
            clock: Box::new(UptimeClock::new()),
            sleeper: Box::new(ThreadSleeper),
        }
    }

    /// Replaces the timestamp source.
    #[must_use]
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Replaces the suspension point used between retries and before
    /// reconnecting.
    #[must_use]
    pub fn with_sleeper(mut self, sleeper: impl Sleeper + 'static) -> Self {
        self.sleeper = Box::new(sleeper);
        self
    }

    // --- connection ---

    /// Builds the write URL from `base_url` and checks the link.
    ///
    /// The URL is kept even if the link is down, so a later reconnect can
    /// proceed without calling `begin` again.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::NotConnected`] if the link is down.
    pub fn begin(&mut self, base_url: &str) -> Result<()> {
        self.errors.clear();
        let url = self.credentials.write_url(base_url);
        tracing::debug!(url = %url, "client started");
        self.write_url = Some(url);

        let result = if self.transport.is_connected() {
            Ok(())
        } else {
            Err(TransportError::NotConnected.into())
        };
        self.track(result)
    }

    /// The write URL, once started.
    pub fn write_url(&self) -> Option<&str> {
        self.write_url.as_deref()
    }

    /// Returns `true` if the transport reports the link up.
    pub fn is_connected(&mut self) -> bool {
        self.transport.is_connected()
    }

    /// Asks the transport to re-establish the link now.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::NotConnected`] if the link stays down.
    pub fn reconnect(&mut self) -> Result<()> {
        self.errors.clear();
        let result = if self.transport.reconnect() {
            Ok(())
        } else {
            Err(TransportError::NotConnected.into())
        };
        self.track(result)
    }

    /// Enables or disables reconnection before sends.
    pub fn set_auto_reconnect(&mut self, enabled: bool) {
        self.config.auto_reconnect = enabled;
    }

    /// Whether reconnection before sends is enabled.
    pub fn auto_reconnect(&self) -> bool {
        self.config.auto_reconnect
    }

    /// Checks the token against the health endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotStarted`] before `begin`,
    /// [`TransportError::NotConnected`] if the link is down, the transport
    /// error if the request fails, or the classified status error for a
    /// non-2xx answer: [`TransportError::Auth`] for 401 and 403,
    /// [`TransportError::HttpStatus`] for server errors.
    pub fn validate_credentials(&mut self) -> Result<()> {
        self.errors.clear();
        let result = self.check_health();
        self.track(result)
    }

    fn check_health(&mut self) -> Result<()> {
        let url = health_url(self.write_url.as_deref().ok_or(ConfigError::NotStarted)?);
        if !self.transport.is_connected() {
            return Err(TransportError::NotConnected.into());
        }

        let response =
            self.transport
                .health_check(&url, &self.credentials.token, self.config.timeout)?;
        check_status(response)?;
        Ok(())
    }

    // --- configuration ---

    /// Replaces the config.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] and keeps the previous config if
    /// validation fails.
    pub fn set_config(&mut self, config: Config) -> Result<()> {
        let result = config.validate();
        if result.is_ok() {
            self.batch.set_byte_limit(config.batch_byte_limit());
            self.config = config;
        }
        self.track(result)
    }

    /// The current config.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Sets the unit used when stamping points from the clock.
    pub fn set_time_unit(&mut self, unit: TimeUnit) {
        self.time_unit = unit;
    }

    /// The unit used when stamping points from the clock.
    pub fn time_unit(&self) -> TimeUnit {
        self.time_unit
    }

    /// The clock reading in [`time_unit`](Self::time_unit).
    pub fn current_timestamp(&self) -> u64 {
        self.time_unit.units_in(self.clock.now())
    }

    // --- errors ---

    /// Code of the last failure, or [`ErrorCode::NoError`].
    pub fn last_error(&self) -> ErrorCode {
        self.errors.code()
    }

    /// Message of the last failure.
    pub fn last_error_message(&self) -> &str {
        self.errors.message()
    }

    /// The last-error slot.
    pub fn error_state(&self) -> &ErrorState {
        &self.errors
    }

    /// Resets the last-error slot.
    pub fn clear_error(&mut self) {
        self.errors.clear();
    }

    // --- tags and identity ---

    /// Appends a tag to every subsequent point.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] for an empty or oversized key or value, or
    /// [`TagError::Full`](crate::error::TagError::Full) when the set holds
    /// [`MAX_TAGS`](crate::tags::MAX_TAGS) tags.
    pub fn add_tag(&mut self, key: &str, value: &str) -> Result<()> {
        let result = check_required("tag key", key, MAX_TAG_KEY_LEN)
            .and_then(|()| check_required("tag value", value, MAX_TAG_VALUE_LEN))
            .map_err(PointlineError::from)
            .and_then(|()| self.tags.add(key, value).map_err(PointlineError::from));
        self.track(result)
    }

    /// Removes every tag.
    pub fn clear_tags(&mut self) {
        self.tags.clear();
    }

    /// The current tags in wire order.
    pub fn tags(&self) -> &TagSet {
        &self.tags
    }

    /// Binds a device identity.
    ///
    /// Clears every tag, including manually added ones, then adds `device` and
    /// `location` from the device when non-empty. The device is not validated;
    /// use [`Device::is_valid`] first if that matters.
    pub fn set_device(&mut self, device: Device) {
        self.tags.clear();
        for tag in device.tags() {
            // At most two tags into a just-cleared set.
            let _ = self.tags.add(tag.key, tag.value);
        }
        tracing::debug!(device = %device.id, tags = self.tags.len(), "device bound");
        self.device = Some(device);
    }

    /// The bound device.
    pub fn device(&self) -> Option<&Device> {
        self.device.as_ref()
    }

    // --- writes ---

    /// Writes one field stamped with the clock.
    ///
    /// # Errors
    ///
    /// See the module docs for the write path. Returns [`ValidationError`],
    /// [`BatchError`](crate::error::BatchError) while batching, or the
    /// transport outcome otherwise.
    pub fn write_point(
        &mut self,
        measurement: &str,
        field: &str,
        value: impl Into<FieldValue>,
    ) -> Result<()> {
        self.write_fields_inner(measurement, &[(field, value.into())], None)
    }

    /// Writes one field with an explicit timestamp. A zero timestamp means
    /// "now".
    ///
    /// # Errors
    ///
    /// As for [`write_point`](Self::write_point), plus
    /// [`ValidationError::TimestampOverflow`].
    pub fn write_point_at(
        &mut self,
        measurement: &str,
        field: &str,
        value: impl Into<FieldValue>,
        timestamp: u64,
        unit: TimeUnit,
    ) -> Result<()> {
        self.write_fields_inner(measurement, &[(field, value.into())], Some((timestamp, unit)))
    }

    /// Writes several fields as one point stamped with the clock.
    ///
    /// # Errors
    ///
    /// As for [`write_point`](Self::write_point), plus
    /// [`ValidationError::NoFields`].
    pub fn write_fields<K: AsRef<str>>(
        &mut self,
        measurement: &str,
        fields: &[(K, FieldValue)],
    ) -> Result<()> {
        self.write_fields_inner(measurement, fields, None)
    }

    /// Writes several fields as one point with an explicit timestamp.
    ///
    /// # Errors
    ///
    /// As for [`write_fields`](Self::write_fields).
    pub fn write_fields_at<K: AsRef<str>>(
        &mut self,
        measurement: &str,
        fields: &[(K, FieldValue)],
        timestamp: u64,
        unit: TimeUnit,
    ) -> Result<()> {
        self.write_fields_inner(measurement, fields, Some((timestamp, unit)))
    }

    /// Writes a [`Measurement`].
    ///
    /// # Errors
    ///
    /// As for [`write_point_at`](Self::write_point_at).
    pub fn write_measurement(&mut self, measurement: &Measurement) -> Result<()> {
        self.errors.clear();
        let result = self.write_measurement_unrecorded(measurement);
        self.track(result)
    }

    /// Writes measurements as one batch.
    ///
    /// If a batch is already open the measurements join it and nothing is
    /// sent. Otherwise a batch is opened, filled and flushed. Either way, if
    /// any measurement fails, the points added by this call are dropped and
    /// no network call is made.
    ///
    /// # Errors
    ///
    /// Returns the first write failure, or the flush outcome.
    pub fn write_measurements(&mut self, measurements: &[Measurement]) -> Result<()> {
        self.errors.clear();

        let nested = self.batch.is_batching();
        if !nested {
            self.batch.begin();
        }
        let start = self.batch.len();

        for measurement in measurements {
            if let Err(e) = self.write_measurement_unrecorded(measurement) {
                self.batch.truncate(start);
                if !nested {
                    self.batch.end();
                }
                return self.track(Err(e));
            }
        }

        if nested {
            return Ok(());
        }
        let result = self.flush_unrecorded();
        self.batch.end();
        self.track(result)
    }

    /// Encoded size of a point with the current tags, without encoding it.
    pub fn point_size(&self, measurement: &str, field: &str, value: &FieldValue) -> usize {
        let now = self
            .time_unit
            .to_nanos(self.current_timestamp())
            .unwrap_or(u64::MAX);
        line::point_size(
            measurement,
            self.tags.as_slice(),
            &[(field, value.clone())],
            now,
        )
    }

    // --- batching ---

    /// Starts accumulating writes instead of sending them.
    pub fn begin_batch(&mut self) {
        self.batch.begin();
    }

    /// Flushes the batch and stops batching.
    ///
    /// # Errors
    ///
    /// Returns the flush outcome. The buffer is empty afterwards either way.
    pub fn end_batch(&mut self) -> Result<()> {
        self.errors.clear();
        let result = self.flush_unrecorded();
        self.batch.end();
        self.track(result)
    }

    /// Drops buffered points without sending. Batching state is unchanged.
    pub fn clear_batch(&mut self) {
        self.batch.clear();
    }

    /// Sends buffered points as one payload. An empty buffer succeeds without
    /// a network call.
    ///
    /// # Errors
    ///
    /// Returns the send outcome. The buffer is empty afterwards either way.
    pub fn flush_batch(&mut self) -> Result<()> {
        self.errors.clear();
        let result = self.flush_unrecorded();
        self.track(result)
    }

    /// Number of buffered points.
    pub fn batch_len(&self) -> usize {
        self.batch.len()
    }

    /// Returns `true` while batching.
    pub fn is_batching(&self) -> bool {
        self.batch.is_batching()
    }

    /// Pre-allocates `bytes` for the batch payload.
    ///
    /// # Errors
    ///
    /// Returns [`BatchError`](crate::error::BatchError) (`MEMORY_ERROR`) if the
    /// request exceeds the static buffer or allocation fails.
    pub fn reserve_buffer(&mut self, bytes: usize) -> Result<()> {
        let result = self.batch.reserve(bytes).map_err(PointlineError::from);
        self.track(result)
    }

    /// Releases storage taken by [`reserve_buffer`](Self::reserve_buffer).
    pub fn free_buffer(&mut self) {
        self.batch.release();
    }

    // --- power ---

    /// Enables low-power mode with the given deep sleep duration.
    pub fn enable_power_saving(&mut self, duration: Duration) {
        self.config.use_low_power_mode = true;
        self.config.deep_sleep_duration = duration;
    }

    /// Flushes pending points, then deep-sleeps if low-power mode is on.
    ///
    /// Does nothing when low-power mode is off. The sleep happens even if the
    /// flush fails; a zero sleep duration skips the sleep.
    ///
    /// # Errors
    ///
    /// Returns the flush outcome.
    pub fn manage_power(&mut self, power: &mut dyn PowerControl) -> Result<()> {
        if !self.config.use_low_power_mode {
            return Ok(());
        }

        self.errors.clear();
        let result = self.flush_unrecorded();

        let duration = self.config.deep_sleep_duration;
        if !duration.is_zero() {
            tracing::info!(
                sleep_ms = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX),
                "entering deep sleep"
            );
            power.deep_sleep(duration);
        }
        self.track(result)
    }

    // --- collaborators ---

    /// The transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// The transport, mutably.
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    // --- internals ---

    fn write_fields_inner<K: AsRef<str>>(
        &mut self,
        measurement: &str,
        fields: &[(K, FieldValue)],
        timestamp: Option<(u64, TimeUnit)>,
    ) -> Result<()> {
        self.errors.clear();
        let result = self
            .encode_point(measurement, fields, timestamp)
            .and_then(|line| self.dispatch(line));
        self.track(result)
    }

    fn write_measurement_unrecorded(&mut self, measurement: &Measurement) -> Result<()> {
        measurement.validate()?;
        let fields = [(measurement.field.as_str(), measurement.value.clone())];
        let line = self.encode_point(
            &measurement.name,
            &fields,
            Some((measurement.time, measurement.unit)),
        )?;
        self.dispatch(line)
    }

    /// Validates, sizes and encodes one point.
    fn encode_point<K: AsRef<str>>(
        &self,
        measurement: &str,
        fields: &[(K, FieldValue)],
        timestamp: Option<(u64, TimeUnit)>,
    ) -> Result<String> {
        check_required("measurement", measurement, MAX_MEASUREMENT_LEN)?;
        if fields.is_empty() {
            return Err(ValidationError::NoFields.into());
        }
        for (key, value) in fields {
            check_required("field", key.as_ref(), MAX_FIELD_KEY_LEN)?;
            value.validate(key.as_ref())?;
        }

        let timestamp_ns = self.timestamp_nanos(timestamp)?;
        let tags = self.tags.as_slice();

        let size = line::point_size(measurement, tags, fields, timestamp_ns);
        if size > self.config.max_point_size {
            return Err(ValidationError::PointTooLarge {
                size,
                max: self.config.max_point_size,
            }
            .into());
        }

        Ok(line::encode(measurement, tags, fields, timestamp_ns))
    }

    /// Converts an explicit timestamp, or the clock reading, to nanoseconds.
    fn timestamp_nanos(&self, timestamp: Option<(u64, TimeUnit)>) -> Result<u64> {
        let (value, unit) = match timestamp {
            Some((t, unit)) if t != 0 => (t, unit),
            _ => (self.current_timestamp(), self.time_unit),
        };
        unit.to_nanos(value).ok_or_else(|| {
            ValidationError::TimestampOverflow {
                timestamp: value,
                unit,
            }
            .into()
        })
    }

    fn dispatch(&mut self, line: String) -> Result<()> {
        if self.batch.is_batching() {
            self.batch.add(line)?;
            return Ok(());
        }
        self.send_payload(&line)
    }

    fn flush_unrecorded(&mut self) -> Result<()> {
        let points = self.batch.len();
        let Some(payload) = self.batch.take_payload() else {
            return Ok(());
        };
        tracing::info!(points, bytes = payload.len(), "flushing batch");

        let result = self.send_payload(&payload);
        self.batch.recycle(payload);
        result
    }

    /// Makes sure the link is up, reconnecting once if allowed.
    fn ensure_connected(&mut self) -> Result<()> {
        if self.transport.is_connected() {
            return Ok(());
        }
        if !self.config.auto_reconnect {
            return Err(TransportError::NotConnected.into());
        }

        tracing::warn!(
            delay_ms = u64::try_from(self.config.reconnect_delay.as_millis()).unwrap_or(u64::MAX),
            "link down, reconnecting"
        );
        self.sleeper.sleep(self.config.reconnect_delay);
        if self.transport.reconnect() {
            Ok(())
        } else {
            Err(TransportError::NotConnected.into())
        }
    }

    /// Sends one payload through the retry policy.
    ///
    /// The error slot is updated after every failed attempt and cleared again
    /// if a later attempt succeeds.
    fn send_payload(&mut self, payload: &str) -> Result<()> {
        if self.write_url.is_none() {
            return Err(ConfigError::NotStarted.into());
        }
        self.ensure_connected()?;

        let policy = self.config.retry_policy();
        let request = WriteRequest {
            url: self.write_url.as_deref().unwrap_or_default(),
            token: &self.credentials.token,
            payload,
            timeout: self.config.timeout,
        };
        let transport = &mut self.transport;
        let errors = &mut self.errors;

        policy.run(self.sleeper.as_mut(), |attempt| {
            match transport.send(&request).and_then(check_status) {
                Ok(response) => {
                    tracing::debug!(
                        attempt,
                        status = response.status,
                        bytes = payload.len(),
                        "write accepted"
                    );
                    errors.clear();
                    Ok(())
                }
                Err(e) => {
                    let retryable = e.is_retryable();
                    let err = PointlineError::from(e);
                    tracing::debug!(attempt, retryable, code = %err.code(), "write failed: {err}");
                    errors.record(&err);
                    if retryable {
                        Err(Attempt::Retryable(err))
                    } else {
                        Err(Attempt::Fatal(err))
                    }
                }
            }
        })
    }

    /// Records a failure in the error slot and passes the result through.
    fn track<V>(&mut self, result: Result<V>) -> Result<V> {
        if let Err(e) = &result {
            self.errors.record(e);
            if self.config.debug_mode {
                tracing::warn!(code = %e.code(), "{e}");
            } else {
                tracing::debug!(code = %e.code(), "{e}");
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::device::Location;
    use crate::transport::Response;

    /// Accepts everything and remembers payloads.
    #[derive(Default)]
    struct Sink {
        payloads: Vec<String>,
    }

    impl Transport for Sink {
        fn is_connected(&mut self) -> bool {
            true
        }

        fn send(&mut self, request: &WriteRequest<'_>) -> std::result::Result<Response, TransportError> {
            self.payloads.push(request.payload.to_string());
            Ok(Response::new(204, ""))
        }

        fn health_check(
            &mut self,
            _url: &str,
            _token: &str,
            _timeout: Duration,
        ) -> std::result::Result<Response, TransportError> {
            Ok(Response::new(200, "ok"))
        }
    }

    fn client() -> Client<Sink> {
        let mut client = Client::new(Credentials::new("t", "o", "b"), Sink::default())
            .with_clock(FixedClock(Duration::from_millis(1_500)));
        client.begin("http://localhost:8086").unwrap();
        client
    }

    #[test]
    fn test_clock_timestamp_uses_time_unit() {
        let mut client = client();
        client.write_point("m", "v", 1).unwrap();
        client.set_time_unit(TimeUnit::Seconds);
        client.write_point("m", "v", 2).unwrap();

        let payloads = &client.transport().payloads;
        assert_eq!(payloads[0], "m v=1i 1500000000");
        // Truncated to whole seconds before scaling.
        assert_eq!(payloads[1], "m v=2i 1000000000");
    }

    #[test]
    fn test_explicit_timestamp() {
        let mut client = client();
        client
            .write_point_at("m", "v", 1.5, 1_700_000_000, TimeUnit::Seconds)
            .unwrap();
        assert_eq!(
            client.transport().payloads[0],
            "m v=1.5 1700000000000000000"
        );
    }

    #[test]
    fn test_timestamp_overflow_is_invalid_data() {
        let mut client = client();
        let err = client
            .write_point_at("m", "v", 1, u64::MAX, TimeUnit::Seconds)
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidData);
        assert!(client.transport().payloads.is_empty());
    }

    #[test]
    fn test_add_tag_validation() {
        let mut client = client();
        assert!(client.add_tag("", "x").is_err());
        assert_eq!(client.last_error(), ErrorCode::InvalidData);
        assert!(client.add_tag("k", &"v".repeat(129)).is_err());
        client.add_tag("k", "v").unwrap();
        assert_eq!(client.tags().len(), 1);
    }

    #[test]
    fn test_add_tag_full_is_memory_error() {
        let mut client = client();
        for i in 0..10 {
            client.add_tag(&format!("k{i}"), "v").unwrap();
        }
        let err = client.add_tag("k10", "v").unwrap_err();
        assert_eq!(err.code(), ErrorCode::MemoryError);
        assert_eq!(client.tags().len(), 10);
    }

    #[test]
    fn test_point_too_large() {
        let mut client = client();
        client
            .set_config(Config::default().with_max_point_size(16))
            .unwrap();
        let err = client.write_point("temperature", "value", 23.5).unwrap_err();
        assert!(matches!(
            err,
            PointlineError::Validation(ValidationError::PointTooLarge { max: 16, .. })
        ));
        assert!(client.transport().payloads.is_empty());
    }

    #[test]
    fn test_point_size_matches_sent_line() {
        let mut client = client();
        client.set_device(Device::new("d1", Location::new("B1", "", "", ""), "s", ""));
        let size = client.point_size("temp", "value", &FieldValue::from(23.5));
        client.write_point("temp", "value", 23.5).unwrap();
        assert_eq!(size, client.transport().payloads[0].len());
    }

    #[test]
    fn test_set_config_invalid_keeps_previous() {
        let mut client = client();
        let err = client
            .set_config(Config::default().with_timeout(Duration::ZERO))
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidConfig);
        assert_eq!(client.last_error(), ErrorCode::InvalidConfig);
        assert_eq!(client.config().timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_write_fields() {
        let mut client = client();
        client
            .write_fields(
                "env",
                &[("t", FieldValue::from(21.5)), ("h", FieldValue::from(40))],
            )
            .unwrap();
        assert_eq!(client.transport().payloads[0], "env t=21.5,h=40i 1500000000");

        let none: [(&str, FieldValue); 0] = [];
        let err = client.write_fields("env", &none).unwrap_err();
        assert!(matches!(
            err,
            PointlineError::Validation(ValidationError::NoFields)
        ));
    }

    #[test]
    fn test_validate_credentials_ok() {
        let mut client = client();
        client.validate_credentials().unwrap();
        assert_eq!(client.last_error(), ErrorCode::NoError);
    }
}
