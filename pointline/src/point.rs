//! Point-level types: field values, timestamp units and measurements.
//!
//! A [`FieldValue`] carries its own wire rendering rule, so the encoder has a
//! single path for strings, integers and floats. [`Measurement`] is the
//! self-describing form of a point used by `write_measurement`.

use std::fmt::{self, Write as _};
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::line;

/// Maximum measurement name length in bytes.
pub const MAX_MEASUREMENT_LEN: usize = 64;

/// Maximum field key length in bytes.
pub const MAX_FIELD_KEY_LEN: usize = 32;

/// Maximum field value length in bytes (raw for strings, rendered for numbers).
pub const MAX_FIELD_VALUE_LEN: usize = 64;

/// Unit of a caller-supplied timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    /// Seconds.
    Seconds,
    /// Milliseconds.
    #[default]
    Milliseconds,
    /// Microseconds.
    Microseconds,
    /// Nanoseconds (the wire granularity).
    Nanoseconds,
}

impl TimeUnit {
    /// Nanoseconds in one unit.
    pub const fn nanos_per_unit(self) -> u64 {
        match self {
            Self::Seconds => 1_000_000_000,
            Self::Milliseconds => 1_000_000,
            Self::Microseconds => 1_000,
            Self::Nanoseconds => 1,
        }
    }

    /// Converts a timestamp in this unit to nanoseconds.
    ///
    /// Returns `None` on `u64` overflow.
    pub fn to_nanos(self, timestamp: u64) -> Option<u64> {
        timestamp.checked_mul(self.nanos_per_unit())
    }

    /// Expresses a clock reading in this unit, truncating any remainder.
    #[allow(clippy::cast_possible_truncation)] // clamped to u64::MAX first
    pub fn units_in(self, elapsed: Duration) -> u64 {
        let units = elapsed.as_nanos() / u128::from(self.nanos_per_unit());
        units.min(u128::from(u64::MAX)) as u64
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Seconds => "s",
            Self::Milliseconds => "ms",
            Self::Microseconds => "us",
            Self::Nanoseconds => "ns",
        })
    }
}

impl FromStr for TimeUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "s" | "sec" | "seconds" => Ok(Self::Seconds),
            "ms" | "millis" | "milliseconds" => Ok(Self::Milliseconds),
            "us" | "micros" | "microseconds" => Ok(Self::Microseconds),
            "ns" | "nanos" | "nanoseconds" => Ok(Self::Nanoseconds),
            _ => Err(format!("unknown time unit '{s}'. Use s, ms, us or ns.")),
        }
    }
}

/// A typed field value.
///
/// Serialized untagged, so JSON `23` is an integer, `23.5` a float and `"23.5"`
/// a string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Signed integer, rendered with an `i` suffix.
    Integer(i64),
    /// Floating point, rendered as a bare decimal.
    Float(f64),
    /// Text, rendered escaped and double-quoted.
    String(String),
}

impl FieldValue {
    /// Appends the wire rendering of this value to `out`.
    pub fn write_to(&self, out: &mut String) {
        match self {
            Self::Integer(v) => {
                let _ = write!(out, "{v}i");
            }
            Self::Float(v) => {
                let _ = write!(out, "{v}");
            }
            Self::String(s) => {
                out.push('"');
                line::escape_into(s, out);
                out.push('"');
            }
        }
    }

    /// Byte length of the wire rendering.
    pub fn rendered_len(&self) -> usize {
        match self {
            Self::String(s) => line::escaped_len(s) + 2,
            _ => {
                let mut out = String::new();
                self.write_to(&mut out);
                out.len()
            }
        }
    }

    /// Checks emptiness, bounds and finiteness for a value stored under `field`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] for an empty or oversized string, a
    /// non-finite float, or a float whose rendering exceeds the bound.
    pub fn validate(&self, field: &str) -> Result<(), ValidationError> {
        match self {
            Self::String(s) => check_required("value", s, MAX_FIELD_VALUE_LEN),
            Self::Integer(_) => Ok(()),
            Self::Float(v) if !v.is_finite() => Err(ValidationError::NonFiniteFloat {
                field: field.to_string(),
                value: *v,
            }),
            Self::Float(_) => {
                let len = self.rendered_len();
                if len > MAX_FIELD_VALUE_LEN {
                    return Err(ValidationError::TooLong {
                        field: "value",
                        len,
                        max: MAX_FIELD_VALUE_LEN,
                    });
                }
                Ok(())
            }
        }
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        Self::Integer(v)
    }
}

impl From<i32> for FieldValue {
    fn from(v: i32) -> Self {
        Self::Integer(i64::from(v))
    }
}

impl From<u32> for FieldValue {
    fn from(v: u32) -> Self {
        Self::Integer(i64::from(v))
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<f32> for FieldValue {
    fn from(v: f32) -> Self {
        Self::Float(f64::from(v))
    }
}

/// A self-describing point: one field on one measurement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    /// Measurement name (e.g. `temperature`).
    pub name: String,
    /// Field key (e.g. `value`).
    pub field: String,
    /// Field value.
    pub value: FieldValue,
    /// Timestamp in `unit`; `0` means "use the client clock".
    #[serde(default)]
    pub time: u64,
    /// Unit of `time`.
    #[serde(default)]
    pub unit: TimeUnit,
}

impl Measurement {
    /// Creates a measurement stamped with the client clock at write time.
    pub fn new(
        name: impl Into<String>,
        field: impl Into<String>,
        value: impl Into<FieldValue>,
    ) -> Self {
        Self {
            name: name.into(),
            field: field.into(),
            value: value.into(),
            time: 0,
            unit: TimeUnit::default(),
        }
    }

    /// Sets an explicit timestamp.
    #[must_use]
    pub fn at(mut self, time: u64, unit: TimeUnit) -> Self {
        self.time = time;
        self.unit = unit;
        self
    }

    /// Checks the name, field key and value against their bounds.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] found.
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_required("measurement", &self.name, MAX_MEASUREMENT_LEN)?;
        check_required("field", &self.field, MAX_FIELD_KEY_LEN)?;
        self.value.validate(&self.field)
    }

    /// Returns `true` if [`validate`](Self::validate) passes.
    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }
}

/// Rejects an empty value or one longer than `max` bytes.
pub(crate) fn check_required(
    field: &'static str,
    value: &str,
    max: usize,
) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::Empty { field });
    }
    check_bounded(field, value, max)
}

/// Rejects a value longer than `max` bytes. Empty is allowed.
pub(crate) fn check_bounded(
    field: &'static str,
    value: &str,
    max: usize,
) -> Result<(), ValidationError> {
    if value.len() > max {
        return Err(ValidationError::TooLong {
            field,
            len: value.len(),
            max,
        });
    }
    Ok(())
}
