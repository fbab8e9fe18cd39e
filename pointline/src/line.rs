//! Line-protocol encoder.
//!
//! Renders one point as
//!
//! ```text
//! measurement[,tag_key=tag_value,...] field_key=field_value[,...] timestamp
//! ```
//!
//! Space, comma and `=` are backslash-escaped in the measurement name, tag
//! keys, tag values, field keys and string field values. Escaping is a single
//! forward pass and is not idempotent: callers hand the encoder raw text and
//! must not pre-escape it.
//!
//! The encoder does not validate. Emptiness and length bounds are checked by
//! the write path before anything is encoded.
//!
//! # Example
//!
//! ```rust
//! use pointline::line;
//! use pointline::point::FieldValue;
//! use pointline::tags::Tag;
//!
//! let tags = [Tag::new("device", "d1")];
//! let out = line::encode("temp", &tags, &[("value", FieldValue::from(23.5))], 1_000);
//! assert_eq!(out, "temp,device=d1 value=23.5 1000");
//! ```

use std::fmt::Write as _;

use crate::point::FieldValue;
use crate::tags::Tag;

/// Characters that receive a backslash prefix.
const ESCAPED: &[char] = &[' ', ',', '='];

fn needs_escape(c: char) -> bool {
    ESCAPED.contains(&c)
}

/// Appends `s` to `out`, prefixing each special character with a backslash.
pub fn escape_into(s: &str, out: &mut String) {
    for c in s.chars() {
        if needs_escape(c) {
            out.push('\\');
        }
        out.push(c);
    }
}

/// Returns an escaped copy of `s`.
pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(escaped_len(s));
    escape_into(s, &mut out);
    out
}

/// Byte length of `s` after escaping.
pub fn escaped_len(s: &str) -> usize {
    s.len() + s.chars().filter(|&c| needs_escape(c)).count()
}

/// Byte length of the line [`encode`] would produce.
pub fn point_size<K: AsRef<str>>(
    measurement: &str,
    tags: &[Tag],
    fields: &[(K, FieldValue)],
    timestamp_ns: u64,
) -> usize {
    let tags_len: usize = tags
        .iter()
        .map(|t| 2 + escaped_len(&t.key) + escaped_len(&t.value))
        .sum();
    let fields_len: usize = fields
        .iter()
        .map(|(k, v)| 1 + escaped_len(k.as_ref()) + v.rendered_len())
        .sum::<usize>()
        + fields.len().saturating_sub(1);

    escaped_len(measurement) + tags_len + 1 + fields_len + 1 + digits(timestamp_ns)
}

/// Encodes one point into a new string.
///
/// `timestamp_ns` is already in nanoseconds; unit conversion happens in the
/// write path.
pub fn encode<K: AsRef<str>>(
    measurement: &str,
    tags: &[Tag],
    fields: &[(K, FieldValue)],
    timestamp_ns: u64,
) -> String {
    let mut line = String::with_capacity(point_size(measurement, tags, fields, timestamp_ns));
    encode_into(&mut line, measurement, tags, fields, timestamp_ns);
    line
}

/// Encodes one point, appending to `out`.
pub fn encode_into<K: AsRef<str>>(
    out: &mut String,
    measurement: &str,
    tags: &[Tag],
    fields: &[(K, FieldValue)],
    timestamp_ns: u64,
) {
    escape_into(measurement, out);

    for tag in tags {
        out.push(',');
        escape_into(&tag.key, out);
        out.push('=');
        escape_into(&tag.value, out);
    }

    out.push(' ');
    for (i, (key, value)) in fields.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        escape_into(key.as_ref(), out);
        out.push('=');
        value.write_to(out);
    }

    let _ = write!(out, " {timestamp_ns}");
}

fn digits(mut n: u64) -> usize {
    let mut count = 1;
    while n >= 10 {
        n /= 10;
        count += 1;
    }
    count
}
