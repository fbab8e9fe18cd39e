//! Integration tests for batching through the client.
//!
//! Covers payload joining, the 50-point bound, flush semantics on failure,
//! `write_measurements`, and the static payload budget.

mod common;

use common::{ScriptedTransport, started};
use pointline::{Config, ErrorCode, MAX_BATCH_SIZE, Measurement, TimeUnit};

#[test]
fn test_flush_joins_lines_with_newlines() {
    let (mut client, seen) = started(ScriptedTransport::new());
    client.begin_batch();
    assert!(client.is_batching());

    for i in 0..3 {
        client.write_point("m", "v", i).unwrap();
    }
    assert_eq!(seen.sends(), 0);
    assert_eq!(client.batch_len(), 3);

    client.flush_batch().unwrap();
    let payloads = seen.payloads();
    assert_eq!(payloads.len(), 1);
    assert_eq!(
        payloads[0],
        "m v=0i 1500000000\nm v=1i 1500000000\nm v=2i 1500000000"
    );
    assert_eq!(payloads[0].matches('\n').count(), 2);
    assert!(!payloads[0].ends_with('\n'));

    // Flushing keeps the batch open.
    assert!(client.is_batching());
    assert_eq!(client.batch_len(), 0);
}

#[test]
fn test_batch_full_at_capacity() {
    let (mut client, seen) = started(ScriptedTransport::new());
    client.begin_batch();
    for i in 0..MAX_BATCH_SIZE {
        client.write_point("m", "v", i as i64).unwrap();
    }

    let err = client.write_point("m", "v", 99).unwrap_err();
    assert_eq!(err.code(), ErrorCode::BatchFull);
    assert_eq!(client.last_error(), ErrorCode::BatchFull);
    assert_eq!(client.batch_len(), MAX_BATCH_SIZE);

    client.end_batch().unwrap();
    let payloads = seen.payloads();
    assert_eq!(payloads[0].lines().count(), MAX_BATCH_SIZE);
}

#[test]
fn test_flush_clears_buffer_even_on_failure() {
    let (mut client, seen) = started(ScriptedTransport::new().respond(400));
    client.begin_batch();
    client.write_point("m", "v", 1).unwrap();
    client.write_point("m", "v", 2).unwrap();

    let err = client.flush_batch().unwrap_err();
    assert_eq!(err.code(), ErrorCode::InvalidData);
    assert_eq!(client.batch_len(), 0);
    assert_eq!(seen.sends(), 1);

    // Nothing left to resend.
    client.flush_batch().unwrap();
    assert_eq!(seen.sends(), 1);
}

#[test]
fn test_flush_empty_batch_makes_no_call() {
    let (mut client, seen) = started(ScriptedTransport::new());
    client.flush_batch().unwrap();
    client.begin_batch();
    client.flush_batch().unwrap();
    assert_eq!(seen.sends(), 0);
}

#[test]
fn test_end_batch_flushes_and_stops_batching() {
    let (mut client, seen) = started(ScriptedTransport::new());
    client.begin_batch();
    client.write_point("a", "v", 1).unwrap();
    client.write_point("b", "v", 2).unwrap();
    client.end_batch().unwrap();

    assert!(!client.is_batching());
    assert_eq!(seen.sends(), 1);

    // Back to immediate sends.
    client.write_point("c", "v", 3).unwrap();
    assert_eq!(seen.sends(), 2);
}

#[test]
fn test_end_batch_while_idle_succeeds() {
    let (mut client, seen) = started(ScriptedTransport::new());
    client.end_batch().unwrap();
    assert_eq!(seen.sends(), 0);
    assert!(!client.is_batching());
}

#[test]
fn test_end_batch_stops_batching_on_failure() {
    let (mut client, _seen) = started(ScriptedTransport::new().respond(401));
    client.begin_batch();
    client.write_point("m", "v", 1).unwrap();

    let err = client.end_batch().unwrap_err();
    assert_eq!(err.code(), ErrorCode::AuthError);
    assert!(!client.is_batching());
    assert_eq!(client.batch_len(), 0);
}

#[test]
fn test_clear_batch_keeps_batching() {
    let (mut client, seen) = started(ScriptedTransport::new());
    client.begin_batch();
    client.write_point("m", "v", 1).unwrap();
    client.clear_batch();

    assert!(client.is_batching());
    assert_eq!(client.batch_len(), 0);
    client.end_batch().unwrap();
    assert_eq!(seen.sends(), 0);
}

#[test]
fn test_write_measurements_sends_one_payload() {
    let (mut client, seen) = started(ScriptedTransport::new());
    let measurements = [
        Measurement::new("temp", "value", 21.5),
        Measurement::new("hum", "value", 40),
        Measurement::new("door", "state", "open").at(9, TimeUnit::Seconds),
    ];
    client.write_measurements(&measurements).unwrap();

    assert_eq!(
        seen.payloads(),
        ["temp value=21.5 1500000000\nhum value=40i 1500000000\ndoor state=\"open\" 9000000000"]
    );
    assert!(!client.is_batching());
}

#[test]
fn test_write_measurements_invalid_item_sends_nothing() {
    let (mut client, seen) = started(ScriptedTransport::new());
    let measurements = [
        Measurement::new("temp", "value", 21.5),
        Measurement::new("hum", "value", f64::INFINITY),
    ];

    let err = client.write_measurements(&measurements).unwrap_err();
    assert_eq!(err.code(), ErrorCode::InvalidData);
    assert_eq!(seen.sends(), 0);
    assert_eq!(client.batch_len(), 0);
    assert!(!client.is_batching());
}

#[test]
fn test_write_measurements_over_capacity() {
    let (mut client, seen) = started(ScriptedTransport::new());
    let measurements: Vec<_> = (0..=MAX_BATCH_SIZE as i64)
        .map(|i| Measurement::new("m", "v", i))
        .collect();

    let err = client.write_measurements(&measurements).unwrap_err();
    assert_eq!(err.code(), ErrorCode::BatchFull);
    assert_eq!(seen.sends(), 0);
}

#[test]
fn test_write_measurements_joins_open_batch() {
    let (mut client, seen) = started(ScriptedTransport::new());
    client.begin_batch();
    client.write_point("first", "v", 1).unwrap();
    client
        .write_measurements(&[Measurement::new("second", "v", 2)])
        .unwrap();

    assert_eq!(seen.sends(), 0);
    assert_eq!(client.batch_len(), 2);
    assert!(client.is_batching());

    client.end_batch().unwrap();
    assert_eq!(
        seen.payloads(),
        ["first v=1i 1500000000\nsecond v=2i 1500000000"]
    );
}

#[test]
fn test_write_measurements_failure_in_open_batch_keeps_earlier_points() {
    let (mut client, seen) = started(ScriptedTransport::new());
    client.begin_batch();
    client.write_point("first", "v", 1).unwrap();

    let measurements = [
        Measurement::new("second", "v", 2),
        Measurement::new("third", "v", 3),
        Measurement::new("", "v", 4),
    ];
    let err = client.write_measurements(&measurements).unwrap_err();
    assert_eq!(err.code(), ErrorCode::InvalidData);
    assert_eq!(client.batch_len(), 1);
    assert!(client.is_batching());

    client.end_batch().unwrap();
    assert_eq!(seen.payloads(), ["first v=1i 1500000000"]);
}

#[test]
fn test_static_buffer_bounds_payload() {
    let (mut client, seen) = started(ScriptedTransport::new());
    client
        .set_config(
            Config::default()
                .with_max_point_size(64)
                .with_static_buffer(64),
        )
        .unwrap();

    client.begin_batch();
    // Each line is 17 bytes: 3 lines plus separators use 53 of 64.
    for i in 0..3 {
        client.write_point("m", "v", i).unwrap();
    }
    let err = client.write_point("m", "v", 3).unwrap_err();
    assert_eq!(err.code(), ErrorCode::MemoryError);
    assert_eq!(client.batch_len(), 3);

    client.end_batch().unwrap();
    assert_eq!(seen.payloads()[0].len(), 53);
}

#[test]
fn test_static_buffer_smaller_than_point_is_rejected() {
    let (mut client, _seen) = started(ScriptedTransport::new());
    let err = client
        .set_config(Config::default().with_static_buffer(512))
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::InvalidConfig);
    assert!(!client.config().use_static_buffer);
}

#[test]
fn test_reserve_buffer() {
    let (mut client, _seen) = started(ScriptedTransport::new());
    client.reserve_buffer(4096).unwrap();
    client.free_buffer();

    client
        .set_config(
            Config::default()
                .with_max_point_size(256)
                .with_static_buffer(1024),
        )
        .unwrap();
    client.reserve_buffer(1024).unwrap();
    let err = client.reserve_buffer(1025).unwrap_err();
    assert_eq!(err.code(), ErrorCode::MemoryError);
    assert_eq!(client.last_error(), ErrorCode::MemoryError);
}
