//! Bounded buffer of pre-encoded lines.
//!
//! The buffer has two states. While *idle*, writes bypass it and go straight to
//! the transport. While *batching*, writes are appended here and nothing
//! touches the network until the batch is flushed.
//!
//! Flushing hands out the newline-joined payload and empties the buffer before
//! the send is attempted, so a failed send discards the batch. That trade-off
//! keeps memory bounded on devices that cannot hold unsent data indefinitely.

use crate::error::BatchError;

/// Maximum number of buffered lines.
pub const MAX_BATCH_SIZE: usize = 50;

/// Whether writes are being accumulated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BatchState {
    /// Writes are sent immediately.
    #[default]
    Idle,
    /// Writes are appended to the buffer.
    Batching,
}

/// Fixed-capacity queue of encoded lines.
#[derive(Debug)]
pub struct BatchBuffer {
    lines: Vec<String>,
    state: BatchState,
    /// Joined payload size of the buffered lines, separators included.
    payload_len: usize,
    /// Optional cap on `payload_len` (the static buffer size).
    byte_limit: Option<usize>,
    /// Reusable payload storage.
    payload: String,
}

impl BatchBuffer {
    /// Creates an idle, empty buffer with no byte limit.
    pub fn new() -> Self {
        Self {
            lines: Vec::with_capacity(MAX_BATCH_SIZE),
            state: BatchState::Idle,
            payload_len: 0,
            byte_limit: None,
            payload: String::new(),
        }
    }

    /// Caps the joined payload size. `None` removes the cap.
    pub fn set_byte_limit(&mut self, limit: Option<usize>) {
        self.byte_limit = limit;
    }

    /// Returns the payload cap, if any.
    pub fn byte_limit(&self) -> Option<usize> {
        self.byte_limit
    }

    /// Enters the batching state.
    pub fn begin(&mut self) {
        self.state = BatchState::Batching;
    }

    /// Returns to the idle state. Buffered lines are kept.
    pub fn end(&mut self) {
        self.state = BatchState::Idle;
    }

    /// Current state.
    pub fn state(&self) -> BatchState {
        self.state
    }

    /// Returns `true` while batching.
    pub fn is_batching(&self) -> bool {
        self.state == BatchState::Batching
    }

    /// Appends an encoded line.
    ///
    /// # Errors
    ///
    /// Returns [`BatchError::Full`] at [`MAX_BATCH_SIZE`] lines, or
    /// [`BatchError::BufferExhausted`] if the joined payload would exceed the
    /// byte limit. Existing entries are never discarded.
    pub fn add(&mut self, line: String) -> Result<(), BatchError> {
        if self.lines.len() >= MAX_BATCH_SIZE {
            return Err(BatchError::Full {
                capacity: MAX_BATCH_SIZE,
            });
        }

        let separator = usize::from(!self.lines.is_empty());
        let needed = self.payload_len + separator + line.len();
        if let Some(limit) = self.byte_limit
            && needed > limit
        {
            return Err(BatchError::BufferExhausted { needed, limit });
        }

        self.lines.push(line);
        self.payload_len = needed;
        Ok(())
    }

    /// Drops every buffered line without sending. The state is unchanged.
    pub fn clear(&mut self) {
        self.lines.clear();
        self.payload_len = 0;
    }

    /// Drops lines past the first `len`. The state is unchanged.
    pub fn truncate(&mut self, len: usize) {
        if len >= self.lines.len() {
            return;
        }
        self.lines.truncate(len);
        let bytes: usize = self.lines.iter().map(String::len).sum();
        self.payload_len = bytes + len.saturating_sub(1);
    }

    /// Number of buffered lines.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Returns `true` if nothing is buffered.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Maximum number of lines.
    pub fn capacity(&self) -> usize {
        MAX_BATCH_SIZE
    }

    /// Size in bytes of the payload a flush would produce.
    pub fn payload_len(&self) -> usize {
        self.payload_len
    }

    /// Buffered lines in insertion order.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Joins the buffered lines with `\n` and empties the buffer.
    ///
    /// Returns `None` if the buffer is empty. Hand the string back with
    /// [`recycle`](Self::recycle) after sending to reuse its allocation.
    pub fn take_payload(&mut self) -> Option<String> {
        if self.lines.is_empty() {
            return None;
        }

        let mut payload = std::mem::take(&mut self.payload);
        payload.clear();
        payload.reserve(self.payload_len);
        for (i, line) in self.lines.iter().enumerate() {
            if i > 0 {
                payload.push('\n');
            }
            payload.push_str(line);
        }

        self.clear();
        Some(payload)
    }

    /// Returns a payload string's allocation for reuse.
    pub fn recycle(&mut self, mut payload: String) {
        payload.clear();
        if payload.capacity() > self.payload.capacity() {
            self.payload = payload;
        }
    }

    /// Pre-allocates `bytes` of payload storage.
    ///
    /// # Errors
    ///
    /// Returns [`BatchError::BufferExhausted`] if `bytes` exceeds the byte
    /// limit, or [`BatchError::ReserveFailed`] if allocation fails.
    pub fn reserve(&mut self, bytes: usize) -> Result<(), BatchError> {
        if let Some(limit) = self.byte_limit
            && bytes > limit
        {
            return Err(BatchError::BufferExhausted {
                needed: bytes,
                limit,
            });
        }
        self.payload
            .try_reserve(bytes)
            .map_err(|_| BatchError::ReserveFailed { bytes })
    }

    /// Releases pre-allocated payload storage.
    pub fn release(&mut self) {
        self.payload = String::new();
    }

    /// Bytes of pre-allocated payload storage.
    pub fn reserved(&self) -> usize {
        self.payload.capacity()
    }
}

impl Default for BatchBuffer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_transitions() {
        let mut batch = BatchBuffer::new();
        assert_eq!(batch.state(), BatchState::Idle);
        batch.begin();
        assert!(batch.is_batching());
        batch.add("a 1".to_string()).unwrap();
        batch.end();
        assert!(!batch.is_batching());
        assert_eq!(batch.len(), 1);
    }

    #[test]
    fn test_truncate_restores_payload_len() {
        let mut batch = BatchBuffer::new();
        batch.add("a 1".to_string()).unwrap();
        let before = batch.payload_len();
        batch.add("bb 2".to_string()).unwrap();
        batch.add("ccc 3".to_string()).unwrap();

        batch.truncate(1);
        assert_eq!(batch.len(), 1);
        assert_eq!(batch.payload_len(), before);

        batch.truncate(5);
        assert_eq!(batch.len(), 1);
        batch.truncate(0);
        assert!(batch.is_empty());
        assert_eq!(batch.payload_len(), 0);
    }

    #[test]
    fn test_add_beyond_capacity() {
        let mut batch = BatchBuffer::new();
        for i in 0..MAX_BATCH_SIZE {
            batch.add(format!("m v={i}i {i}")).unwrap();
        }
        let err = batch.add("m v=0i 0".to_string()).unwrap_err();
        assert_eq!(err, BatchError::Full { capacity: 50 });
        assert_eq!(batch.len(), 50);
        assert_eq!(batch.lines()[0], "m v=0i 0");
        assert_eq!(batch.lines()[49], "m v=49i 49");
    }

    #[test]
    fn test_take_payload_joins_with_newlines() {
        let mut batch = BatchBuffer::new();
        for line in ["a v=1i 1", "b v=2i 2", "c v=3i 3"] {
            batch.add(line.to_string()).unwrap();
        }
        assert_eq!(batch.payload_len(), 26);

        let payload = batch.take_payload().unwrap();
        assert_eq!(payload, "a v=1i 1\nb v=2i 2\nc v=3i 3");
        assert_eq!(payload.matches('\n').count(), 2);
        assert_eq!(payload.len(), 26);
        assert!(batch.is_empty());
        assert_eq!(batch.payload_len(), 0);
    }

    #[test]
    fn test_take_payload_empty() {
        let mut batch = BatchBuffer::new();
        assert!(batch.take_payload().is_none());
    }

    #[test]
    fn test_byte_limit() {
        let mut batch = BatchBuffer::new();
        batch.set_byte_limit(Some(10));
        batch.add("12345".to_string()).unwrap();
        batch.add("1234".to_string()).unwrap();
        let err = batch.add("1".to_string()).unwrap_err();
        assert_eq!(err, BatchError::BufferExhausted { needed: 12, limit: 10 });
        assert_eq!(batch.len(), 2);
    }

    #[test]
    fn test_clear_keeps_state() {
        let mut batch = BatchBuffer::new();
        batch.begin();
        batch.add("x".to_string()).unwrap();
        batch.clear();
        assert!(batch.is_empty());
        assert!(batch.is_batching());
    }

    #[test]
    fn test_reserve_and_recycle() {
        let mut batch = BatchBuffer::new();
        batch.reserve(256).unwrap();
        assert!(batch.reserved() >= 256);

        batch.add("x v=1i 1".to_string()).unwrap();
        let payload = batch.take_payload().unwrap();
        assert!(payload.capacity() >= 256);
        batch.recycle(payload);
        assert!(batch.reserved() >= 256);

        batch.release();
        assert_eq!(batch.reserved(), 0);
    }

    #[test]
    fn test_reserve_over_limit() {
        let mut batch = BatchBuffer::new();
        batch.set_byte_limit(Some(64));
        let err = batch.reserve(128).unwrap_err();
        assert_eq!(err, BatchError::BufferExhausted { needed: 128, limit: 64 });
    }
}
