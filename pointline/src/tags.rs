//! Bounded, ordered tag storage.
//!
//! Tags are rendered in insertion order, so the order of `add` calls is the
//! order on the wire. Keys are not deduplicated: adding the same key twice
//! emits it twice.

use serde::{Deserialize, Serialize};

use crate::error::TagError;

/// Maximum number of tags attached to every point.
pub const MAX_TAGS: usize = 10;

/// Maximum tag key length in bytes, enforced by `Client::add_tag`.
pub const MAX_TAG_KEY_LEN: usize = 64;

/// Maximum tag value length in bytes, enforced by `Client::add_tag`.
pub const MAX_TAG_VALUE_LEN: usize = 128;

/// A key/value label attached to every emitted point.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tag {
    /// Tag key.
    pub key: String,
    /// Tag value.
    pub value: String,
}

impl Tag {
    /// Creates a new tag.
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Fixed-capacity ordered tag sequence.
///
/// Storage is allocated once at construction and never grows past
/// [`MAX_TAGS`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagSet {
    tags: Vec<Tag>,
}

impl TagSet {
    /// Creates an empty set with room for [`MAX_TAGS`] tags.
    pub fn new() -> Self {
        Self {
            tags: Vec::with_capacity(MAX_TAGS),
        }
    }

    /// Appends a tag.
    ///
    /// # Errors
    ///
    /// Returns [`TagError::Full`] if the set already holds [`MAX_TAGS`] tags.
    /// The set is left unchanged.
    pub fn add(&mut self, key: impl Into<String>, value: impl Into<String>) -> Result<(), TagError> {
        if self.tags.len() >= MAX_TAGS {
            return Err(TagError::Full { capacity: MAX_TAGS });
        }
        self.tags.push(Tag::new(key, value));
        Ok(())
    }

    /// Removes all tags.
    pub fn clear(&mut self) {
        self.tags.clear();
    }

    /// Number of tags held.
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    /// Returns `true` if no tags are held.
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Returns `true` if another `add` would fail.
    pub fn is_full(&self) -> bool {
        self.tags.len() >= MAX_TAGS
    }

    /// Maximum number of tags.
    pub fn capacity(&self) -> usize {
        MAX_TAGS
    }

    /// Tags in insertion order.
    pub fn as_slice(&self) -> &[Tag] {
        &self.tags
    }

    /// Iterates tags in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, Tag> {
        self.tags.iter()
    }
}

impl Default for TagSet {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> IntoIterator for &'a TagSet {
    type Item = &'a Tag;
    type IntoIter = std::slice::Iter<'a, Tag>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
