//! Span and anchor types for buffer locations.

use serde::{Deserialize, Serialize};

/// A span representing a range in a text buffer.
///
/// Uses character offsets (0-indexed), not byte offsets, since that is what
/// the offset mapper produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Span {
    /// Start character offset (inclusive).
    pub start: usize,
    /// End character offset (exclusive).
    pub end: usize,
}

impl Span {
    /// Creates a new span.
    #[inline]
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Returns the length of the span in characters.
    #[inline]
    pub const fn len(&self) -> usize {
        self.end - self.start
    }

    /// Returns true if the span is empty.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Returns true if this span contains the given offset.
    #[inline]
    pub const fn contains(&self, offset: usize) -> bool {
        self.start <= offset && offset < self.end
    }
}

/// Where a resolved problem is attached inside its buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Anchor {
    /// An addressable element of the buffer.
    Element(Span),
    /// The buffer as a whole, used when the offset has no element.
    WholeBuffer,
}

impl Anchor {
    /// Returns the element span, if any.
    pub fn span(&self) -> Option<Span> {
        match self {
            Anchor::Element(span) => Some(*span),
            Anchor::WholeBuffer => None,
        }
    }
}
