//! # lintbridge_text
//!
//! Text buffers and offset mapping for lintbridge.
//!
//! Analysis engines report problems as `(line, column)` pairs where the
//! column has already been expanded by the engine's tab width. Editors want
//! character offsets. This crate provides:
//! - [`TextBuffer`], the collaborator interface for buffers being analysed
//! - [`LineOffsetCache`], the per-file cache of known line starts
//! - [`OffsetMapper`], which turns engine coordinates into offsets
//!
//! ## Example
//!
//! ```rust
//! use lintbridge_text::{LineOffsetCache, OffsetMapper};
//!
//! let mapper = OffsetMapper::new(4);
//! let mut cache = LineOffsetCache::new();
//! let position = mapper.position(&mut cache, "a\n\tb", 2, 4);
//! assert_eq!(position.offset, 3);
//! ```

mod buffer;
mod line_cache;
mod mapper;
mod span;

pub use buffer::{SharedText, SourceText, TextBuffer, TextGuard};
pub use line_cache::LineOffsetCache;
pub use mapper::{DEFAULT_TAB_WIDTH, MappedPosition, OffsetMapper};
pub use span::{Anchor, Span};
