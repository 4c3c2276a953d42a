//! Text buffers handed to a scan.
//!
//! A buffer is either owned by the scanning thread ([`SourceText`]) or shared
//! with other threads ([`SharedText`]). Shared buffers are only ever read
//! under their read lock, which is held for as long as the returned
//! [`TextGuard`] lives.

use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard};
use tracing::debug;

use crate::{MappedPosition, Span};

/// Borrowed view of a buffer's full text.
pub type TextGuard<'a> = Box<dyn Deref<Target = str> + 'a>;

/// A text buffer under analysis.
pub trait TextBuffer: Send + Sync {
    /// Path of the file backing this buffer.
    fn path(&self) -> &Path;

    /// Full text of the buffer.
    fn text(&self) -> TextGuard<'_>;

    /// Returns the element covering the character at `position`, if the
    /// buffer has addressable content there.
    ///
    /// `position` must describe the current text; its byte index lets the
    /// lookup start next to the element instead of at the buffer start.
    fn element_at(&self, position: MappedPosition) -> Option<Span>;
}

/// A buffer owned by the calling thread.
#[derive(Debug, Clone)]
pub struct SourceText {
    path: PathBuf,
    content: String,
}

impl SourceText {
    /// Creates a new buffer.
    pub fn new(path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }

    /// Reads a buffer from disk.
    pub fn from_file(path: impl Into<PathBuf>) -> std::io::Result<Self> {
        let path = path.into();
        let content = std::fs::read_to_string(&path)?;
        debug!("Read {} ({} bytes)", path.display(), content.len());
        Ok(Self { path, content })
    }

    /// Returns the content as a plain string slice.
    pub fn as_str(&self) -> &str {
        &self.content
    }
}

impl TextBuffer for SourceText {
    fn path(&self) -> &Path {
        &self.path
    }

    fn text(&self) -> TextGuard<'_> {
        Box::new(self.content.as_str())
    }

    fn element_at(&self, position: MappedPosition) -> Option<Span> {
        token_at(&self.content, position)
    }
}

/// A buffer that other threads may edit while a scan is running.
///
/// Cloning yields another handle to the same text.
#[derive(Debug, Clone)]
pub struct SharedText {
    path: PathBuf,
    content: Arc<RwLock<String>>,
}

impl SharedText {
    /// Creates a new shared buffer.
    pub fn new(path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: Arc::new(RwLock::new(content.into())),
        }
    }

    /// Replaces the buffer content, blocking until no reader holds the lock.
    pub fn replace(&self, content: impl Into<String>) {
        *self.content.write() = content.into();
    }
}

impl TextBuffer for SharedText {
    fn path(&self) -> &Path {
        &self.path
    }

    fn text(&self) -> TextGuard<'_> {
        Box::new(RwLockReadGuard::map(self.content.read(), |s| s.as_str()))
    }

    fn element_at(&self, position: MappedPosition) -> Option<Span> {
        // Callers usually hold a `text()` guard already.
        token_at(&self.content.read_recursive(), position)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CharClass {
    Word,
    Space,
    Symbol,
}

fn classify(c: char) -> CharClass {
    if c.is_alphanumeric() || c == '_' || c == '$' {
        CharClass::Word
    } else if c.is_whitespace() {
        CharClass::Space
    } else {
        CharClass::Symbol
    }
}

/// Finds the token covering `position`: a run of word characters, a run of
/// whitespace, or a single symbol. Positions at or past the end have no
/// token. Only the token itself is walked.
fn token_at(text: &str, position: MappedPosition) -> Option<Span> {
    let MappedPosition { offset, byte, .. } = position;
    if !text.is_char_boundary(byte) {
        return None;
    }
    let target = text[byte..].chars().next()?;
    let class = classify(target);
    if class == CharClass::Symbol {
        return Some(Span::new(offset, offset + 1));
    }

    let before = text[..byte]
        .chars()
        .rev()
        .take_while(|&c| classify(c) == class)
        .count();
    let after = text[byte..]
        .chars()
        .take_while(|&c| classify(c) == class)
        .count();

    Some(Span::new(offset.saturating_sub(before), offset + after))
}
