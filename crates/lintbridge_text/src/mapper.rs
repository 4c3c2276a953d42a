//! Engine line/column to buffer offset mapping.

use serde::{Deserialize, Serialize};

use crate::LineOffsetCache;

/// Tab width used when the rule configuration does not set one.
pub const DEFAULT_TAB_WIDTH: usize = 8;

/// A resolved buffer position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappedPosition {
    /// Character offset into the buffer.
    pub offset: usize,
    /// Byte index of the character at `offset`, or the text length when
    /// `offset` is at or past the end.
    pub byte: usize,
    /// Set when a column-0 match is directly followed by whitespace.
    pub after_line_end: bool,
}

impl MappedPosition {
    /// Position of the character `offset` in `text`, found by walking from
    /// the start. Prefer [`OffsetMapper::position`] for engine coordinates.
    pub fn in_text(text: &str, offset: usize) -> Self {
        Self {
            offset,
            byte: advance(text, 0, offset),
            after_line_end: false,
        }
    }
}

/// Byte index reached by stepping `chars` characters forward from `from`.
fn advance(text: &str, from: usize, chars: usize) -> usize {
    text[from..]
        .char_indices()
        .nth(chars)
        .map_or(text.len(), |(index, _)| from + index)
}

/// Converts engine-reported `(line, column)` pairs into character offsets.
///
/// Lines are 1-based; line 0 means "relative to the start of the file".
/// Columns are 0-based and already tab-expanded by the engine, so a tab in
/// the buffer advances the column by the full tab width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OffsetMapper {
    tab_width: usize,
}

impl OffsetMapper {
    /// Creates a mapper for the given tab width.
    pub const fn new(tab_width: usize) -> Self {
        Self { tab_width }
    }

    /// Tab width this mapper expands tabs to.
    pub const fn tab_width(&self) -> usize {
        self.tab_width
    }

    /// Resolves one position, extending `cache` as lines are discovered.
    ///
    /// `cache` must belong to `text` and must not be reused for another
    /// buffer. Positions past the end of the text resolve to the text length.
    pub fn position(
        &self,
        cache: &mut LineOffsetCache,
        text: &str,
        line: usize,
        column: usize,
    ) -> MappedPosition {
        if line == 0 {
            return MappedPosition::in_text(text, column);
        }
        if let Some(start) = cache.start(line) {
            return MappedPosition {
                offset: start.offset + column,
                byte: advance(text, start.byte, column),
                after_line_end: false,
            };
        }
        self.scan_forward(cache, text, line, column)
    }

    fn scan_forward(
        &self,
        cache: &mut LineOffsetCache,
        text: &str,
        target_line: usize,
        target_column: usize,
    ) -> MappedPosition {
        let resume = cache.last();
        let mut offset = resume.offset;
        let mut byte = text.len();
        let mut line = cache.len();
        let mut column = 0;
        let mut after_line_end = false;
        let mut scanned = 0;

        let mut chars = text[resume.byte..].char_indices().peekable();
        while let Some((index, character)) = chars.next() {
            let next = chars.peek().map(|&(_, c)| c);
            scanned += 1;

            // CRLF only breaks on the LF.
            if character == '\n' || (character == '\r' && next != Some('\n')) {
                line += 1;
                offset += 1;
                cache.push(offset, resume.byte + index + character.len_utf8());
                column = 0;
            } else if character == '\t' {
                column += self.tab_width;
                offset += 1;
            } else {
                column += 1;
                offset += 1;
            }

            if line == target_line && column == target_column {
                if column == 0 && next.is_some_and(char::is_whitespace) {
                    after_line_end = true;
                }
                byte = resume.byte + index + character.len_utf8();
                break;
            }
        }

        cache.record_scanned(scanned);
        MappedPosition {
            offset,
            byte,
            after_line_end,
        }
    }
}

impl Default for OffsetMapper {
    fn default() -> Self {
        Self::new(DEFAULT_TAB_WIDTH)
    }
}
