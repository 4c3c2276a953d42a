//! Per-file cache of line start offsets.

/// Start of one line, as a character offset and the matching byte index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct LineStart {
    pub(crate) offset: usize,
    pub(crate) byte: usize,
}

/// Known line starts of one file, filled in lazily by the offset mapper.
///
/// The cache is seeded with line 1 at offset 0 and only ever grows. It is
/// meant to live for one scan of one file and be shared by all diagnostics
/// of that file.
#[derive(Debug, Clone)]
pub struct LineOffsetCache {
    starts: Vec<LineStart>,
    scanned: usize,
}

impl LineOffsetCache {
    /// Creates a cache that knows only the first line.
    pub fn new() -> Self {
        Self {
            starts: vec![LineStart { offset: 0, byte: 0 }],
            scanned: 0,
        }
    }

    /// Number of lines whose start is known.
    pub fn len(&self) -> usize {
        self.starts.len()
    }

    /// Always false; line 1 is known from the start.
    pub fn is_empty(&self) -> bool {
        self.starts.is_empty()
    }

    /// Character offset at which the given 1-based line starts, if known.
    pub fn line_start(&self, line: usize) -> Option<usize> {
        line.checked_sub(1)
            .and_then(|index| self.starts.get(index))
            .map(|start| start.offset)
    }

    /// Known line starts in order.
    pub fn offsets(&self) -> Vec<usize> {
        self.starts.iter().map(|start| start.offset).collect()
    }

    /// Total characters examined while extending this cache.
    pub fn scanned_chars(&self) -> usize {
        self.scanned
    }

    pub(crate) fn start(&self, line: usize) -> Option<LineStart> {
        line.checked_sub(1).and_then(|index| self.starts.get(index)).copied()
    }

    pub(crate) fn last(&self) -> LineStart {
        // Seeded with one entry and never shrinks.
        self.starts[self.starts.len() - 1]
    }

    pub(crate) fn push(&mut self, offset: usize, byte: usize) {
        self.starts.push(LineStart { offset, byte });
    }

    pub(crate) fn record_scanned(&mut self, count: usize) {
        self.scanned += count;
    }
}

impl Default for LineOffsetCache {
    fn default() -> Self {
        Self::new()
    }
}
