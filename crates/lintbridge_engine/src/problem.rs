//! Translation of engine diagnostics into buffer-anchored problems.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use lintbridge_config::{absolute_normalized, normalize_path};
use lintbridge_text::{Anchor, LineOffsetCache, OffsetMapper, TextBuffer};
use serde::Serialize;
use tracing::{debug, info};

use crate::{Diagnostic, Severity};

/// Secondary filter applied to every diagnostic before it is kept.
pub trait AcceptanceCheck: Send + Sync {
    /// Returns false to drop the diagnostic.
    fn accept(&self, buffer: &dyn TextBuffer, source_rule_id: &str) -> bool;
}

/// Options for one scan.
#[derive(Clone, Default)]
pub struct ScanOptions {
    /// Mark every resolved problem as suppressed.
    pub suppress_errors: bool,
    /// Acceptance checks; any rejection drops the diagnostic.
    pub checks: Vec<Arc<dyn AcceptanceCheck>>,
}

impl ScanOptions {
    pub fn with_check(mut self, check: Arc<dyn AcceptanceCheck>) -> Self {
        self.checks.push(check);
        self
    }
}

impl fmt::Debug for ScanOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScanOptions")
            .field("suppress_errors", &self.suppress_errors)
            .field("checks", &self.checks.len())
            .finish()
    }
}

/// A diagnostic resolved against its buffer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedProblem {
    pub anchor: Anchor,
    /// Character offset the diagnostic maps to.
    pub offset: usize,
    pub message: String,
    pub severity: Severity,
    pub line: usize,
    pub column: usize,
    pub source_rule_id: String,
    /// Hint for marker placement; see `MappedPosition::after_line_end`.
    pub after_line_end: bool,
    pub suppressed: bool,
}

/// Problems per scanned buffer path.
pub type ScanResults = BTreeMap<PathBuf, Vec<ResolvedProblem>>;

/// Maps diagnostics onto the buffers of one scan.
pub struct ProblemResolver<'a> {
    buffers: HashMap<PathBuf, &'a dyn TextBuffer>,
    mapper: OffsetMapper,
    base_dir: Option<PathBuf>,
    options: &'a ScanOptions,
}

impl<'a> ProblemResolver<'a> {
    /// Creates a resolver for the given buffers.
    pub fn new(
        buffers: &[&'a dyn TextBuffer],
        tab_width: usize,
        base_dir: Option<&Path>,
        options: &'a ScanOptions,
    ) -> Self {
        let buffers = buffers
            .iter()
            .map(|buffer| (file_key(buffer.path()), *buffer))
            .collect();
        Self {
            buffers,
            mapper: OffsetMapper::new(tab_width),
            base_dir: base_dir.map(Path::to_path_buf),
            options,
        }
    }

    /// Resolves all diagnostics of a scan.
    ///
    /// Diagnostics for files that are not part of the scan are skipped.
    pub fn resolve(&self, diagnostics: Vec<Diagnostic>) -> ScanResults {
        let mut by_file: HashMap<PathBuf, Vec<Diagnostic>> = HashMap::new();
        for diagnostic in diagnostics {
            let key = file_key(&self.identify(&diagnostic.file));
            if self.buffers.contains_key(&key) {
                by_file.entry(key).or_default().push(diagnostic);
            } else {
                info!(
                    "Could not find mapping for file: {} ({}:{})",
                    diagnostic.file, diagnostic.line, diagnostic.column
                );
            }
        }

        let mut results = ScanResults::new();
        for (key, mut diagnostics) in by_file {
            let buffer = self.buffers[&key];
            diagnostics.sort_by_key(|d| d.line);
            let problems = self.resolve_file(buffer, diagnostics);
            if !problems.is_empty() {
                results
                    .entry(buffer.path().to_path_buf())
                    .or_default()
                    .extend(problems);
            }
        }
        results
    }

    fn resolve_file(&self, buffer: &dyn TextBuffer, diagnostics: Vec<Diagnostic>) -> Vec<ResolvedProblem> {
        let text = buffer.text();
        let mut cache = LineOffsetCache::new();
        let mut problems = Vec::with_capacity(diagnostics.len());

        for diagnostic in diagnostics {
            if !self.accepted(buffer, &diagnostic.source) {
                debug!("Dropped {} diagnostic on line {}", diagnostic.source, diagnostic.line);
                continue;
            }

            let position = self
                .mapper
                .position(&mut cache, &text, diagnostic.line, diagnostic.column);

            let (anchor, after_line_end) = match buffer.element_at(position) {
                Some(span) => (Anchor::Element(span), position.after_line_end),
                None => {
                    debug!(
                        "Couldn't find element for {}({}:{}) {}",
                        diagnostic.file, diagnostic.line, diagnostic.column, diagnostic.message
                    );
                    (Anchor::WholeBuffer, false)
                }
            };

            problems.push(ResolvedProblem {
                anchor,
                offset: position.offset,
                message: diagnostic.message,
                severity: diagnostic.severity,
                line: diagnostic.line,
                column: diagnostic.column,
                source_rule_id: diagnostic.source,
                after_line_end,
                suppressed: self.options.suppress_errors,
            });
        }
        problems
    }

    fn accepted(&self, buffer: &dyn TextBuffer, source: &str) -> bool {
        self.options.checks.iter().all(|check| check.accept(buffer, source))
    }

    /// Engine file name, rebased under the base directory when that names an
    /// existing file.
    fn identify(&self, file_name: &str) -> PathBuf {
        if let Some(base) = &self.base_dir {
            let rebased = normalize_path(&base.join(file_name));
            if rebased.exists() {
                return rebased;
            }
        }
        normalize_path(Path::new(file_name))
    }
}

fn file_key(path: &Path) -> PathBuf {
    absolute_normalized(path).unwrap_or_else(|_| normalize_path(path))
}
