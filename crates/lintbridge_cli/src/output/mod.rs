//! Output formatting module

mod json;
mod text;

use lintbridge_engine::{ScanResults, Severity};
use miette::Result;

use crate::cli::OutputFormat;

/// Prints the results; returns whether any error-level problem was found.
pub fn output_results(results: &ScanResults, files: usize, format: OutputFormat) -> Result<bool> {
    let has_errors = results
        .values()
        .flatten()
        .any(|problem| problem.severity == Severity::Error);

    match format {
        OutputFormat::Json => json::output_json(results)?,
        OutputFormat::Text => text::output_text(results, files),
    }

    Ok(has_errors)
}
