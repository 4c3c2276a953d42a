//! JSON output formatter

use lintbridge_engine::ScanResults;
use miette::{IntoDiagnostic, Result};

pub fn output_json(results: &ScanResults) -> Result<()> {
    let output: Vec<_> = results
        .iter()
        .map(|(path, problems)| {
            serde_json::json!({
                "path": path.display().to_string(),
                "problems": problems,
            })
        })
        .collect();
    println!(
        "{}",
        serde_json::to_string_pretty(&output).into_diagnostic()?
    );
    Ok(())
}
