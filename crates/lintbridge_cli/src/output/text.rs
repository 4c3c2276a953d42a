//! Text output formatter

use lintbridge_engine::ScanResults;

pub fn output_text(results: &ScanResults, files: usize) {
    for (path, problems) in results {
        if problems.is_empty() {
            continue;
        }

        println!("\n{}:", path.display());
        for problem in problems {
            let suppressed = if problem.suppressed { " (suppressed)" } else { "" };
            println!(
                "  {}:{} {} [{}]: {}{}",
                problem.line,
                problem.column,
                problem.severity.as_str(),
                short_source(&problem.source_rule_id),
                problem.message,
                suppressed
            );
        }
    }

    let total: usize = results.values().map(Vec::len).sum();
    println!();
    println!("Checked {} files, found {} problems", files, total);
}

/// Last segment of a dotted rule identifier.
fn short_source(source: &str) -> &str {
    source.rsplit('.').next().unwrap_or(source)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_source() {
        assert_eq!(
            short_source("com.puppycrawl.tools.checkstyle.checks.naming.MemberNameCheck"),
            "MemberNameCheck"
        );
        assert_eq!(short_source("Plain"), "Plain");
        assert_eq!(short_source(""), "");
    }
}
