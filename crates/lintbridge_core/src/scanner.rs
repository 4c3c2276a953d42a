//! One-stop scanning: cached checkers, acceptance checks and resolution.

use std::sync::Arc;
use std::time::Duration;

use lintbridge_config::Notifier;
use lintbridge_engine::{BridgeError, EngineAdapter, EngineHandle, ScanOptions, ScanResults};
use lintbridge_text::TextBuffer;
use tracing::{info, warn};

use crate::checks::checks_for;
use crate::{CheckerCache, CheckerFactory, CheckerRequest};

/// Scans buffers against rule configurations on one engine release.
///
/// # Example
///
/// ```rust,ignore
/// use lintbridge_core::{CheckerRequest, Scanner};
///
/// let scanner = Scanner::new(adapter);
/// let results = scanner.scan(&request, &[&buffer], false)?;
/// for (path, problems) in &results {
///     println!("{}: {} problems", path.display(), problems.len());
/// }
/// ```
pub struct Scanner {
    factory: CheckerFactory,
    cache: CheckerCache,
}

impl Scanner {
    pub fn new(adapter: Arc<EngineAdapter>) -> Self {
        Self {
            factory: CheckerFactory::new(adapter),
            cache: CheckerCache::new(),
        }
    }

    /// Sets how long a checker is reused after its last use.
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache = CheckerCache::with_ttl(ttl);
        self
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.factory = self.factory.with_notifier(notifier);
        self
    }

    pub fn adapter(&self) -> &Arc<EngineAdapter> {
        self.factory.adapter()
    }

    pub fn cache(&self) -> &CheckerCache {
        &self.cache
    }

    /// Returns the cached checker for `request`, building it if needed.
    pub fn checker(&self, request: &CheckerRequest) -> Result<Arc<EngineHandle>, BridgeError> {
        self.cache.get(&request.key(), || self.factory.build(request))
    }

    /// Scans `buffers` with the checker for `request`.
    pub fn scan(
        &self,
        request: &CheckerRequest,
        buffers: &[&dyn TextBuffer],
        suppress_errors: bool,
    ) -> Result<ScanResults, BridgeError> {
        let handle = self.checker(request)?;
        let options = ScanOptions {
            suppress_errors,
            checks: checks_for(handle.config()),
        };
        self.adapter().scan(&handle, buffers, &options)
    }

    /// Drops every cached checker and destroys it.
    pub fn invalidate(&self) {
        let handles = self.cache.invalidate();
        info!("Discarding {} checkers", handles.len());
        for handle in handles {
            if let Err(e) = self.adapter().destroy(&handle) {
                warn!("Failed to destroy checker {}: {}", handle.id(), e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lintbridge_config::{ConfigSource, ModuleContext};
    use lintbridge_engine::Diagnostic;
    use lintbridge_engine::api::{DESTROY, LOAD_CONFIGURATION};
    use lintbridge_engine::test_utils::ScriptedRuntime;
    use lintbridge_text::SourceText;
    use pretty_assertions::assert_eq;
    use std::fs;
    use std::path::Path;
    use tempfile::tempdir;

    const RULES: &str = r#"<module name="Checker">
        <module name="JavadocPackage"/>
        <module name="TreeWalker"/>
    </module>"#;

    fn scanner(runtime: &ScriptedRuntime) -> Scanner {
        Scanner::new(Arc::new(EngineAdapter::new(Arc::new(runtime.clone())).unwrap()))
    }

    fn request() -> CheckerRequest {
        CheckerRequest::new(ConfigSource::Text(RULES.into()), ModuleContext::new("/work"))
    }

    #[test]
    fn test_checker_is_reused_between_scans() {
        let runtime = ScriptedRuntime::current("10.3");
        let scanner = scanner(&runtime);
        let buffer = SourceText::new("/work/A.java", "class A {}\n");

        scanner.scan(&request(), &[&buffer], false).unwrap();
        scanner.scan(&request(), &[&buffer], false).unwrap();

        assert_eq!(runtime.instances_created(), 1);
        assert_eq!(runtime.calls_to(LOAD_CONFIGURATION).len(), 1);
    }

    #[test]
    fn test_documented_package_report_is_dropped() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("package-info.java"), "package a;").unwrap();
        let file = dir.path().join("A.java");
        let name = file.to_string_lossy().into_owned();

        let runtime = ScriptedRuntime::current("10.3").with_diagnostics(vec![
            Diagnostic::new(&name, 0, 0, "Missing package-info.java file.")
                .with_source("com.puppycrawl.tools.checkstyle.checks.javadoc.JavadocPackageCheck"),
            Diagnostic::new(&name, 1, 0, "Missing a Javadoc comment.")
                .with_source("com.puppycrawl.tools.checkstyle.checks.javadoc.MissingJavadocTypeCheck"),
        ]);
        let scanner = scanner(&runtime);
        let buffer = SourceText::new(&file, "class A {}\n");

        let results = scanner.scan(&request(), &[&buffer], true).unwrap();

        let problems = &results[file.as_path()];
        assert_eq!(problems.len(), 1);
        assert_eq!(problems[0].message, "Missing a Javadoc comment.");
        assert!(problems[0].suppressed);
    }

    #[test]
    fn test_invalidate_destroys_cached_checkers() {
        let runtime = ScriptedRuntime::current("10.3");
        let scanner = scanner(&runtime);
        let handle = scanner.checker(&request()).unwrap();

        scanner.invalidate();

        assert!(handle.is_destroyed());
        assert!(scanner.cache().is_empty());
        assert_eq!(runtime.calls_to(DESTROY).len(), 1);

        let buffer = SourceText::new(Path::new("/work/A.java"), "");
        scanner.scan(&request(), &[&buffer], false).unwrap();
        assert_eq!(runtime.instances_created(), 2);
    }
}
