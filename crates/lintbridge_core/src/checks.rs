//! Acceptance checks that refine what the engine reports.

use std::sync::Arc;

use lintbridge_config::RuleConfig;
use lintbridge_engine::AcceptanceCheck;
use lintbridge_text::TextBuffer;

const JAVADOC_PACKAGE_SOURCE: &str = "com.puppycrawl.tools.checkstyle.checks.javadoc.JavadocPackageCheck";
const JAVADOC_PACKAGE_MODULE: &str = "JavadocPackage";
const PACKAGE_HTML_SOURCE: &str = "com.puppycrawl.tools.checkstyle.checks.javadoc.PackageHtmlCheck";

const PACKAGE_INFO_FILE: &str = "package-info.java";
const PACKAGE_HTML_FILE: &str = "package.html";

fn has_sibling(buffer: &dyn TextBuffer, name: &str) -> bool {
    buffer
        .path()
        .parent()
        .is_some_and(|dir| dir.join(name).is_file())
}

/// Drops missing-package-documentation reports for packages that are
/// documented after all.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JavadocPackageCheck {
    allow_legacy: bool,
}

impl JavadocPackageCheck {
    /// `allow_legacy` makes a `package.html` count as documentation.
    pub fn new(allow_legacy: bool) -> Self {
        Self { allow_legacy }
    }

    /// Reads `allowLegacy` from the first package documentation module in
    /// `config`.
    pub fn configured(config: &RuleConfig) -> Self {
        let allow_legacy = find_allow_legacy(config).is_some_and(|v| v.trim().eq_ignore_ascii_case("true"));
        Self { allow_legacy }
    }

    pub fn allows_legacy(&self) -> bool {
        self.allow_legacy
    }
}

fn find_allow_legacy(config: &RuleConfig) -> Option<&str> {
    if config.name() == JAVADOC_PACKAGE_MODULE || config.name() == JAVADOC_PACKAGE_SOURCE {
        return config.attribute("allowLegacy");
    }
    config.children().iter().find_map(|child| find_allow_legacy(child))
}

impl AcceptanceCheck for JavadocPackageCheck {
    fn accept(&self, buffer: &dyn TextBuffer, source_rule_id: &str) -> bool {
        if source_rule_id != JAVADOC_PACKAGE_SOURCE {
            return true;
        }
        !(has_sibling(buffer, PACKAGE_INFO_FILE)
            || (self.allow_legacy && has_sibling(buffer, PACKAGE_HTML_FILE)))
    }
}

/// Drops missing `package.html` reports when the file exists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PackageHtmlCheck;

impl AcceptanceCheck for PackageHtmlCheck {
    fn accept(&self, buffer: &dyn TextBuffer, source_rule_id: &str) -> bool {
        source_rule_id != PACKAGE_HTML_SOURCE || !has_sibling(buffer, PACKAGE_HTML_FILE)
    }
}

/// The acceptance checks for a configuration.
pub fn checks_for(config: &RuleConfig) -> Vec<Arc<dyn AcceptanceCheck>> {
    let javadoc: Arc<dyn AcceptanceCheck> = Arc::new(JavadocPackageCheck::configured(config));
    let package_html: Arc<dyn AcceptanceCheck> = Arc::new(PackageHtmlCheck);
    vec![javadoc, package_html]
}

#[cfg(test)]
mod tests {
    use super::*;
    use lintbridge_text::SourceText;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use std::fs;
    use tempfile::tempdir;

    fn config(allow_legacy: Option<&str>) -> RuleConfig {
        let mut module = RuleConfig::builder(JAVADOC_PACKAGE_MODULE);
        if let Some(value) = allow_legacy {
            module = module.attribute("allowLegacy", value);
        }
        RuleConfig::builder("Checker").child(module.build()).build()
    }

    #[rstest]
    #[case::package_info(&["package-info.java"], None, false)]
    #[case::nothing(&[], None, true)]
    #[case::html_without_legacy(&["package.html"], None, true)]
    #[case::html_with_legacy(&["package.html"], Some("true"), false)]
    #[case::html_legacy_false(&["package.html"], Some("false"), true)]
    fn test_javadoc_package(
        #[case] siblings: &[&str],
        #[case] allow_legacy: Option<&str>,
        #[case] accepted: bool,
    ) {
        let dir = tempdir().unwrap();
        for name in siblings {
            fs::write(dir.path().join(name), "").unwrap();
        }
        let buffer = SourceText::new(dir.path().join("A.java"), "class A {}");
        let check = JavadocPackageCheck::configured(&config(allow_legacy));

        assert_eq!(check.accept(&buffer, JAVADOC_PACKAGE_SOURCE), accepted);
    }

    #[test]
    fn test_other_sources_pass_through() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("package-info.java"), "").unwrap();
        fs::write(dir.path().join("package.html"), "").unwrap();
        let buffer = SourceText::new(dir.path().join("A.java"), "");

        for check in checks_for(&config(Some("true"))) {
            assert!(check.accept(&buffer, "com.puppycrawl.tools.checkstyle.checks.naming.MemberNameCheck"));
        }
    }

    #[test]
    fn test_package_html_check() {
        let dir = tempdir().unwrap();
        let buffer = SourceText::new(dir.path().join("A.java"), "");
        assert!(PackageHtmlCheck.accept(&buffer, PACKAGE_HTML_SOURCE));

        fs::write(dir.path().join("package.html"), "").unwrap();
        assert!(!PackageHtmlCheck.accept(&buffer, PACKAGE_HTML_SOURCE));
    }

    #[test]
    fn test_allow_legacy_found_by_full_class_name() {
        let config = RuleConfig::builder("Checker")
            .child(
                RuleConfig::builder(JAVADOC_PACKAGE_SOURCE)
                    .attribute("allowLegacy", "TRUE")
                    .build(),
            )
            .build();
        assert!(JavadocPackageCheck::configured(&config).allows_legacy());
    }
}
