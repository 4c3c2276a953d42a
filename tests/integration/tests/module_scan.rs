//! End-to-end scan of a module whose rules reference files outside the
//! rules directory.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use lintbridge_config::{ConfigSource, ModuleContext, absolute_normalized};
use lintbridge_core::{CheckerRequest, Scanner};
use lintbridge_engine::api::{LOAD_CONFIGURATION_STREAM, PROCESS};
use lintbridge_engine::test_utils::ScriptedRuntime;
use lintbridge_engine::{Diagnostic, EngineAdapter, Severity};
use lintbridge_text::{Anchor, SourceText, Span};
use pretty_assertions::assert_eq;
use tempfile::tempdir;

const RULES: &str = r#"<?xml version="1.0"?>
<!DOCTYPE module PUBLIC
    "-//Checkstyle//DTD Checkstyle Configuration 1.3//EN"
    "https://checkstyle.org/dtds/configuration_1_3.dtd">
<module name="Checker">
    <property name="severity" value="${level}"/>
    <module name="SuppressionFilter">
        <property name="file" value="../shared/suppressions.xml"/>
    </module>
    <module name="TreeWalker">
        <property name="tabWidth" value="8"/>
        <module name="MemberName"/>
    </module>
</module>
"#;

const MEMBER_NAME: &str = "com.puppycrawl.tools.checkstyle.checks.naming.MemberNameCheck";

fn write(path: &Path, text: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, text).unwrap();
}

#[test]
fn scans_module_with_shared_suppressions() {
    let dir = tempdir().unwrap();
    let rules = dir.path().join("rules/checks.xml");
    let suppressions = dir.path().join("shared/suppressions.xml");
    let module = dir.path().join("app");
    let source = module.join("src/Main.java");
    write(&rules, RULES);
    write(&suppressions, "<suppressions/>");
    write(&source, "class Main {\n\t\tint Bad;\n}\n");

    let file_name = source.to_string_lossy().into_owned();
    let runtime = ScriptedRuntime::legacy("8.0").with_diagnostics(vec![
        Diagnostic::new(&file_name, 2, 16, "Name 'Bad' must match pattern")
            .with_source(MEMBER_NAME),
        Diagnostic::new(&file_name, 3, 0, "'}' at column 1 should be alone on a line")
            .with_severity(Severity::Warning)
            .with_source(MEMBER_NAME),
    ]);
    let scanner = Scanner::new(Arc::new(EngineAdapter::new(Arc::new(runtime.clone())).unwrap()));

    let request = CheckerRequest::new(
        ConfigSource::File(rules.clone()),
        ModuleContext::new(dir.path()).with_module_dir(&module),
    )
    .with_property("level", "warning");
    let buffer = SourceText::from_file(&source).unwrap();

    let results = scanner.scan(&request, &[&buffer], false).unwrap();

    // The engine sees the shared suppression file by absolute path.
    let loaded = runtime.calls_to(LOAD_CONFIGURATION_STREAM);
    assert_eq!(loaded.len(), 1);
    let expected = absolute_normalized(&suppressions).unwrap();
    let config_text = loaded[0].input_text();
    assert!(
        config_text.contains(&*expected.to_string_lossy()),
        "{}",
        config_text
    );
    assert!(config_text.contains(r#"value="warning""#), "{}", config_text);
    assert!(!config_text.contains("../shared"), "{}", config_text);
    assert_eq!(runtime.calls_to(PROCESS).len(), 1);

    let problems = &results[source.as_path()];
    assert_eq!(problems.len(), 2);

    // Two tabs at width 8 put column 16 right after the indentation.
    let line_start = "class Main {\n".chars().count();
    assert_eq!(problems[0].offset, line_start + 2);
    assert_eq!(problems[0].line, 2);
    assert!(matches!(problems[0].anchor, Anchor::Element(_)));
    assert_eq!(problems[0].severity, Severity::Error);
    assert!(!problems[0].suppressed);

    let closing = line_start + "\t\tint Bad;\n".chars().count();
    assert_eq!(problems[1].offset, closing);
    assert_eq!(problems[1].anchor, Anchor::Element(Span::new(closing, closing + 1)));
    assert_eq!(problems[1].severity, Severity::Warning);
}

#[test]
fn second_scan_reuses_cached_checker() {
    let dir = tempdir().unwrap();
    let rules = dir.path().join("checks.xml");
    write(&rules, "<module name=\"Checker\"><module name=\"TreeWalker\"/></module>");
    let source = dir.path().join("A.java");
    write(&source, "class A {}\n");

    let runtime = ScriptedRuntime::current("10.3");
    let scanner = Scanner::new(Arc::new(EngineAdapter::new(Arc::new(runtime.clone())).unwrap()));
    let request = CheckerRequest::new(ConfigSource::File(rules), ModuleContext::new(dir.path()));
    let buffer = SourceText::from_file(&source).unwrap();

    let first = scanner.scan(&request, &[&buffer], false).unwrap();
    let second = scanner.scan(&request, &[&buffer], false).unwrap();

    assert_eq!(first, second);
    assert_eq!(runtime.instances_created(), 1);
    assert_eq!(runtime.calls_to(PROCESS).len(), 2);

    let changed = request.clone().with_property("extra", "1");
    scanner.scan(&changed, &[&buffer], false).unwrap();
    assert_eq!(runtime.instances_created(), 2);
}
