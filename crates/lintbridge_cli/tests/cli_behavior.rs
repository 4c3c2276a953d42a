//! Integration tests for CLI behavior

use assert_cmd::Command;
use assert_fs::TempDir;
use assert_fs::prelude::*;
use predicates::prelude::*;

const RULES: &str = r#"<?xml version="1.0"?>
<module name="Checker">
    <property name="charset" value="UTF-8"/>
    <module name="TreeWalker">
        <property name="tabWidth" value="4"/>
        <module name="LineLength">
            <property name="max" value="${max.line}"/>
        </module>
        <module name="RightCurly">
            <property name="tokens" value="LITERAL_TRY, LITERAL_CATCH, NOT_A_TOKEN"/>
        </module>
    </module>
</module>
"#;

/// Helper to create a command for the lbridge CLI
fn lbridge_cmd(dir: &TempDir) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_lbridge"));
    cmd.current_dir(dir.path());
    cmd
}

fn project() -> TempDir {
    let dir = TempDir::new().unwrap();
    dir.child("checks.xml").write_str(RULES).unwrap();
    dir
}

mod help_command {
    use super::*;

    #[test]
    fn shows_help_with_flag() {
        let dir = TempDir::new().unwrap();
        lbridge_cmd(&dir)
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("Usage:"));
    }

    #[test]
    fn shows_version_with_flag() {
        let dir = TempDir::new().unwrap();
        lbridge_cmd(&dir)
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
    }
}

mod rules_command {
    use super::*;

    #[test]
    fn prints_modules_with_bound_properties() {
        let dir = project();

        lbridge_cmd(&dir)
            .args(["rules", "--rules", "checks.xml", "-p", "max.line=120"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Checker"))
            .stdout(predicate::str::contains("max = 120"))
            .stdout(predicate::str::contains("tokens: LITERAL_CATCH, LITERAL_TRY"))
            .stdout(predicate::str::contains("NOT_A_TOKEN").not());
    }

    #[test]
    fn prints_json_modules() {
        let dir = project();

        let output = lbridge_cmd(&dir)
            .args(["rules", "--rules", "checks.xml", "--format", "json"])
            .output()
            .unwrap();
        assert!(output.status.success());

        let modules: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        let names: Vec<&str> = modules
            .as_array()
            .unwrap()
            .iter()
            .map(|m| m["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["Checker", "TreeWalker", "LineLength", "RightCurly"]);
    }

    #[test]
    fn reads_rules_location_from_settings() {
        let dir = project();
        dir.child(".lintbridge.json")
            .write_str(r#"{ "config": "checks.xml", "properties": { "max.line": "80" } }"#)
            .unwrap();

        lbridge_cmd(&dir)
            .arg("rules")
            .assert()
            .success()
            .stdout(predicate::str::contains("max = 80"));
    }

    #[test]
    fn prints_bundled_rules() {
        let dir = TempDir::new().unwrap();

        lbridge_cmd(&dir)
            .args(["rules", "--rules", "bundled:bundled-google-checks"])
            .assert()
            .success()
            .stdout(predicate::str::contains("TreeWalker"))
            .stdout(predicate::str::contains("Indentation"));
    }

    #[test]
    fn fails_on_missing_class_path_resource() {
        let dir = TempDir::new().unwrap();

        lbridge_cmd(&dir)
            .args(["rules", "--rules", "classpath:/lint/checks.xml"])
            .assert()
            .code(2)
            .stderr(predicate::str::contains("Couldn't read class path resource"));
    }

    #[test]
    fn fails_without_rules_location() {
        let dir = TempDir::new().unwrap();

        lbridge_cmd(&dir)
            .arg("rules")
            .assert()
            .code(2)
            .stderr(predicate::str::contains("No rule configuration given"));
    }

    #[test]
    fn fails_on_missing_rules_file() {
        let dir = TempDir::new().unwrap();

        lbridge_cmd(&dir)
            .args(["rules", "--rules", "missing.xml"])
            .assert()
            .code(2);
    }
}

mod scan_command {
    use super::*;

    #[test]
    fn requires_files() {
        let dir = project();

        lbridge_cmd(&dir)
            .args(["scan", "--rules", "checks.xml"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Usage:"));
    }

    #[test]
    fn fails_without_engine() {
        let dir = project();
        dir.child("Main.java").write_str("class Main {}\n").unwrap();

        lbridge_cmd(&dir)
            .args(["scan", "--rules", "checks.xml", "Main.java"])
            .assert()
            .code(2)
            .stderr(predicate::str::contains("No engine given"));
    }

    #[test]
    fn fails_on_invalid_engine_module() {
        let dir = project();
        dir.child("Main.java").write_str("class Main {}\n").unwrap();
        dir.child("engine.wasm").write_binary(b"not wasm").unwrap();

        lbridge_cmd(&dir)
            .args([
                "scan",
                "--rules",
                "checks.xml",
                "--engine",
                "engine.wasm",
                "Main.java",
            ])
            .assert()
            .code(2);
    }

    #[test]
    fn fails_on_missing_source_file() {
        let dir = project();
        dir.child("engine.wasm").write_binary(b"not wasm").unwrap();

        lbridge_cmd(&dir)
            .args([
                "scan",
                "--rules",
                "checks.xml",
                "--engine",
                "engine.wasm",
                "Missing.java",
            ])
            .assert()
            .code(2)
            .stderr(predicate::str::contains("Failed to read"));
    }
}
