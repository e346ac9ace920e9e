//! End-to-end coverage for the `solv` binary over testcase fixtures:
//! subcommands are driven against a temp project directory via `tempfile`,
//! the same way a CLI smoke test would exercise a packaged binary.

use std::fs;
use std::process::Command;

use tempfile::tempdir;

fn solv_bin() -> &'static str {
    env!("CARGO_BIN_EXE_solv")
}

fn write_fixture(dir: &std::path::Path) {
    fs::write(
        dir.join("main.json"),
        r#"{"packages": [
            {"name": "a", "evr": "1-1", "requires": ["b"]},
            {"name": "b", "evr": "1-1"}
        ]}"#,
    )
    .unwrap();

    fs::write(
        dir.join("broken.t"),
        "repo main 0 json main.json\n\
         system x86_64 generic main\n\
         job install missing\n",
    )
    .unwrap();

    fs::write(
        dir.join("ok.t"),
        "repo main 0 json main.json\n\
         system x86_64 generic main\n\
         job install a\n",
    )
    .unwrap();
}

#[test]
fn solve_resolves_transitive_requires() {
    let dir = tempdir().unwrap();
    write_fixture(dir.path());

    let output = Command::new(solv_bin()).arg("solve").arg(dir.path().join("ok.t")).output().unwrap();

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("install a"));
    assert!(stdout.contains("install b"));
}

#[test]
fn solve_reports_failure_for_missing_provider() {
    let dir = tempdir().unwrap();
    write_fixture(dir.path());

    let output = Command::new(solv_bin()).arg("solve").arg(dir.path().join("broken.t")).output().unwrap();

    assert!(!output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("unsolvable"));
}

#[test]
fn problems_reports_a_representative_rule() {
    let dir = tempdir().unwrap();
    write_fixture(dir.path());

    let output = Command::new(solv_bin()).arg("problems").arg(dir.path().join("broken.t")).output().unwrap();

    assert!(!output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("problem"));
}

#[test]
fn why_lists_the_package_requiring_the_target() {
    let dir = tempdir().unwrap();
    write_fixture(dir.path());

    let output = Command::new(solv_bin()).arg("why").arg(dir.path().join("ok.t")).arg("b").output().unwrap();

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains('a'));
}
