// End-to-end checks of the jsongen binary: output shape and miette error rendering.

mod common;

use assert_cmd::Command;
use predicates::{prelude::PredicateBooleanExt, str::contains};

use common::fixture_path;

fn jsongen() -> Command {
    Command::cargo_bin("jsongen").unwrap()
}

#[test]
fn ast_prints_the_form_tree() {
    jsongen()
        .arg("ast")
        .arg(fixture_path("Blog.ast"))
        .assert()
        .success()
        .stdout(contains("(source_file"))
        .stdout(contains("  (struct_decl \"Blog\""));
}

#[test]
fn summary_lists_constructor_signatures() {
    jsongen()
        .arg("summary")
        .arg(fixture_path("Test14.ast"))
        .assert()
        .success()
        .stdout(contains("\"one:||one: Int\""))
        .stdout(contains("\"Test14b\""));
}

#[test]
fn model_walks_directories() {
    let output = jsongen()
        .arg("model")
        .arg(fixture_path(""))
        .output()
        .unwrap();
    assert!(output.status.success());
    let units: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    // Only the .ast fixtures are picked up.
    assert_eq!(units.as_array().unwrap().len(), 5);
}

#[test]
fn multi_format_reads_concatenated_units() {
    jsongen()
        .args(["summary", "--format", "multi"])
        .arg(fixture_path("concatenated.txt"))
        .assert()
        .success()
        .stdout(contains("\"Left\""))
        .stdout(contains("\"Right\""));
}

#[test]
fn compiler_format_fails_on_compiler_errors() {
    jsongen()
        .args(["model", "--format", "compiler"])
        .arg(fixture_path("compiler_output.txt"))
        .assert()
        .failure()
        .stderr(contains("unresolved identifier"));
}

#[test]
fn split_reports_units_and_messages() {
    jsongen()
        .arg("split")
        .arg(fixture_path("compiler_output.txt"))
        .assert()
        .success()
        .stdout(contains("--- Unit 1 ---"))
        .stdout(contains("--- Message 0 ---"));
}

#[test]
fn cli_reports_miette_diagnostics_on_error() {
    jsongen()
        .args(["ast", "-"])
        .write_stdin("(source_file (struct_decl \"A\"")
        .assert()
        .failure()
        .stderr(contains("jsongen::parse").or(contains("never closed")));
}

#[test]
fn missing_input_is_an_io_error() {
    jsongen()
        .arg("model")
        .arg(fixture_path("missing.ast"))
        .assert()
        .failure()
        .stderr(contains("jsongen::io").or(contains("missing.ast")));
}
