//! End-to-end integration tests for the Infix compiler.
//!
//! Each test writes a `.ifx` source file, invokes the full compilation
//! pipeline through the `infixc` binary, runs the resulting executable,
//! and asserts the expected stdout output.

use std::path::PathBuf;
use std::process::Command;

/// Compile a source file with `infixc` and run the resulting binary,
/// returning stdout. Panics with the compiler's stderr if the build
/// itself fails.
fn compile_and_run(source: &str) -> String {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let main_ifx = dir.path().join("main.ifx");
    std::fs::write(&main_ifx, source).expect("failed to write main.ifx");

    let infixc = find_infixc();
    let output = Command::new(&infixc)
        .args(["--build-only", main_ifx.to_str().unwrap()])
        .output()
        .expect("failed to invoke infixc");

    assert!(
        output.status.success(),
        "infixc build failed:\nstdout: {}\nstderr: {}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );

    let binary = dir.path().join("main");
    let run_output = Command::new(&binary)
        .output()
        .unwrap_or_else(|e| panic!("failed to run binary at {}: {}", binary.display(), e));

    assert!(
        run_output.status.success(),
        "binary execution failed with exit code {:?}:\nstderr: {}",
        run_output.status.code(),
        String::from_utf8_lossy(&run_output.stderr)
    );

    String::from_utf8_lossy(&run_output.stdout).to_string()
}

/// Find the `infixc` binary in the target directory next to the test's
/// own executable.
fn find_infixc() -> PathBuf {
    let mut path = std::env::current_exe()
        .expect("cannot find current exe")
        .parent()
        .expect("cannot find parent dir")
        .to_path_buf();

    if path.file_name().map_or(false, |n| n == "deps") {
        path = path.parent().unwrap().to_path_buf();
    }

    let infixc = path.join("infixc");
    assert!(
        infixc.exists(),
        "infixc binary not found at {}. Run `cargo build -p infixc` first.",
        infixc.display()
    );
    infixc
}

#[test]
fn prints_the_sum_of_two_integers() {
    assert_eq!(compile_and_run("print(1 + 2);"), "3\n");
}

#[test]
fn prints_the_sum_of_two_floats() {
    assert_eq!(compile_and_run("print(1.5 + 0.25);"), "1.750000\n");
}

#[test]
fn declared_variable_round_trips_through_assign_and_multiply() {
    assert_eq!(compile_and_run("x is i32; x = 10; print(x * x);"), "100\n");
}

#[test]
fn repeat_counts_up_to_its_bound() {
    let source = "i is i32; i = 0; repeat(i < 3, {print(i); i = i + 1});";
    assert_eq!(compile_and_run(source), "0\n1\n2\n");
}

#[test]
fn if_then_runs_its_body_when_the_condition_holds() {
    assert_eq!(compile_and_run("? (1 < 2, {print(\"yes\")});"), "yes\n");
}

#[test]
fn string_indexing_prints_the_indexed_byte() {
    // `print` (unlike `println`) emits no trailing newline for %i8.
    assert_eq!(compile_and_run("print(\"hello\" @ 1);"), "e");
}
