//! Drive the interactive loop with piped (non-terminal) input.

use assert_cmd::Command;
use predicates::prelude::*;

fn session(input: &str) -> assert_cmd::assert::Assert {
    Command::cargo_bin("tinysh")
        .unwrap()
        .write_stdin(input)
        .assert()
}

#[test]
fn end_of_input_exits_cleanly() {
    session("")
        .success()
        .stdout(predicate::str::contains("exit"));
}

#[test]
fn explicit_exit_stops_reading() {
    session("echo before\nexit\necho after\n")
        .success()
        .stdout(predicate::str::contains("before"))
        .stdout(predicate::str::contains("after").not());
}

#[test]
fn conditional_is_executed_on_fi() {
    session("if\ntrue\nthen\necho A\nelse\necho B\nfi\n")
        .success()
        .stdout(predicate::str::contains("A\n"))
        .stdout(predicate::str::contains("B\n").not());
}

#[test]
fn syntax_error_does_not_end_the_session() {
    session("then\necho still-here\n")
        .success()
        .stdout(predicate::str::contains("still-here"))
        .stderr(predicate::str::contains("syntax error near unexpected `then`"));
}

#[test]
fn statement_after_syntax_error_starts_fresh() {
    session("if\nthen\nif true; then echo recovered; fi\n")
        .success()
        .stdout(predicate::str::contains("recovered"));
}

#[test]
fn missing_pipeline_stage_is_reaped_and_reported() {
    session("printf x | no-such-program-4242 | cat\necho done\n")
        .success()
        .stdout(predicate::str::contains("done"))
        .stderr(predicate::str::contains(
            "no-such-program-4242: command not found",
        ));
}

#[test]
fn empty_pipeline_stage_is_reported() {
    session("echo a | | cat\necho next\n")
        .success()
        .stdout(predicate::str::contains("next"))
        .stderr(predicate::str::contains("pipeline stage 2 is empty"));
}

#[test]
fn pipeline_completes_before_next_line() {
    session("printf b\\na\\n | sort\necho end\n")
        .success()
        .stdout(predicate::str::contains("a\nb\n"))
        .stdout(predicate::str::is_match("(?s)a\nb\n.*end").unwrap());
}
