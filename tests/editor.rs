#![cfg(unix)]

mod support;

use std::fs;
use std::path::Path;

use assert_matches::assert_matches;
use pretty_assertions::assert_eq;
use support::{HarnessTerminal, ENTER};
use tape_survey::prompts::{Editor, Input};
use tape_survey::{ask, min_length, run_prompt, Answer, Question, SurveyError};

/// Shell script standing in for an interactive editor.
fn script_editor(dir: &Path, body: &str) -> String {
    let path = dir.join("edit.sh");
    fs::write(&path, format!("#!/bin/sh\n{body}\n")).expect("write editor script");
    format!("sh '{}'", path.display())
}

#[test]
fn editor_answer_is_the_saved_file() {
    let dir = tempfile::tempdir().expect("temp dir");
    let command = script_editor(dir.path(), r#"printf 'October\n\n' > "$1""#);
    let terminal = HarnessTerminal::scripted(&[ENTER]);

    let answer = run_prompt(
        &Editor::new("Shortly describe yourself").editor(command),
        terminal.options(),
    )
    .expect("editor answered");

    assert_eq!(answer, Answer::from("October\n"));
    let transcript = terminal.transcript();
    assert!(transcript.contains("? Shortly describe yourself [Enter to launch editor] "));
    assert!(transcript.ends_with("? Shortly describe yourself <Received>\n"));
    assert_eq!((terminal.starts(), terminal.stops()), (2, 2));
}

#[test]
fn editor_keeps_the_default_when_nothing_is_written() {
    let dir = tempfile::tempdir().expect("temp dir");
    let command = script_editor(dir.path(), "exit 0");
    let terminal = HarnessTerminal::scripted(&[ENTER]);

    let answer = run_prompt(
        &Editor::new("Month").default_value("April").editor(command),
        terminal.options(),
    )
    .expect("editor answered");

    assert_eq!(answer, Answer::from("April"));
    assert!(terminal.transcript().contains("? Month (April) [Enter to launch editor] "));
}

#[test]
fn appended_default_seeds_the_buffer() {
    let dir = tempfile::tempdir().expect("temp dir");
    let command = script_editor(dir.path(), r#"printf ' and May' >> "$1""#);
    let terminal = HarnessTerminal::scripted(&[ENTER]);

    let answer = run_prompt(
        &Editor::new("Months")
            .default_value("April")
            .append_default(true)
            .editor(command),
        terminal.options(),
    )
    .expect("editor answered");

    assert_eq!(answer, Answer::from("April and May\n"));
}

#[test]
fn survey_wide_editor_is_used_when_the_prompt_has_none() {
    let dir = tempfile::tempdir().expect("temp dir");
    let command = script_editor(dir.path(), r#"printf 'from survey' > "$1""#);
    let terminal = HarnessTerminal::scripted(&[ENTER]);

    let answer = run_prompt(&Editor::new("Notes"), terminal.options().editor(command))
        .expect("editor answered");

    assert_eq!(answer, Answer::from("from survey\n"));
}

#[test]
fn input_resumes_after_the_editor_returns() {
    let dir = tempfile::tempdir().expect("temp dir");
    let command = script_editor(dir.path(), r#"printf 'notes' > "$1""#);
    let terminal = HarnessTerminal::scripted(&[ENTER]).then(&["Ada", ENTER]);
    let questions = [
        Question::new("bio", Editor::new("Bio").editor(command)),
        Question::new("name", Input::new("Name")),
    ];
    let mut answers: std::collections::HashMap<String, String> = Default::default();

    ask(&questions, &mut answers, terminal.options()).expect("survey answered");

    assert_eq!(answers.get("bio").map(String::as_str), Some("notes\n"));
    assert_eq!(answers.get("name").map(String::as_str), Some("Ada"));
}

#[test]
fn rejected_text_reopens_in_the_editor() {
    let dir = tempfile::tempdir().expect("temp dir");
    let command = script_editor(dir.path(), r#"printf 'more' >> "$1""#);
    let terminal = HarnessTerminal::scripted(&[ENTER]).then(&[ENTER]);
    let questions =
        [Question::new("text", Editor::new("Text").editor(command)).validate(min_length(8))];
    let mut answers: std::collections::HashMap<String, String> = Default::default();

    ask(&questions, &mut answers, terminal.options()).expect("survey answered");

    assert_eq!(answers.get("text").map(String::as_str), Some("more\nmore\n"));
    assert!(terminal
        .transcript()
        .contains("X Sorry, your reply was invalid: value is too short. Min length is 8\n"));
}

#[test]
fn failing_editor_is_reported() {
    let dir = tempfile::tempdir().expect("temp dir");
    let command = script_editor(dir.path(), "exit 3");
    let terminal = HarnessTerminal::scripted(&[ENTER]);

    let result = run_prompt(&Editor::new("Text").editor(command), terminal.options());
    assert_matches!(result, Err(SurveyError::ChildProcess { .. }));
}
