#![allow(deprecated)]

use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn cmd(temp: &TempDir) -> assert_cmd::Command {
    let mut c = assert_cmd::Command::cargo_bin("chroma_notes").unwrap();
    c.env("CHROMA_NOTES_DIR", temp.path()).env("NO_COLOR", "1");
    c
}

fn first_id(temp: &TempDir) -> String {
    let out = cmd(temp).args(["list"]).assert().success().get_output().stdout.clone();
    String::from_utf8_lossy(&out)
        .split_whitespace()
        .next()
        .expect("listed note id")
        .to_string()
}

fn store_json(dir: &Path) -> serde_json::Value {
    let raw = fs::read_to_string(dir.join("notes.json")).expect("store file");
    serde_json::from_str(&raw).expect("valid json store")
}

#[test]
fn add_then_list_shows_note_and_tags() {
    let temp = TempDir::new().unwrap();
    cmd(&temp)
        .args(["add", "pick up milk", "-t", "errands"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added note"));

    cmd(&temp)
        .args(["list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("pick up milk"))
        .stdout(predicate::str::contains("#errands"));
}

#[test]
fn list_tag_filters_use_and_semantics() {
    let temp = TempDir::new().unwrap();
    cmd(&temp).args(["new", "Both", "x", "-t", "a", "-t", "b"]).assert().success();
    cmd(&temp).args(["new", "OnlyB", "y", "-t", "b"]).assert().success();

    cmd(&temp)
        .args(["list", "-t", "a", "-t", "b"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Both"))
        .stdout(predicate::str::contains("OnlyB").not());

    cmd(&temp)
        .args(["list", "-t", "b"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Both"))
        .stdout(predicate::str::contains("OnlyB"));
}

#[test]
fn trailing_tag_flag_is_a_usage_error() {
    let temp = TempDir::new().unwrap();
    cmd(&temp).args(["add", "body", "-t"]).assert().failure();
    cmd(&temp).args(["new", "Title", "--tag"]).assert().failure();

    // Nothing was created along the way.
    cmd(&temp)
        .args(["list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No notes match."));
}

#[test]
fn tags_table_counts_and_stable_colors() {
    let temp = TempDir::new().unwrap();
    cmd(&temp).args(["new", "One", "x", "-t", "a", "-t", "b"]).assert().success();
    cmd(&temp).args(["new", "Two", "y", "-t", "b"]).assert().success();

    let run = |t: &TempDir| {
        cmd(t).args(["tags"]).assert().success().get_output().stdout.clone()
    };
    let first = run(&temp);
    let text = String::from_utf8_lossy(&first);
    let a_row = text.lines().find(|l| l.starts_with("#a")).expect("row for a");
    let b_row = text.lines().find(|l| l.starts_with("#b")).expect("row for b");
    assert!(a_row.contains("1  #"), "a used once: {a_row}");
    assert!(b_row.contains("2  #"), "b used twice: {b_row}");

    // Generated colors are deterministic across invocations.
    assert_eq!(first, run(&temp));
}

#[test]
fn generated_tag_colors_are_persisted() {
    let temp = TempDir::new().unwrap();
    cmd(&temp).args(["add", "x", "-t", "work"]).assert().success();
    cmd(&temp).args(["tags"]).assert().success();

    let doc = store_json(temp.path());
    let color = doc["tagColors"]["work"].as_str().expect("cached color");
    assert!(color.starts_with('#') && color.len() == 7);
}

#[test]
fn tag_new_duplicate_is_informational() {
    let temp = TempDir::new().unwrap();
    cmd(&temp)
        .args(["tag", "new", "idea"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created tag idea"));

    cmd(&temp)
        .args(["tag", "new", "idea"])
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));

    // Unused tags still show in the library with count 0.
    cmd(&temp)
        .args(["tags"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#idea"))
        .stdout(predicate::str::contains("0  #"));
}

#[test]
fn tag_color_normalizes_and_skips_no_ops() {
    let temp = TempDir::new().unwrap();
    cmd(&temp)
        .args(["tag", "color", "work", "ABC"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#aabbcc"));

    cmd(&temp)
        .args(["tag", "color", "work", "#aabbcc"])
        .assert()
        .success()
        .stdout(predicate::str::contains("unchanged"));

    let doc = store_json(temp.path());
    assert_eq!(doc["tagColors"]["work"], "#aabbcc");
}

#[test]
fn tag_rm_requires_confirmation_then_strips_notes() {
    let temp = TempDir::new().unwrap();
    cmd(&temp).args(["new", "Tagged", "x", "-t", "gone", "-t", "kept"]).assert().success();

    cmd(&temp).args(["tag", "rm", "gone"]).assert().failure();

    cmd(&temp)
        .args(["tag", "rm", "gone", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed gone from 1 notes."));

    cmd(&temp)
        .args(["list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#kept"))
        .stdout(predicate::str::contains("#gone").not());

    cmd(&temp)
        .args(["tag", "rm", "gone", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("nothing removed"));
}

#[test]
fn palette_add_dedupes_and_evicts_oldest() {
    let temp = TempDir::new().unwrap();
    cmd(&temp).args(["palette", "add", "#abc"]).assert().success();
    cmd(&temp)
        .args(["palette", "add", "aabbcc"])
        .assert()
        .success()
        .stdout(predicate::str::contains("already saved"));

    // Fill past the bound; the very first color falls out.
    for i in 0..24 {
        cmd(&temp)
            .args(["palette", "add", &format!("#10{i:02x}00")])
            .assert()
            .success();
    }
    let doc = store_json(temp.path());
    let saved = doc["savedColors"].as_array().unwrap();
    assert_eq!(saved.len(), 24);
    assert!(!saved.iter().any(|c| c == "#aabbcc"));
    assert_eq!(saved.last().unwrap(), "#101700");
}

#[test]
fn palette_rm_and_clear() {
    let temp = TempDir::new().unwrap();
    cmd(&temp).args(["palette", "add", "#111111"]).assert().success();

    cmd(&temp)
        .args(["palette", "rm", "7"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No saved color at 7."));

    cmd(&temp).args(["palette", "clear"]).assert().failure();
    cmd(&temp)
        .args(["palette", "clear", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Cleared saved colors."));

    cmd(&temp)
        .args(["palette"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No saved colors."));
}

#[test]
fn explicit_save_reports_count() {
    let temp = TempDir::new().unwrap();
    cmd(&temp).args(["add", "one"]).assert().success();
    cmd(&temp).args(["add", "two"]).assert().success();

    cmd(&temp)
        .args(["save"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Saved 2 notes."));
}

#[test]
fn malformed_store_degrades_to_empty_state() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("notes.json"), "{definitely not json").unwrap();

    cmd(&temp)
        .args(["list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No notes match."));

    // The next write replaces the broken document.
    cmd(&temp).args(["add", "fresh start"]).assert().success();
    let doc = store_json(temp.path());
    assert_eq!(doc["notes"].as_array().unwrap().len(), 1);
}

#[test]
fn view_and_edit_round_trip() {
    let temp = TempDir::new().unwrap();
    cmd(&temp)
        .args(["new", "Title", "# Heading\n\nsome body", "-t", "demo"])
        .assert()
        .success();
    let id = first_id(&temp);

    cmd(&temp)
        .args(["view", &id, "--render", "--plain"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Title"))
        .stdout(predicate::str::contains("some body"));

    cmd(&temp)
        .args(["edit", &id, "--add-tag", "extra", "--body", "new body"])
        .assert()
        .success()
        .stdout(predicate::str::contains(format!("Updated {id}")));

    cmd(&temp)
        .args(["view", &id])
        .assert()
        .success()
        .stdout(predicate::str::contains("new body"))
        .stdout(predicate::str::contains("#extra"));

    // Repeating the same edit changes nothing and says so.
    cmd(&temp)
        .args(["edit", &id, "--body", "new body"])
        .assert()
        .success()
        .stdout(predicate::str::contains(format!("No changes to {id}")));
}

#[test]
fn delete_removes_notes() {
    let temp = TempDir::new().unwrap();
    cmd(&temp).args(["add", "doomed"]).assert().success();
    let id = first_id(&temp);

    cmd(&temp)
        .args(["delete", &id])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted 1 notes."));

    cmd(&temp)
        .args(["delete", &id])
        .assert()
        .success()
        .stdout(predicate::str::contains("No notes deleted."));
}

#[test]
fn unknown_command_prints_help() {
    let temp = TempDir::new().unwrap();
    cmd(&temp)
        .args(["bogus"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Unknown command: bogus"))
        .stdout(predicate::str::contains("Chroma Notes CLI"));
}
