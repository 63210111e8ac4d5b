//! End-to-end tests of the `wordy` binary.
//!
//! `cat` stands in for the real decoder: a source file holding
//! `word<TAB>definition` lines decodes to exactly those entries, and its
//! header falls through to the optimistic sniff verdict.
#![cfg(unix)]

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::{TempDir, tempdir};

struct Env {
    dir: TempDir,
}

impl Env {
    fn new() -> Self {
        Self { dir: tempdir().unwrap() }
    }

    fn db(&self) -> PathBuf {
        self.dir.path().join("store").join("dictionaries.db")
    }

    fn source(&self, name: &str, content: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("wordy"));
        cmd.arg("--quiet")
            .arg("--db")
            .arg(self.db())
            .arg("--decoder")
            .arg("cat")
            .env_remove("WORDY_DB")
            .env_remove("WORDY_DECODER")
            .env_remove("RUST_LOG");
        cmd
    }

    fn import(&self, path: &Path) {
        self.cmd().arg("import").arg(path).assert().success();
    }
}

const GREETINGS: &str = "hello\tgreeting\nhelp\tassistance\nworld\tthe earth\n";

#[test]
fn test_import_reports_entry_count() {
    let env = Env::new();
    let source = env.source("greetings.bgl", GREETINGS);

    env.cmd()
        .arg("import")
        .arg(&source)
        .assert()
        .success()
        .stdout("Imported 3 entries from 'greetings'\n");
}

#[test]
fn test_import_json_outcome() {
    let env = Env::new();
    let source = env.source("greetings.bgl", GREETINGS);

    let output = env.cmd().arg("--format").arg("json").arg("import").arg(&source).output().unwrap();
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["name"], "greetings");
    assert_eq!(value["entry_count"], 3);
}

#[test]
fn test_search_by_name_and_id() {
    let env = Env::new();
    env.import(&env.source("greetings.bgl", GREETINGS));

    env.cmd()
        .args(["search", "greetings", "HEL"])
        .assert()
        .success()
        .stdout("hello\tgreeting\nhelp\tassistance\n");

    env.cmd().args(["search", "1", "wor"]).assert().success().stdout("world\tthe earth\n");
}

#[test]
fn test_search_unknown_dictionary_fails() {
    let env = Env::new();
    env.import(&env.source("greetings.bgl", GREETINGS));

    env.cmd().args(["search", "missing", "hello"]).assert().code(2).stdout("");
}

#[test]
fn test_suggest_lists_words() {
    let env = Env::new();
    env.import(&env.source("greetings.bgl", GREETINGS));

    env.cmd()
        .args(["suggest", "greetings", "he", "--limit", "1"])
        .assert()
        .success()
        .stdout("hello\n");
}

#[test]
fn test_search_records_history() {
    let env = Env::new();
    env.import(&env.source("greetings.bgl", GREETINGS));

    env.cmd().args(["search", "greetings", "hel"]).assert().success();
    env.cmd().args(["search", "greetings", "wor", "--no-history"]).assert().success();

    let output = env.cmd().args(["--format", "json", "history"]).output().unwrap();
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let history = value.as_array().unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0]["query"], "hel");

    env.cmd().args(["history", "--clear"]).assert().success().stdout("Cleared 1 history records\n");
    env.cmd().arg("history").assert().success().stdout("");
}

#[test]
fn test_favorites_lifecycle() {
    let env = Env::new();
    env.import(&env.source("greetings.bgl", GREETINGS));

    env.cmd()
        .args(["favorites", "add", "greetings", "hello"])
        .assert()
        .success()
        .stdout("Added 'hello'\n");
    env.cmd()
        .args(["favorites", "add", "greetings", "hello"])
        .assert()
        .success()
        .stdout("'hello' is already a favorite\n");
    env.cmd().args(["favorites", "check", "greetings", "hello"]).assert().success().stdout("true\n");

    env.cmd()
        .args(["favorites", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("hello\tgreeting"));

    env.cmd()
        .args(["favorites", "remove", "greetings", "hello"])
        .assert()
        .success()
        .stdout("Removed 'hello'\n");
    env.cmd().args(["favorites", "check", "greetings", "hello"]).assert().success().stdout("false\n");
}

#[test]
fn test_favorite_definition_found_among_many_prefix_matches() {
    let env = Env::new();
    let mut content: String = (0..25).map(|i| format!("Apple{i:02}\tfruit {i}\n")).collect();
    content.push_str("a\tthe indefinite article\n");
    env.import(&env.source("words.bgl", &content));

    env.cmd().args(["favorites", "add", "words", "a"]).assert().success().stdout("Added 'a'\n");
    env.cmd()
        .args(["favorites", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("a\tthe indefinite article"));
}

#[test]
fn test_search_and_suggest_limits() {
    let env = Env::new();
    let content: String = (0..30).map(|i| format!("word{i:02}\tdefinition {i}\n")).collect();
    env.import(&env.source("many.bgl", &content));

    let output = env.cmd().args(["search", "many", "word"]).output().unwrap();
    assert_eq!(String::from_utf8_lossy(&output.stdout).lines().count(), 20);

    let output = env.cmd().args(["search", "many", "word", "--limit", "25"]).output().unwrap();
    assert_eq!(String::from_utf8_lossy(&output.stdout).lines().count(), 25);

    env.cmd()
        .args(["suggest", "many", "word", "--limit", "2"])
        .assert()
        .success()
        .stdout("word00\nword01\n");
}

#[test]
fn test_favorite_unknown_word_fails() {
    let env = Env::new();
    env.import(&env.source("greetings.bgl", GREETINGS));

    env.cmd().args(["favorites", "add", "greetings", "zebra"]).assert().code(2);
}

#[test]
fn test_list_and_delete() {
    let env = Env::new();
    env.import(&env.source("greetings.bgl", GREETINGS));
    env.import(&env.source("animals.bgl", "cat\tfeline\n"));

    env.cmd().arg("list").assert().success().stdout("2\tanimals\t1\n1\tgreetings\t3\n");

    env.cmd().args(["delete", "animals"]).assert().success().stdout("Deleted 'animals'\n");
    env.cmd().arg("list").assert().success().stdout("1\tgreetings\t3\n");
    env.cmd().args(["delete", "animals"]).assert().code(2);
}

#[test]
fn test_import_errors_map_to_exit_codes() {
    let env = Env::new();

    env.cmd().args(["import", "/nonexistent/dictionary.bgl"]).assert().code(3);

    let wrong = env.source("notes.txt", GREETINGS);
    env.cmd().arg("import").arg(&wrong).assert().code(2);

    let protected = env.dir.path().join("locked.bgl");
    fs::write(&protected, [0xFE, 0xFF, 0x00, 0x10]).unwrap();
    env.cmd().arg("import").arg(&protected).assert().code(2);

    let empty = env.source("empty.bgl", "\n");
    env.cmd().arg("import").arg(&empty).assert().code(2);
}

#[test]
fn test_scan_reports_each_file() {
    let env = Env::new();
    let sources = env.dir.path().join("sources");
    fs::create_dir(&sources).unwrap();
    fs::write(sources.join("a.bgl"), GREETINGS).unwrap();
    fs::write(sources.join("b.bgl"), "\n").unwrap();

    env.cmd()
        .arg("scan")
        .arg(&sources)
        .assert()
        .code(2)
        .stdout(predicate::str::contains("success\ta.bgl\tImported 3 entries from 'a'"))
        .stdout(predicate::str::contains("error\tb.bgl\t"));

    env.cmd()
        .arg("scan")
        .arg(&sources)
        .assert()
        .code(2)
        .stdout(predicate::str::contains("skip\ta.bgl\talready imported"));

    env.cmd().arg("scan").arg(env.dir.path().join("missing")).assert().code(3);
}

#[test]
fn test_status_does_not_create_store() {
    let env = Env::new();

    env.cmd()
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("health:       Missing"));
    assert!(!env.db().exists());

    env.import(&env.source("greetings.bgl", GREETINGS));
    let output = env.cmd().args(["--format", "json", "status"]).output().unwrap();
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["health"], "healthy");
    assert_eq!(value["dictionaries"], 1);
    assert_eq!(value["entries"], 3);
}

#[test]
fn test_json_search_output() {
    let env = Env::new();
    env.import(&env.source("greetings.bgl", GREETINGS));

    let output = env.cmd().args(["--format", "json", "search", "greetings", "world"]).output().unwrap();
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["query"], "world");
    assert_eq!(value["results"][0]["definition"], "the earth");
}

#[test]
fn test_help_lists_every_exit_code() {
    let output = Command::new(assert_cmd::cargo::cargo_bin!("wordy")).arg("--help").output().unwrap();
    let help = String::from_utf8_lossy(&output.stdout);
    for code in 0..=5 {
        assert!(help.contains(&format!("  {code}   ")), "exit code {code} missing from help: {help}");
    }
}
