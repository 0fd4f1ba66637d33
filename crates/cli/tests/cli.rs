use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn lexigraph(db: &Path) -> Command {
    let mut cmd = Command::cargo_bin("lexigraph").unwrap();
    cmd.arg("--db-path").arg(db);
    cmd.env_remove("GCP_API_KEY");
    cmd
}

/// Fresh on-disk database inside a tempdir. The guard must be kept alive
/// for the duration of the test.
fn test_db() -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let db = tmp.path().join("data");
    (tmp, db)
}

fn add_document(db: &Path, text: &str) -> String {
    let output = lexigraph(db).args(["add", text]).output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    stdout
        .lines()
        .find_map(|line| line.strip_prefix("✓ Created document: "))
        .expect("add should print the new document id")
        .to_string()
}

// --- Binary startup ---

#[test]
fn binary_runs() {
    let mut cmd = Command::cargo_bin("lexigraph").unwrap();
    cmd.arg("--version");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("lexigraph"));
}

// --- Add / Import / List / Show ---

#[test]
fn add_prints_record_id() {
    let (_tmp, db) = test_db();
    lexigraph(&db)
        .args(["add", "Paris hosts the Louvre", "--title", "Paris"])
        .assert()
        .success()
        .stdout(predicate::str::contains("✓ Created document: document:"));

    lexigraph(&db)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("Paris").and(predicate::str::contains("document:")));
}

#[test]
fn add_reads_stdin() {
    let (_tmp, db) = test_db();
    lexigraph(&db)
        .arg("add")
        .write_stdin("Text arriving on stdin")
        .assert()
        .success()
        .stdout(predicate::str::contains("✓ Created document:"));
}

#[test]
fn add_rejects_empty_text() {
    let (_tmp, db) = test_db();
    lexigraph(&db)
        .args(["add", "   "])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be empty"));
}

#[test]
fn import_creates_document() {
    let (tmp, db) = test_db();
    let file = tmp.path().join("notes.txt");
    std::fs::write(&file, "Rust powers the engine").unwrap();

    lexigraph(&db)
        .arg("import")
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("✓ Imported"));

    lexigraph(&db)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("Rust powers the engine"));
}

#[test]
fn show_displays_document() {
    let (_tmp, db) = test_db();
    let output = lexigraph(&db)
        .args(["add", "Beneath the surface", "--title", "Depths"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    let id = stdout
        .lines()
        .find_map(|line| line.strip_prefix("✓ Created document: "))
        .unwrap();

    lexigraph(&db)
        .args(["show", id])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("Document: Depths")
                .and(predicate::str::contains("Beneath the surface")),
        );
}

// --- Annotate ---

#[test]
fn annotate_dummy_builds_virtual_graph() {
    let (_tmp, db) = test_db();
    add_document(&db, "Paris hosts the Louvre");

    lexigraph(&db)
        .args(["annotate", "entities", "--dummy", "--cutoff", "0.9"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("2 nodes, 1 relationships (virtual)")
                .and(predicate::str::contains("Paris [Entity, Person]")),
        );

    // Virtual runs leave nothing behind.
    lexigraph(&db)
        .arg("stats")
        .assert()
        .success()
        .stdout(predicate::str::contains("Entities: 0"));
}

#[test]
fn annotate_write_persists_graph() {
    let (_tmp, db) = test_db();
    add_document(&db, "Paris hosts the Louvre");
    add_document(&db, "Berlin trains run often");

    lexigraph(&db)
        .args(["annotate", "entities", "--dummy", "--write"])
        .assert()
        .success()
        .stdout(predicate::str::contains("(persisted)"));

    lexigraph(&db)
        .arg("stats")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("Documents: 2")
                .and(predicate::str::contains("Entities: 8"))
                .and(predicate::str::contains("Relationships: 8")),
        );

    lexigraph(&db)
        .args(["nodes", "entities"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Paris").and(predicate::str::contains("Berlin")));

    lexigraph(&db)
        .arg("edges")
        .assert()
        .success()
        .stdout(predicate::str::contains("document:").and(predicate::str::contains("score: 0.95")));
}

#[test]
fn annotate_ids_limits_scope() {
    let (_tmp, db) = test_db();
    let first = add_document(&db, "Paris hosts the Louvre");
    add_document(&db, "Berlin trains run often");

    lexigraph(&db)
        .args(["annotate", "entities", "--dummy", "--ids", &first])
        .assert()
        .success()
        .stdout(predicate::str::contains("5 nodes, 4 relationships"));
}

#[test]
fn annotate_sentiment_refuses_graph() {
    let (_tmp, db) = test_db();
    add_document(&db, "A document to analyze");

    lexigraph(&db)
        .args(["annotate", "sentiment", "--dummy"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("produces no graph"));
}

#[test]
fn annotate_without_key_fails() {
    let (_tmp, db) = test_db();
    add_document(&db, "A document to analyze");

    lexigraph(&db)
        .args(["annotate", "entities"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "mandatory configuration parameter `key`",
        ));
}

#[test]
fn annotate_unknown_kind_fails() {
    let (_tmp, db) = test_db();
    add_document(&db, "A document to analyze");

    lexigraph(&db)
        .args(["annotate", "nonsense", "--dummy"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown analysis kind"));
}

// --- Stream ---

#[test]
fn stream_prints_one_record_per_document() {
    let (_tmp, db) = test_db();
    add_document(&db, "Paris hosts the Louvre");
    add_document(&db, "Berlin trains run often");

    let output = lexigraph(&db)
        .args(["stream", "sentiment", "--dummy"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    let records: Vec<serde_json::Value> = stdout
        .lines()
        .filter(|line| line.trim_start().starts_with('{'))
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();

    assert_eq!(records.len(), 2);
    for record in &records {
        assert!(record["error"].is_null());
        assert!(record["value"]["sentiment"].is_string());
    }
}

// --- Reset ---

#[test]
fn reset_db_removes_store() {
    let (_tmp, db) = test_db();
    add_document(&db, "Soon to be gone");

    lexigraph(&db)
        .arg("reset-db")
        .arg("--db-path")
        .arg(&db)
        .assert()
        .success()
        .stdout(predicate::str::contains("✓ Removed database at"));

    lexigraph(&db)
        .arg("stats")
        .assert()
        .success()
        .stdout(predicate::str::contains("Documents: 0"));
}
