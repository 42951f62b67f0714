//! CLI integration tests
//!
//! Drive the `echelon` binary against throwaway projects with a file-backed
//! DuckDB ledger.

use std::path::Path;
use std::process::{Command, Output};

/// Path to the compiled echelon binary (resolved at compile time)
fn echelon_bin() -> String {
    env!("CARGO_BIN_EXE_echelon").to_string()
}

fn project() -> tempfile::TempDir {
    let root = tempfile::tempdir().unwrap();
    std::fs::write(
        root.path().join("echelon.yml"),
        "migrations_dir: db/migrations\n\
         database_name: app\n\
         databases:\n  app:\n    type: duckdb\n    path: app.duckdb\n",
    )
    .unwrap();
    root
}

fn run(root: &Path, args: &[&str]) -> Output {
    Command::new(echelon_bin())
        .args(args)
        .arg("--project-dir")
        .arg(root)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to run echelon")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn assert_success(output: &Output, what: &str) {
    assert!(
        output.status.success(),
        "{what} should succeed.\nstdout: {}\nstderr: {}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
}

/// Create a migration with `echelon new` and fill in its SQL.
fn new_migration(root: &Path, name: &str, up: &str, down: &str) -> String {
    let output = run(root, &["new", name]);
    assert_success(&output, "new");
    let path = stdout(&output).trim().to_string();
    std::fs::write(&path, format!("-- up\n{up}\n-- down\n{down}\n")).unwrap();

    let file_name = Path::new(&path).file_name().unwrap().to_str().unwrap();
    file_name[..22].to_string()
}

#[test]
fn test_init_creates_ledger_and_directory() {
    let root = project();
    let output = run(root.path(), &["init"]);
    assert_success(&output, "init");
    assert!(stdout(&output).contains("schema_migrations"));
    assert!(root.path().join("db/migrations").is_dir());

    // Running init again is harmless.
    assert_success(&run(root.path(), &["init"]), "second init");
}

#[test]
fn test_up_diff_down_round_trip() {
    let root = project();
    assert_success(&run(root.path(), &["init"]), "init");

    let first = new_migration(
        root.path(),
        "create_users",
        "CREATE TABLE users (id INTEGER);",
        "DROP TABLE users;",
    );
    // `new` versions by minute plus a random token; keep the second strictly
    // newer so ordering is deterministic.
    let migrations = root.path().join("db/migrations");
    let second_name = migrations.join("2999-01-01-00-00-zzzzz_add_email.sql");
    std::fs::write(
        &second_name,
        "-- up\nALTER TABLE users ADD COLUMN email VARCHAR;\n-- down\nALTER TABLE users DROP COLUMN email;\n",
    )
    .unwrap();

    let diff = run(root.path(), &["diff", "--output", "json"]);
    assert_success(&diff, "diff");
    let json: serde_json::Value = serde_json::from_str(&stdout(&diff)).unwrap();
    assert_eq!(json["unapplied"].as_array().unwrap().len(), 2);
    assert_eq!(json["unknown"].as_array().unwrap().len(), 0);

    let up = run(root.path(), &["up", "--analyze"]);
    assert_success(&up, "up");
    let up_out = stdout(&up);
    assert!(up_out.contains("2 migration(s) applied"));
    assert!(up_out.contains("CREATE TABLE users (id INTEGER)"));

    let diff = run(root.path(), &["diff"]);
    assert_success(&diff, "diff");
    assert!(stdout(&diff).contains("up to date"));

    let down = run(root.path(), &["down", &first]);
    assert_success(&down, "down");
    assert!(stdout(&down).contains("1 migration(s) rolled back"));

    let diff = run(root.path(), &["diff"]);
    assert!(stdout(&diff).contains("2999-01-01-00-00-zzzzz - add_email"));
}

#[test]
fn test_rollback_limit_fails_the_command() {
    let root = project();
    assert_success(&run(root.path(), &["init"]), "init");
    let migrations = root.path().join("db/migrations");
    std::fs::create_dir_all(&migrations).unwrap();
    for (idx, name) in ["a", "b", "c"].iter().enumerate() {
        std::fs::write(
            migrations.join(format!("2024-01-0{}-00-00-aaaaa_{name}.sql", idx + 1)),
            format!("-- up\nCREATE TABLE {name} (id INTEGER);\n-- down\nDROP TABLE {name};\n"),
        )
        .unwrap();
    }
    assert_success(&run(root.path(), &["up"]), "up");

    let down = run(root.path(), &["down", "0"]);
    assert!(!down.status.success());
    assert!(String::from_utf8_lossy(&down.stderr).contains("[M003]"));
}

#[test]
fn test_backfill_records_without_running() {
    let root = project();
    assert_success(&run(root.path(), &["init"]), "init");
    new_migration(
        root.path(),
        "create_users",
        "CREATE TABLE users (id INTEGER);",
        "DROP TABLE users;",
    );

    let backfill = run(root.path(), &["backfill"]);
    assert_success(&backfill, "backfill");
    assert!(stdout(&backfill).contains("1 migration(s) recorded"));

    let up = run(root.path(), &["up"]);
    assert_success(&up, "up");
    assert!(stdout(&up).contains("Nothing to do"));
}

#[test]
fn test_up_without_init_fails() {
    let root = project();
    std::fs::create_dir_all(root.path().join("db/migrations")).unwrap();
    let output = run(root.path(), &["up"]);
    assert!(!output.status.success());
}

#[test]
fn test_missing_config_fails() {
    let root = tempfile::tempdir().unwrap();
    let output = run(root.path(), &["diff"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("[E001]"));
}

#[test]
fn test_new_rejects_invalid_name() {
    let root = project();
    let output = run(root.path(), &["new", "add-index"]);
    assert!(!output.status.success());
}
