//! End-to-end runs over a project directory with a file-backed DuckDB ledger.

use ec_core::Config;
use ec_db::{ConfigAdapterFactory, Databases, Executor, Gateway};
use ec_migrate::{
    init_schema_table, CodeLoader, CodeRegistry, Coordinator, MigrateError, StatementLog,
};
use std::path::Path;
use std::rc::Rc;
use tempfile::TempDir;

const CONFIG: &str = r#"
migrations_dir: db/migrations
database_name: app
databases:
  app:
    type: duckdb
    path: data/app.duckdb
  logs:
    type: duckdb
    path: data/logs.duckdb
on_run_start:
  - "CREATE TABLE IF NOT EXISTS run_log (phase VARCHAR)"
  - "INSERT INTO run_log VALUES ('start')"
on_run_end:
  - "INSERT INTO run_log VALUES ('end')"
"#;

fn project() -> TempDir {
    let root = tempfile::tempdir().unwrap();
    std::fs::write(root.path().join("echelon.yml"), CONFIG).unwrap();
    std::fs::create_dir_all(root.path().join("data")).unwrap();
    let migrations = root.path().join("db/migrations");
    std::fs::create_dir_all(&migrations).unwrap();

    write_migration(
        &migrations,
        "2024-02-01-10-00-a1b2c_create_users.sql",
        "-- up\nCREATE TABLE users (id INTEGER, email VARCHAR);\n-- down\nDROP TABLE users;\n",
    );
    write_migration(
        &migrations,
        "2024-02-02-10-00-d3e4f_create_events.sql",
        "-- database: logs\n-- up\nCREATE TABLE events (id INTEGER);\n-- down\nDROP TABLE events;\n",
    );
    write_migration(
        &migrations,
        "2024-02-03-10-00-g5h6i_seed_users.sql",
        "-- up\nINSERT INTO users VALUES (1, 'a@example.com');\n-- down\nDELETE FROM users;\n",
    );
    std::fs::write(migrations.join("README.md"), "migrations live here").unwrap();
    root
}

fn write_migration(dir: &Path, file_name: &str, body: &str) {
    std::fs::write(dir.join(file_name), body).unwrap();
}

/// Open the project the way the CLI does, with fresh connections.
fn open(root: &Path) -> (Config, Rc<dyn Gateway>) {
    let config = Config::load_from_dir(root).unwrap();
    let databases = Databases::with_factory(ConfigAdapterFactory::from_config(&config, root));
    let gateway: Rc<dyn Gateway> = Rc::new(Executor::new(Rc::new(databases)));
    (config, gateway)
}

fn open_coordinator(root: &Path) -> (Coordinator, Rc<dyn Gateway>) {
    let (config, gateway) = open(root);
    let loader: Rc<dyn CodeLoader> = Rc::new(CodeRegistry::new());
    let coordinator =
        Coordinator::from_config(&config, root, Rc::clone(&gateway), loader).unwrap();
    (coordinator, gateway)
}

fn init(root: &Path) {
    let (config, gateway) = open(root);
    init_schema_table(
        gateway.as_ref(),
        &config.database_name,
        config.default_database().unwrap().db_type,
    )
    .unwrap();
}

#[test]
fn test_up_diff_and_down_across_invocations() {
    let root = project();
    init(root.path());

    {
        let (mut coordinator, gateway) = open_coordinator(root.path());
        assert_eq!(coordinator.get_diff().unapplied.len(), 3);

        let report = coordinator.migrate_up().unwrap();
        assert_eq!(report.processed.len(), 3);

        let users = gateway.execute("app", "SELECT email FROM users", &[]).unwrap();
        assert_eq!(users[0].get_str("email"), Some("a@example.com"));
        assert!(gateway.execute("logs", "SELECT * FROM events", &[]).is_ok());

        let phases = gateway
            .execute("app", "SELECT phase FROM run_log ORDER BY rowid", &[])
            .unwrap();
        assert_eq!(phases.len(), 2);
    }

    // A second invocation sees the persisted ledger.
    {
        let (mut coordinator, _) = open_coordinator(root.path());
        assert!(coordinator.get_diff().is_clean());
        assert_eq!(
            coordinator.ledger().to_string(),
            "3 migration(s) applied; max is 2024-02-03-10-00-g5h6i - seed_users"
        );

        let report = coordinator
            .migrate_down("2024-02-01-10-00-a1b2c")
            .unwrap();
        assert_eq!(report.processed.len(), 2);
    }

    {
        let (coordinator, gateway) = open_coordinator(root.path());
        let diff = coordinator.get_diff();
        assert_eq!(diff.unapplied.len(), 2);
        assert!(gateway.execute("logs", "SELECT * FROM events", &[]).is_err());
        let users = gateway.execute("app", "SELECT * FROM users", &[]).unwrap();
        assert!(users.is_empty());
    }
}

#[test]
fn test_rollback_limit_applies_across_invocations() {
    let root = project();
    init(root.path());
    open_coordinator(root.path()).0.migrate_up().unwrap();

    let (mut coordinator, _) = open_coordinator(root.path());
    let err = coordinator.migrate_down("0").err().unwrap();
    assert!(matches!(
        err,
        MigrateError::RollbackLimitExceeded { pending: 3, .. }
    ));
    assert!(err.to_string().starts_with("[M003]"));
}

#[test]
fn test_backfill_then_up_runs_nothing() {
    let root = project();
    init(root.path());

    {
        let (mut coordinator, gateway) = open_coordinator(root.path());
        let report = coordinator.backfill_new_db().unwrap();
        assert_eq!(report.processed.len(), 3);
        assert!(gateway.execute("app", "SELECT * FROM users", &[]).is_err());
    }

    let (mut coordinator, _) = open_coordinator(root.path());
    let report = coordinator.migrate_up().unwrap();
    assert!(report.processed.is_empty());
    assert_eq!(report.skipped, 3);
}

#[test]
fn test_analysis_lists_statements_per_database() {
    let root = project();
    init(root.path());

    let log = Rc::new(StatementLog::new());
    let (coordinator, _) = open_coordinator(root.path());
    let mut coordinator = coordinator.with_analysis(Rc::clone(&log));
    coordinator.migrate_up().unwrap();

    let databases: Vec<_> = log.entries().into_iter().map(|e| e.database).collect();
    assert_eq!(databases, vec!["app", "logs", "app"]);
}

#[test]
fn test_invalid_script_stops_the_run() {
    let root = project();
    init(root.path());
    write_migration(
        &root.path().join("db/migrations"),
        "2024-02-04-10-00-j7k8l_broken.sql",
        "CREATE TABLE nope (id INTEGER);\n",
    );

    let (mut coordinator, _) = open_coordinator(root.path());
    let err = coordinator.migrate_up().err().unwrap();
    assert!(matches!(err, MigrateError::InvalidScript { .. }));
    assert_eq!(coordinator.ledger().len(), 3);
}
