use super::*;

#[test]
fn test_in_memory() {
    let db = DuckDbAdapter::in_memory().unwrap();
    assert_eq!(db.engine_type(), "duckdb");
}

#[test]
fn test_new_handles_memory_path() {
    let db = DuckDbAdapter::new(":memory:").unwrap();
    let rows = db.query("SELECT 42 AS answer").unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].get("answer"), Some(&Value::Int(42)));
}

#[test]
fn test_query_returns_named_columns_in_order() {
    let db = DuckDbAdapter::in_memory().unwrap();
    let rows = db
        .query("SELECT 'a' AS letter, 1 AS n, NULL AS nothing, true AS flag")
        .unwrap();
    let names: Vec<&str> = rows[0].columns().iter().map(|(n, _)| n.as_str()).collect();
    assert_eq!(names, vec!["letter", "n", "nothing", "flag"]);
    assert_eq!(rows[0].get_str("letter"), Some("a"));
    assert!(rows[0].get("nothing").unwrap().is_null());
    assert_eq!(rows[0].get("flag"), Some(&Value::Bool(true)));
}

#[test]
fn test_query_prepared_binds_positional_params() {
    let db = DuckDbAdapter::in_memory().unwrap();
    db.query("CREATE TABLE people (id INTEGER, name VARCHAR)")
        .unwrap();
    db.query_prepared(
        "INSERT INTO people VALUES (?, ?)",
        &[Value::Int(1), Value::from("O'Brien")],
    )
    .unwrap();

    let rows = db
        .query_prepared("SELECT id, name FROM people WHERE name = ?", &["O'Brien".into()])
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].get("id").and_then(Value::as_i64), Some(1));
    assert_eq!(rows[0].get_str("name"), Some("O'Brien"));
}

#[test]
fn test_ddl_returns_no_meaningful_rows() {
    let db = DuckDbAdapter::in_memory().unwrap();
    db.query("CREATE TABLE t (id INTEGER)").unwrap();
    let rows = db.query("SELECT * FROM t").unwrap();
    assert!(rows.is_empty());
}

#[test]
fn test_missing_table_is_classified() {
    let db = DuckDbAdapter::in_memory().unwrap();
    let err = db.query("SELECT * FROM does_not_exist").unwrap_err();
    assert!(matches!(err, DbError::TableNotFound(_)), "got {err}");
}

#[test]
fn test_syntax_error_includes_statement() {
    let db = DuckDbAdapter::in_memory().unwrap();
    let err = db.query("SELEC 1").unwrap_err();
    match err {
        DbError::ExecutionError(msg) => assert!(msg.ends_with(": SELEC 1"), "got {msg}"),
        other => panic!("expected ExecutionError, got {other}"),
    }
}

#[test]
fn test_file_database_persists() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("app.duckdb");
    {
        let db = DuckDbAdapter::from_path(&path).unwrap();
        db.query("CREATE TABLE kept (v VARCHAR)").unwrap();
        db.query_prepared("INSERT INTO kept VALUES (?)", &["x".into()])
            .unwrap();
    }
    let db = DuckDbAdapter::from_path(&path).unwrap();
    let rows = db.query("SELECT v FROM kept").unwrap();
    assert_eq!(rows[0].get_str("v"), Some("x"));
}
