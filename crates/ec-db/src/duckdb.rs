//! DuckDB engine adapter

use crate::engine::EngineAdapter;
use crate::error::{DbError, DbResult};
use crate::value::{Row, Value};
use duckdb::types::{ToSqlOutput, Value as DuckValue, ValueRef};
use duckdb::{Connection, ToSql};
use std::path::Path;

/// DuckDB engine adapter
///
/// Single-threaded: the connection is used directly, without a `Mutex`,
/// because a migration run is sequential.
pub struct DuckDbAdapter {
    conn: Connection,
}

impl DuckDbAdapter {
    /// Create a new in-memory DuckDB connection
    pub fn in_memory() -> DbResult<Self> {
        let conn =
            Connection::open_in_memory().map_err(|e| DbError::ConnectionError(e.to_string()))?;
        Ok(Self { conn })
    }

    /// Open (or create) a DuckDB database file
    pub fn from_path(path: &Path) -> DbResult<Self> {
        let conn = Connection::open(path)
            .map_err(|e| DbError::ConnectionError(format!("{e}: {}", path.display())))?;
        Ok(Self { conn })
    }

    /// Create from path string (handles :memory: special case)
    pub fn new(path: &str) -> DbResult<Self> {
        if path == ":memory:" {
            Self::in_memory()
        } else {
            Self::from_path(Path::new(path))
        }
    }

    fn run(&self, sql: &str, params: &[Value]) -> DbResult<Vec<Row>> {
        let mut stmt = self.conn.prepare(sql).map_err(|e| with_sql(e, sql))?;

        // Column metadata is read per row: DuckDB panics on
        // `Statement::column_count` before the statement has executed.
        let rows = stmt
            .query_map(duckdb::params_from_iter(params.iter()), |row| {
                let stmt = row.as_ref();
                let count = stmt.column_count();
                let mut columns = Vec::with_capacity(count);
                for idx in 0..count {
                    let name = stmt
                        .column_name(idx)
                        .map_or_else(|_| format!("column{idx}"), |n| n.to_string());
                    let value: DuckValue = row.get(idx)?;
                    columns.push((name, from_duck(value)));
                }
                Ok(Row::new(columns))
            })
            .map_err(|e| with_sql(e, sql))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| with_sql(e, sql))?;

        Ok(rows)
    }
}

impl EngineAdapter for DuckDbAdapter {
    fn query(&self, sql: &str) -> DbResult<Vec<Row>> {
        self.run(sql, &[])
    }

    fn query_prepared(&self, sql: &str, params: &[Value]) -> DbResult<Vec<Row>> {
        self.run(sql, params)
    }

    fn engine_type(&self) -> &'static str {
        "duckdb"
    }
}

impl ToSql for Value {
    fn to_sql(&self) -> duckdb::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Value::Null => ToSqlOutput::Owned(DuckValue::Null),
            Value::Bool(b) => ToSqlOutput::Owned(DuckValue::Boolean(*b)),
            Value::Int(n) => ToSqlOutput::Owned(DuckValue::BigInt(*n)),
            Value::Float(x) => ToSqlOutput::Owned(DuckValue::Double(*x)),
            Value::Text(s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
        })
    }
}

fn from_duck(value: DuckValue) -> Value {
    match value {
        DuckValue::Null => Value::Null,
        DuckValue::Boolean(b) => Value::Bool(b),
        DuckValue::TinyInt(n) => Value::Int(n.into()),
        DuckValue::SmallInt(n) => Value::Int(n.into()),
        DuckValue::Int(n) => Value::Int(n.into()),
        DuckValue::BigInt(n) => Value::Int(n),
        DuckValue::UTinyInt(n) => Value::Int(n.into()),
        DuckValue::USmallInt(n) => Value::Int(n.into()),
        DuckValue::UInt(n) => Value::Int(n.into()),
        DuckValue::UBigInt(n) => i64::try_from(n)
            .map(Value::Int)
            .unwrap_or_else(|_| Value::Text(n.to_string())),
        DuckValue::HugeInt(n) => i64::try_from(n)
            .map(Value::Int)
            .unwrap_or_else(|_| Value::Text(n.to_string())),
        DuckValue::Float(x) => Value::Float(x.into()),
        DuckValue::Double(x) => Value::Float(x),
        DuckValue::Text(s) => Value::Text(s),
        other => Value::Text(format!("{other:?}")),
    }
}

/// Attach the failing statement to execution errors.
fn with_sql(err: duckdb::Error, sql: &str) -> DbError {
    match DbError::from(err) {
        DbError::ExecutionError(msg) => DbError::ExecutionError(format!("{msg}: {sql}")),
        other => other,
    }
}

#[cfg(test)]
#[path = "duckdb_test.rs"]
mod tests;
