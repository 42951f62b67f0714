//! Shared fixtures for unit tests.

use crate::code::{CodeRegistry, Db, MigrationCode};
use crate::error::BoxError;
use crate::ledger::init_schema_table;
use ec_core::DbType;
use ec_db::{Databases, DuckDbAdapter, Executor, Gateway, Value};
use std::cell::RefCell;
use std::rc::Rc;

pub(crate) const V1: &str = "2024-01-01-00-00-aaaa1";
pub(crate) const V2: &str = "2024-01-02-00-00-aaaa2";
pub(crate) const V3: &str = "2024-01-03-00-00-aaaa3";
pub(crate) const V4: &str = "2024-01-04-00-00-aaaa4";
pub(crate) const V5: &str = "2024-01-05-00-00-aaaa5";

pub(crate) type Calls = Rc<RefCell<Vec<String>>>;

/// Gateway over fresh in-memory DuckDB databases, one per name.
pub(crate) fn memory_gateway(names: &[&str]) -> Rc<dyn Gateway> {
    let databases = Databases::default();
    for name in names {
        databases.insert(*name, Rc::new(DuckDbAdapter::in_memory().unwrap()));
    }
    Rc::new(Executor::new(Rc::new(databases)))
}

/// In-memory "app" database with an empty ledger table.
pub(crate) fn ledger_gateway() -> Rc<dyn Gateway> {
    let gateway = memory_gateway(&["app"]);
    init_schema_table(gateway.as_ref(), "app", DbType::DuckDb).unwrap();
    gateway
}

pub(crate) fn insert_ledger_row(gateway: &dyn Gateway, version: &str, name: &str) {
    gateway
        .execute(
            "app",
            "INSERT INTO schema_migrations (version, name) VALUES (?, ?)",
            &[Value::from(version), Value::from(name)],
        )
        .unwrap();
}

pub(crate) fn ledger_versions(gateway: &dyn Gateway) -> Vec<String> {
    gateway
        .execute(
            "app",
            "SELECT version FROM schema_migrations ORDER BY version",
            &[],
        )
        .unwrap()
        .iter()
        .map(|row| row.get_str("version").unwrap().to_string())
        .collect()
}

pub(crate) fn table_exists(gateway: &dyn Gateway, table: &str) -> bool {
    gateway
        .execute("app", &format!("SELECT * FROM {table}"), &[])
        .is_ok()
}

/// Migration code that creates (up) or drops (down) a table named after the
/// migration and records each call.
pub(crate) struct TableMigration {
    pub(crate) name: String,
    pub(crate) calls: Calls,
    pub(crate) fail_up: bool,
}

impl MigrationCode for TableMigration {
    fn up(&self, db: &Db<'_>) -> Result<(), BoxError> {
        if self.fail_up {
            return Err(format!("cannot create {}", self.name).into());
        }
        db.execute(&format!("CREATE TABLE {} (id INTEGER)", self.name), &[])?;
        self.calls.borrow_mut().push(format!("up {}", self.name));
        Ok(())
    }

    fn down(&self, db: &Db<'_>) -> Result<(), BoxError> {
        db.execute(&format!("DROP TABLE IF EXISTS {}", self.name), &[])?;
        self.calls.borrow_mut().push(format!("down {}", self.name));
        Ok(())
    }
}

/// Registry with a [`TableMigration`] for each name; names in `failing`
/// fail on the way up.
pub(crate) fn table_registry(names: &[&str], failing: &[&str], calls: &Calls) -> CodeRegistry {
    let mut registry = CodeRegistry::new();
    for name in names {
        let calls = Rc::clone(calls);
        let owned = name.to_string();
        let fail_up = failing.contains(name);
        registry.register(*name, move || TableMigration {
            name: owned.clone(),
            calls: Rc::clone(&calls),
            fail_up,
        });
    }
    registry
}
