//! The execution gateway used by migrations and the version ledger.

use crate::error::DbResult;
use crate::registry::Databases;
use crate::value::{Row, Value};
use std::rc::Rc;

/// Runs SQL against a named database.
///
/// This is the only database surface migration code and the ledger see.
/// Values are always bound as parameters, never interpolated into `sql`.
pub trait Gateway {
    fn execute(&self, database: &str, sql: &str, params: &[Value]) -> DbResult<Vec<Row>>;
}

/// Gateway that executes every statement on the adapter registered for the
/// addressed database.
pub struct Executor {
    databases: Rc<Databases>,
}

impl Executor {
    pub fn new(databases: Rc<Databases>) -> Self {
        Self { databases }
    }

    pub fn databases(&self) -> &Databases {
        &self.databases
    }
}

impl Gateway for Executor {
    fn execute(&self, database: &str, sql: &str, params: &[Value]) -> DbResult<Vec<Row>> {
        let engine = self.databases.get(database)?;
        log::trace!("[{database}/{}] {sql}", engine.engine_type());
        if params.is_empty() {
            engine.query(sql)
        } else {
            engine.query_prepared(sql, params)
        }
    }
}

impl<G: Gateway + ?Sized> Gateway for Rc<G> {
    fn execute(&self, database: &str, sql: &str, params: &[Value]) -> DbResult<Vec<Row>> {
        (**self).execute(database, sql, params)
    }
}

impl<G: Gateway + ?Sized> Gateway for &G {
    fn execute(&self, database: &str, sql: &str, params: &[Value]) -> DbResult<Vec<Row>> {
        (**self).execute(database, sql, params)
    }
}

#[cfg(test)]
#[path = "gateway_test.rs"]
mod tests;
