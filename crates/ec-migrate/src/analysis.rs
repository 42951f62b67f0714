//! Statement capture for analysis runs.
//!
//! When analysis is on, each migration executes through an
//! [`AnalyzingGateway`] that appends every statement to a shared
//! [`StatementLog`] before passing it on unchanged.

use crate::unit::MigrationUnit;
use ec_db::{DbResult, Gateway, Row, Value};
use serde::Serialize;
use std::cell::RefCell;

/// One statement executed by a migration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyzedStatement {
    /// `"<version> - <name>"` of the migration that issued it
    pub migration: String,
    pub database: String,
    pub sql: String,
    pub params: Vec<Value>,
}

/// Statements captured during a run, in execution order.
#[derive(Debug, Default)]
pub struct StatementLog {
    entries: RefCell<Vec<AnalyzedStatement>>,
}

impl StatementLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, statement: AnalyzedStatement) {
        self.entries.borrow_mut().push(statement);
    }

    /// Copy of everything captured so far.
    pub fn entries(&self) -> Vec<AnalyzedStatement> {
        self.entries.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    pub fn clear(&self) {
        self.entries.borrow_mut().clear();
    }

    /// Wrap `inner` so statements issued by `unit` are captured here.
    pub fn wrap<'a>(&'a self, unit: &MigrationUnit, inner: &'a dyn Gateway) -> AnalyzingGateway<'a> {
        AnalyzingGateway {
            log: self,
            migration: unit.to_string(),
            inner,
        }
    }
}

/// Gateway decorator that records statements into a [`StatementLog`].
pub struct AnalyzingGateway<'a> {
    log: &'a StatementLog,
    migration: String,
    inner: &'a dyn Gateway,
}

impl Gateway for AnalyzingGateway<'_> {
    fn execute(&self, database: &str, sql: &str, params: &[Value]) -> DbResult<Vec<Row>> {
        self.log.record(AnalyzedStatement {
            migration: self.migration.clone(),
            database: database.to_string(),
            sql: sql.to_string(),
            params: params.to_vec(),
        });
        self.inner.execute(database, sql, params)
    }
}
