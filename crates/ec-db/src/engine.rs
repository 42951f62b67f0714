//! Engine adapter trait definition

use crate::error::DbResult;
use crate::value::{Row, Value};

/// One database engine behind the gateway.
///
/// An adapter owns a single connection to a single database. Implementations
/// exist per engine (DuckDB ships with this crate); the migration core only
/// ever reaches them through [`crate::Gateway`].
pub trait EngineAdapter {
    /// Run a statement with no bound parameters.
    fn query(&self, sql: &str) -> DbResult<Vec<Row>>;

    /// Run a statement as a prepared statement, binding `params` to its
    /// positional `?` placeholders in order.
    fn query_prepared(&self, sql: &str, params: &[Value]) -> DbResult<Vec<Row>>;

    /// Engine identifier for logging
    fn engine_type(&self) -> &'static str;
}
