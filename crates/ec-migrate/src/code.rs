//! Migration code: the up/down behavior behind each migration file, and how
//! it is resolved from a file on disk.

use crate::error::{BoxError, MigrateError, MigrateResult};
use crate::script::SqlScript;
use ec_core::MigrationName;
use ec_db::{DbResult, Gateway, Row, Value};
use std::collections::HashMap;
use std::path::Path;

/// Database handle passed to migration code.
///
/// Statements go to the project's default database unless a database is
/// named explicitly with [`Db::execute_on`].
#[derive(Clone, Copy)]
pub struct Db<'a> {
    gateway: &'a dyn Gateway,
    default_database: &'a str,
}

impl<'a> Db<'a> {
    pub fn new(gateway: &'a dyn Gateway, default_database: &'a str) -> Self {
        Self {
            gateway,
            default_database,
        }
    }

    /// Execute on the default database.
    pub fn execute(&self, sql: &str, params: &[Value]) -> DbResult<Vec<Row>> {
        self.gateway.execute(self.default_database, sql, params)
    }

    /// Execute on a named database.
    pub fn execute_on(&self, database: &str, sql: &str, params: &[Value]) -> DbResult<Vec<Row>> {
        self.gateway.execute(database, sql, params)
    }

    pub fn default_database(&self) -> &'a str {
        self.default_database
    }

    pub fn gateway(&self) -> &'a dyn Gateway {
        self.gateway
    }
}

/// The code of one migration.
pub trait MigrationCode {
    /// Apply the schema change.
    fn up(&self, db: &Db<'_>) -> Result<(), BoxError>;

    /// Revert the schema change.
    fn down(&self, db: &Db<'_>) -> Result<(), BoxError>;
}

/// Resolves the code for a migration file.
pub trait CodeLoader {
    fn load(&self, name: &MigrationName, source: &Path) -> MigrateResult<Box<dyn MigrationCode>>;
}

type CodeFactory = Box<dyn Fn() -> Box<dyn MigrationCode>>;

/// Code loader backed by compiled-in migrations.
///
/// Migrations registered under their name take precedence; any other file
/// with a `.sql` extension is loaded as an [`SqlScript`].
#[derive(Default)]
pub struct CodeRegistry {
    factories: HashMap<String, CodeFactory>,
}

impl CodeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register code for the migration called `name`.
    pub fn register<F, C>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn() -> C + 'static,
        C: MigrationCode + 'static,
    {
        self.factories.insert(
            name.into(),
            Box::new(move || Box::new(factory()) as Box<dyn MigrationCode>),
        );
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl CodeLoader for CodeRegistry {
    fn load(&self, name: &MigrationName, source: &Path) -> MigrateResult<Box<dyn MigrationCode>> {
        if let Some(factory) = self.factories.get(name.as_str()) {
            log::debug!("Using registered code for migration '{name}'");
            return Ok(factory());
        }

        let is_sql = source
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("sql"));
        if is_sql {
            return Ok(Box::new(SqlScript::load(source)?));
        }

        Err(MigrateError::CodeLoad {
            migration: name.to_string(),
            path: source.display().to_string(),
            message: "no code is registered under this name and the file is not an .sql script"
                .to_string(),
        })
    }
}

#[cfg(test)]
#[path = "code_test.rs"]
mod tests;
