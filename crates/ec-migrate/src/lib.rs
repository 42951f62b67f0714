//! ec-migrate - Migration engine for Echelon
//!
//! Discovers versioned migration files, tracks which versions have been
//! applied in the `schema_migrations` ledger, and runs migrations forward or
//! backward through an [`ec_db::Gateway`].

pub mod analysis;
pub mod code;
pub mod coordinator;
pub mod error;
pub mod ledger;
pub mod scaffold;
pub mod script;
pub mod unit;

pub use analysis::{AnalyzedStatement, AnalyzingGateway, StatementLog};
pub use code::{CodeLoader, CodeRegistry, Db, MigrationCode};
pub use coordinator::{
    discover_units, Coordinator, RollbackRequest, RunReport, MAX_ROLLBACKS_ALLOWED,
};
pub use error::{BoxError, MigrateError, MigrateResult};
pub use ledger::{init_schema_table, AppliedVersion, LedgerDiff, VersionLedger, SCHEMA_TABLE};
pub use scaffold::create_migration_file;
pub use script::SqlScript;
pub use unit::{parse_file_name, MigrationUnit};

#[cfg(test)]
mod test_support;
