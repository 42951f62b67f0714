//! Init command implementation - prepares a project's ledger database

use anyhow::{Context, Result};
use ec_migrate::{init_schema_table, SCHEMA_TABLE};

use crate::cli::{GlobalArgs, InitArgs};
use crate::commands::common::Session;

/// Execute the init command
pub(crate) fn execute(_args: &InitArgs, global: &GlobalArgs) -> Result<()> {
    let session = Session::open(global)?;
    let database = &session.config.database_name;
    let db_type = session.config.default_database()?.db_type;

    init_schema_table(session.gateway.as_ref(), database, db_type)
        .with_context(|| format!("Failed to create {SCHEMA_TABLE} on '{database}'"))?;
    println!("Created {SCHEMA_TABLE} on database '{database}' ({db_type})");

    let dir = session.migrations_dir();
    if !dir.is_dir() {
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
        println!("Created migrations directory {}", dir.display());
    }
    Ok(())
}
