//! The `schema_migrations` ledger of applied versions.
//!
//! The ledger is read once when a run starts. After that the in-memory
//! snapshot is the source of truth for the run, and every change is written
//! to the table first and mirrored into the snapshot only once the write
//! succeeded.

use crate::error::MigrateResult;
use crate::unit::MigrationUnit;
use ec_core::{DbType, Direction};
use ec_db::{DbError, Gateway, Value};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::rc::Rc;

/// Name of the ledger table.
pub const SCHEMA_TABLE: &str = "schema_migrations";

/// Create the ledger table on `database` if it does not exist yet.
pub fn init_schema_table(gateway: &dyn Gateway, database: &str, db_type: DbType) -> MigrateResult<()> {
    let statements: &[&str] = match db_type {
        DbType::DuckDb => &[
            "CREATE SEQUENCE IF NOT EXISTS schema_migrations_id_seq",
            "CREATE TABLE IF NOT EXISTS schema_migrations (\n    \
             id INTEGER PRIMARY KEY DEFAULT nextval('schema_migrations_id_seq'),\n    \
             version VARCHAR(22) NOT NULL,\n    \
             name VARCHAR(255) NOT NULL\n)",
        ],
    };
    for sql in statements {
        gateway.execute(database, sql, &[])?;
    }
    log::info!("Initialized {SCHEMA_TABLE} on database '{database}'");
    Ok(())
}

/// One ledger row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppliedVersion {
    pub version: String,
    pub name: String,
}

impl fmt::Display for AppliedVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.version, self.name)
    }
}

/// Comparison of the migrations on disk with the ledger.
#[derive(Debug, Default)]
pub struct LedgerDiff<'u> {
    /// Units on disk that the ledger has no row for, in version order
    pub unapplied: Vec<&'u MigrationUnit>,
    /// Versions present both on disk and in the ledger
    pub matched: Vec<String>,
    /// Ledger rows with no matching unit on disk
    pub unknown: Vec<AppliedVersion>,
}

impl LedgerDiff<'_> {
    /// True when disk and ledger agree.
    pub fn is_clean(&self) -> bool {
        self.unapplied.is_empty() && self.unknown.is_empty()
    }
}

/// In-memory view of the ledger plus the writer for the current direction.
pub struct VersionLedger {
    gateway: Rc<dyn Gateway>,
    database: String,
    direction: Direction,
    applied: BTreeMap<String, String>,
    starting_max: Option<AppliedVersion>,
}

impl VersionLedger {
    /// Read every row of the ledger on `database`.
    pub fn load(
        gateway: Rc<dyn Gateway>,
        database: impl Into<String>,
        direction: Direction,
    ) -> MigrateResult<Self> {
        let database = database.into();
        let rows = gateway.execute(
            &database,
            &format!("SELECT version, name FROM {SCHEMA_TABLE} ORDER BY version"),
            &[],
        )?;

        let mut applied = BTreeMap::new();
        for row in rows {
            let (Some(version), Some(name)) = (row.get_str("version"), row.get_str("name")) else {
                return Err(DbError::ExecutionError(format!(
                    "unexpected row shape in {SCHEMA_TABLE}: {row:?}"
                ))
                .into());
            };
            applied.insert(version.to_string(), name.to_string());
        }

        let starting_max = applied
            .iter()
            .next_back()
            .map(|(version, name)| AppliedVersion {
                version: version.clone(),
                name: name.clone(),
            });

        log::debug!(
            "Loaded {} ledger row(s) from {SCHEMA_TABLE} on '{database}'",
            applied.len()
        );

        Ok(Self {
            gateway,
            database,
            direction,
            applied,
            starting_max,
        })
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Switch which write [`Self::track_version_affected`] performs.
    pub fn set_direction(&mut self, direction: Direction) {
        self.direction = direction;
    }

    pub fn database(&self) -> &str {
        &self.database
    }

    pub fn is_applied(&self, unit: &MigrationUnit) -> bool {
        self.contains_version(unit.version().as_str())
    }

    pub fn contains_version(&self, version: &str) -> bool {
        self.applied.contains_key(version)
    }

    /// Applied versions with their names, in version order.
    pub fn applied(&self) -> impl Iterator<Item = AppliedVersion> + '_ {
        self.applied.iter().map(|(version, name)| AppliedVersion {
            version: version.clone(),
            name: name.clone(),
        })
    }

    pub fn len(&self) -> usize {
        self.applied.len()
    }

    pub fn is_empty(&self) -> bool {
        self.applied.is_empty()
    }

    /// Highest version in the ledger when it was loaded.
    pub fn starting_max(&self) -> Option<&AppliedVersion> {
        self.starting_max.as_ref()
    }

    /// Insert a ledger row for `unit`.
    pub fn record_applied(&mut self, unit: &MigrationUnit) -> MigrateResult<()> {
        log::info!("# Tracking migrate up to {unit}");
        self.gateway.execute(
            &self.database,
            &format!("INSERT INTO {SCHEMA_TABLE} (version, name) VALUES (?, ?)"),
            &[
                Value::from(unit.version().as_str()),
                Value::from(unit.name().as_str()),
            ],
        )?;
        self.applied
            .insert(unit.version().to_string(), unit.name().to_string());
        Ok(())
    }

    /// Delete the ledger row for `unit`.
    pub fn record_rolled_back(&mut self, unit: &MigrationUnit) -> MigrateResult<()> {
        log::info!("# Tracking rollback of {unit}");
        self.gateway.execute(
            &self.database,
            &format!("DELETE FROM {SCHEMA_TABLE} WHERE version = ?"),
            &[Value::from(unit.version().as_str())],
        )?;
        self.applied.remove(unit.version().as_str());
        Ok(())
    }

    /// Record that `unit` ran in the ledger's current direction.
    pub fn track_version_affected(&mut self, unit: &MigrationUnit) -> MigrateResult<()> {
        match self.direction {
            Direction::Forward => self.record_applied(unit),
            Direction::Backward => self.record_rolled_back(unit),
        }
    }

    /// Compare `units` (sorted by version) with the snapshot.
    pub fn diff<'u>(&self, units: &'u [MigrationUnit]) -> LedgerDiff<'u> {
        let mut diff = LedgerDiff::default();
        let mut on_disk = BTreeSet::new();

        for unit in units {
            let version = unit.version().as_str();
            on_disk.insert(version);
            if self.contains_version(version) {
                diff.matched.push(version.to_string());
            } else {
                diff.unapplied.push(unit);
            }
        }

        diff.unknown = self
            .applied()
            .filter(|row| !on_disk.contains(row.version.as_str()))
            .collect();
        diff
    }
}

impl fmt::Display for VersionLedger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.starting_max {
            Some(max) => write!(
                f,
                "{} migration(s) applied; max is {} - {}",
                self.applied.len(),
                max.version,
                max.name
            ),
            None => f.write_str("none"),
        }
    }
}

impl fmt::Debug for VersionLedger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VersionLedger")
            .field("database", &self.database)
            .field("direction", &self.direction)
            .field("applied", &self.applied)
            .finish()
    }
}

#[cfg(test)]
#[path = "ledger_test.rs"]
mod tests;
