//! Migration coordinator: discovers migration files, compares them with the
//! ledger, and runs them forward or backward.
//!
//! Runs are strictly sequential. There is no transaction around a run: when
//! a migration fails the run stops, migrations already completed stay applied
//! and recorded, and nothing is compensated.

use crate::analysis::StatementLog;
use crate::code::{CodeLoader, Db};
use crate::error::{MigrateError, MigrateResult};
use crate::ledger::{LedgerDiff, VersionLedger};
use crate::script::split_statements;
use crate::unit::MigrationUnit;
use ec_core::{Config, Direction};
use ec_db::Gateway;
use serde::Serialize;
use std::path::Path;
use std::rc::Rc;
use std::time::Instant;

/// Most migrations a single rollback may undo.
pub const MAX_ROLLBACKS_ALLOWED: usize = 2;

/// Target of a backward run.
///
/// Rolling back stops at the first applied unit whose version is less than
/// or equal to the target; that unit stays applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RollbackRequest {
    target_version: String,
}

impl RollbackRequest {
    pub fn new(target_version: impl Into<String>) -> Self {
        Self {
            target_version: target_version.into(),
        }
    }

    pub fn target_version(&self) -> &str {
        &self.target_version
    }

    /// Whether walking down has reached `unit`.
    pub fn is_reached(&self, unit: &MigrationUnit) -> bool {
        unit.version().as_str() <= self.target_version.as_str()
    }
}

/// Outcome of a coordinator run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub direction: Direction,
    /// `"<version> - <name>"` of each migration run (or recorded, for a
    /// backfill), in the order processed
    pub processed: Vec<String>,
    /// Units skipped because they were already in the desired state
    pub skipped: usize,
    pub elapsed_ms: u128,
}

impl RunReport {
    fn new(direction: Direction) -> Self {
        Self {
            direction,
            processed: Vec::new(),
            skipped: 0,
            elapsed_ms: 0,
        }
    }
}

/// Read the migrations directory and build a sorted list of units.
///
/// Entries whose names do not match the migration file pattern are ignored.
pub fn discover_units(dir: &Path, loader: &Rc<dyn CodeLoader>) -> MigrateResult<Vec<MigrationUnit>> {
    if !dir.is_dir() {
        return Err(MigrateError::Configuration {
            message: format!("migrations directory not found: {}", dir.display()),
        });
    }

    let io_error = |e: std::io::Error| MigrateError::Io {
        path: dir.display().to_string(),
        source: e,
    };

    let mut units = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(io_error)? {
        let entry = entry.map_err(io_error)?;
        // `is_file` follows symlinks.
        if !entry.path().is_file() {
            continue;
        }
        let file_name = entry.file_name();
        let Some(file_name) = file_name.to_str() else {
            continue;
        };
        match MigrationUnit::create_or_not(file_name, dir, loader) {
            Some(unit) => {
                log::debug!("Loaded {unit}");
                units.push(unit);
            }
            None => log::trace!("Ignoring {file_name}: not a migration file"),
        }
    }
    units.sort();

    for pair in units.windows(2) {
        if pair[0].version() == pair[1].version() {
            return Err(MigrateError::DuplicateVersion {
                version: pair[0].version().to_string(),
                first: pair[0].source().display().to_string(),
                second: pair[1].source().display().to_string(),
            });
        }
    }

    Ok(units)
}

/// Runs migrations against one ledger database.
pub struct Coordinator {
    gateway: Rc<dyn Gateway>,
    database: String,
    units: Vec<MigrationUnit>,
    ledger: VersionLedger,
    analysis: Option<Rc<StatementLog>>,
    on_run_start: Vec<String>,
    on_run_end: Vec<String>,
}

impl Coordinator {
    /// Discover the migrations in `migrations_dir` and load the ledger from
    /// `database`.
    pub fn new(
        migrations_dir: &Path,
        database: impl Into<String>,
        gateway: Rc<dyn Gateway>,
        loader: Rc<dyn CodeLoader>,
    ) -> MigrateResult<Self> {
        let database = database.into();
        if database.trim().is_empty() {
            return Err(MigrateError::Configuration {
                message: "database name cannot be empty".to_string(),
            });
        }

        let units = discover_units(migrations_dir, &loader)?;
        let ledger = VersionLedger::load(Rc::clone(&gateway), database.clone(), Direction::Forward)?;

        Ok(Self {
            gateway,
            database,
            units,
            ledger,
            analysis: None,
            on_run_start: Vec::new(),
            on_run_end: Vec::new(),
        })
    }

    /// Build a coordinator for a project, taking the migrations directory,
    /// ledger database and run hooks from its configuration.
    pub fn from_config(
        config: &Config,
        root: &Path,
        gateway: Rc<dyn Gateway>,
        loader: Rc<dyn CodeLoader>,
    ) -> MigrateResult<Self> {
        let coordinator = Self::new(
            &config.migrations_dir_absolute(root),
            config.database_name.as_str(),
            gateway,
            loader,
        )?;
        Ok(coordinator.with_run_hooks(config.on_run_start.clone(), config.on_run_end.clone()))
    }

    /// Capture every statement migrations execute into `log`.
    pub fn with_analysis(mut self, log: Rc<StatementLog>) -> Self {
        self.analysis = Some(log);
        self
    }

    /// Statements run on the ledger database around each up/down run.
    /// `on_run_end` is skipped when the run fails.
    pub fn with_run_hooks(mut self, on_run_start: Vec<String>, on_run_end: Vec<String>) -> Self {
        self.on_run_start = on_run_start;
        self.on_run_end = on_run_end;
        self
    }

    pub fn units(&self) -> &[MigrationUnit] {
        &self.units
    }

    pub fn ledger(&self) -> &VersionLedger {
        &self.ledger
    }

    pub fn database(&self) -> &str {
        &self.database
    }

    /// Apply every migration not yet in the ledger, oldest first.
    pub fn migrate_up(&mut self) -> MigrateResult<RunReport> {
        let started = Instant::now();
        self.ledger.set_direction(Direction::Forward);
        self.log_run_start(Direction::Forward);
        self.run_hooks(&self.on_run_start)?;

        let mut report = RunReport::new(Direction::Forward);
        for unit in &self.units {
            if self.ledger.is_applied(unit) {
                report.skipped += 1;
                continue;
            }

            run_unit(
                unit,
                Direction::Forward,
                &*self.gateway,
                &self.database,
                self.analysis.as_deref(),
            )?;
            self.ledger.track_version_affected(unit)?;
            log::debug!("Migrated up: version {unit}");
            report.processed.push(unit.to_string());
        }

        self.run_hooks(&self.on_run_end)?;
        report.elapsed_ms = started.elapsed().as_millis();
        log::info!(
            "Migration complete: {} applied, {} already applied",
            report.processed.len(),
            report.skipped
        );
        Ok(report)
    }

    /// Roll back applied migrations, newest first, until reaching the first
    /// applied migration at or below `target_version`.
    ///
    /// Fails without touching anything when more than
    /// [`MAX_ROLLBACKS_ALLOWED`] migrations would be rolled back.
    pub fn migrate_down(&mut self, target_version: &str) -> MigrateResult<RunReport> {
        let started = Instant::now();
        let request = RollbackRequest::new(target_version);

        let pending = self.pending_rollback_count(&request);
        if pending > MAX_ROLLBACKS_ALLOWED {
            log::error!(
                "Target version {target_version} exceeds rollback limit: \
                 {pending} migration(s) would be rolled back"
            );
            return Err(MigrateError::RollbackLimitExceeded {
                target: target_version.to_string(),
                pending,
                limit: MAX_ROLLBACKS_ALLOWED,
            });
        }

        self.ledger.set_direction(Direction::Backward);
        self.log_run_start(Direction::Backward);
        self.run_hooks(&self.on_run_start)?;

        let mut report = RunReport::new(Direction::Backward);
        for unit in self.units.iter().rev() {
            if !self.ledger.is_applied(unit) {
                log::debug!(
                    "Version never applied, skipping roll back on: {}",
                    unit.version()
                );
                report.skipped += 1;
                continue;
            }
            if request.is_reached(unit) {
                log::debug!("Reached target version {target_version}");
                break;
            }

            run_unit(
                unit,
                Direction::Backward,
                &*self.gateway,
                &self.database,
                self.analysis.as_deref(),
            )?;
            self.ledger.track_version_affected(unit)?;
            log::debug!("Migrated down: version {unit}");
            report.processed.push(unit.to_string());
        }

        self.run_hooks(&self.on_run_end)?;
        report.elapsed_ms = started.elapsed().as_millis();
        log::info!(
            "Rollback complete: {} rolled back",
            report.processed.len()
        );
        Ok(report)
    }

    /// Number of applied migrations a rollback to `request` would undo.
    pub fn pending_rollback_count(&self, request: &RollbackRequest) -> usize {
        let mut pending = 0;
        for unit in self.units.iter().rev() {
            if request.is_reached(unit) {
                break;
            }
            if !self.ledger.is_applied(unit) {
                continue;
            }
            pending += 1;
        }
        pending
    }

    /// Compare migrations on disk with the ledger.
    pub fn get_diff(&self) -> LedgerDiff<'_> {
        log::debug!("Looking for migration files that have not been run");
        let diff = self.ledger.diff(&self.units);
        for row in &diff.unknown {
            log::warn!("Applied version {row} has no migration file");
        }
        log::debug!(
            "Diff completed: {} unapplied, {} unknown",
            diff.unapplied.len(),
            diff.unknown.len()
        );
        diff
    }

    /// Record every unapplied migration as applied without running it.
    ///
    /// For databases whose schema was brought up to date by other means.
    /// Run hooks are not executed.
    pub fn backfill_new_db(&mut self) -> MigrateResult<RunReport> {
        let started = Instant::now();
        log::debug!("Beginning to backfill untracked migrations");
        self.ledger.set_direction(Direction::Forward);

        let mut report = RunReport::new(Direction::Forward);
        for unit in &self.units {
            if self.ledger.is_applied(unit) {
                log::debug!("Skipping {unit}");
                report.skipped += 1;
                continue;
            }
            log::debug!("Tracking {unit}");
            self.ledger.record_applied(unit)?;
            report.processed.push(unit.to_string());
        }

        report.elapsed_ms = started.elapsed().as_millis();
        Ok(report)
    }

    fn log_run_start(&self, direction: Direction) {
        log::debug!("Database has {}", self.ledger);
        log::debug!(
            "Found {} migration(s) in the migrations directory",
            self.units.len()
        );
        log::debug!("Beginning to migrate {direction}");
    }

    fn run_hooks(&self, hooks: &[String]) -> MigrateResult<()> {
        for hook in hooks {
            let statements = split_statements(hook).map_err(|e| MigrateError::Configuration {
                message: format!("invalid run hook '{hook}': {e}"),
            })?;
            for sql in &statements {
                log::debug!("Running hook on '{}': {sql}", self.database);
                self.gateway.execute(&self.database, sql, &[])?;
            }
        }
        Ok(())
    }
}

fn run_unit(
    unit: &MigrationUnit,
    direction: Direction,
    gateway: &dyn Gateway,
    database: &str,
    analysis: Option<&StatementLog>,
) -> MigrateResult<()> {
    log::debug!("Migrating: {unit}");

    let analyzing;
    let gateway: &dyn Gateway = match analysis {
        Some(log) => {
            analyzing = log.wrap(unit, gateway);
            &analyzing
        }
        None => gateway,
    };
    let db = Db::new(gateway, database);

    let outcome = match direction {
        Direction::Forward => unit.up(&db),
        Direction::Backward => unit.down(&db),
    };
    if let Err(e) = &outcome {
        log::error!("Migration {unit} encountered a problem, stopping the run: {e}");
    }
    outcome
}

#[cfg(test)]
#[path = "coordinator_test.rs"]
mod tests;
