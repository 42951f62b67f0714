//! One migration discovered on disk.

use crate::code::{CodeLoader, Db, MigrationCode};
use crate::error::{MigrateError, MigrateResult};
use ec_core::{Direction, MigrationName, Version};
use regex::Regex;
use std::cell::OnceCell;
use std::cmp::Ordering;
use std::fmt;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::OnceLock;
use std::time::Instant;

static FILE_NAME_RE: OnceLock<Regex> = OnceLock::new();

fn file_name_regex() -> &'static Regex {
    FILE_NAME_RE.get_or_init(|| {
        Regex::new(
            r"(?i)^([0-9]{4}-[0-9]{2}-[0-9]{2}-[0-9]{2}-[0-9]{2}-[a-z0-9]{5})_([a-z0-9_]+)\.[a-z0-9]+$",
        )
        .expect("valid regex")
    })
}

/// Split a migration file name into its version and name.
///
/// Returns `None` for anything that is not `<version>_<name>.<ext>`.
pub fn parse_file_name(file_name: &str) -> Option<(Version, MigrationName)> {
    let caps = file_name_regex().captures(file_name)?;
    let version = Version::new(&caps[1]).ok()?;
    let name = MigrationName::new(&caps[2]).ok()?;
    Some((version, name))
}

/// A migration file, with its code loaded on first use.
pub struct MigrationUnit {
    version: Version,
    name: MigrationName,
    source: PathBuf,
    loader: Rc<dyn CodeLoader>,
    code: OnceCell<Box<dyn MigrationCode>>,
}

impl MigrationUnit {
    pub fn new(
        version: Version,
        name: MigrationName,
        source: PathBuf,
        loader: Rc<dyn CodeLoader>,
    ) -> Self {
        Self {
            version,
            name,
            source,
            loader,
            code: OnceCell::new(),
        }
    }

    /// Build a unit for `file_name` in `dir`, or `None` if the name does not
    /// match the migration file naming pattern.
    pub fn create_or_not(file_name: &str, dir: &Path, loader: &Rc<dyn CodeLoader>) -> Option<Self> {
        let (version, name) = parse_file_name(file_name)?;
        Some(Self::new(
            version,
            name,
            dir.join(file_name),
            Rc::clone(loader),
        ))
    }

    pub fn version(&self) -> &Version {
        &self.version
    }

    pub fn name(&self) -> &MigrationName {
        &self.name
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Whether the migration's code has been loaded yet.
    pub fn is_loaded(&self) -> bool {
        self.code.get().is_some()
    }

    /// Run the migration's `up` code and log how long it took.
    pub fn up(&self, db: &Db<'_>) -> MigrateResult<()> {
        let started = Instant::now();
        self.run(db, Direction::Forward)?;
        log::info!(
            "# {self} execution: {:.3} seconds",
            started.elapsed().as_secs_f64()
        );
        Ok(())
    }

    /// Run the migration's `down` code.
    pub fn down(&self, db: &Db<'_>) -> MigrateResult<()> {
        self.run(db, Direction::Backward)
    }

    fn run(&self, db: &Db<'_>, direction: Direction) -> MigrateResult<()> {
        let code = self.code()?;
        let outcome = match direction {
            Direction::Forward => code.up(db),
            Direction::Backward => code.down(db),
        };
        outcome.map_err(|source| MigrateError::Execution {
            migration: self.to_string(),
            direction,
            source,
        })
    }

    fn code(&self) -> MigrateResult<&dyn MigrationCode> {
        if let Some(code) = self.code.get() {
            return Ok(code.as_ref());
        }
        log::debug!("Loading code for {self} from {}", self.source.display());
        let code = self.loader.load(&self.name, &self.source)?;
        Ok(self.code.get_or_init(|| code).as_ref())
    }
}

impl fmt::Display for MigrationUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.version, self.name)
    }
}

impl fmt::Debug for MigrationUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MigrationUnit")
            .field("version", &self.version)
            .field("name", &self.name)
            .field("source", &self.source)
            .field("loaded", &self.is_loaded())
            .finish()
    }
}

impl PartialEq for MigrationUnit {
    fn eq(&self, other: &Self) -> bool {
        self.version == other.version
    }
}

impl Eq for MigrationUnit {}

impl PartialOrd for MigrationUnit {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for MigrationUnit {
    fn cmp(&self, other: &Self) -> Ordering {
        self.version.cmp(&other.version)
    }
}

#[cfg(test)]
#[path = "unit_test.rs"]
mod tests;
