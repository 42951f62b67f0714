//! Creating new migration files.

use crate::error::{MigrateError, MigrateResult};
use chrono::NaiveDateTime;
use ec_core::version::VERSION_TOKEN_LEN;
use ec_core::{MigrationName, Version};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Write an empty SQL migration called `name` into `dir`, versioned at
/// `now`, and return its path.
///
/// The name is lowercased. `dir` is created if missing; an existing file is
/// never overwritten.
pub fn create_migration_file(dir: &Path, name: &str, now: NaiveDateTime) -> MigrateResult<PathBuf> {
    let name = MigrationName::new(name.trim().to_ascii_lowercase())?;
    let token = uuid::Uuid::new_v4().simple().to_string();
    let version = Version::from_parts(now, &token[..VERSION_TOKEN_LEN])?;

    let io_error = |path: &Path, e: std::io::Error| MigrateError::Io {
        path: path.display().to_string(),
        source: e,
    };

    std::fs::create_dir_all(dir).map_err(|e| io_error(dir, e))?;

    let path = dir.join(format!("{version}_{name}.sql"));
    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&path)
        .map_err(|e| io_error(&path, e))?;
    file.write_all(template(&version, &name, now).as_bytes())
        .map_err(|e| io_error(&path, e))?;

    log::info!("Created migration {}", path.display());
    Ok(path)
}

fn template(version: &Version, name: &MigrationName, now: NaiveDateTime) -> String {
    format!(
        "-- Migration: {name}\n\
         -- Version: {version}\n\
         -- Created: {}\n\
         \n\
         -- up\n\
         \n\
         \n\
         -- down\n\
         \n",
        now.format("%Y-%m-%d %H:%M")
    )
}

#[cfg(test)]
#[path = "scaffold_test.rs"]
mod tests;
