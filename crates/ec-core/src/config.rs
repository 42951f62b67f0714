//! Configuration types and parsing for echelon.yml

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// File names probed by [`Config::load_from_dir`], in order.
pub const CONFIG_FILE_NAMES: [&str; 2] = ["echelon.yml", "echelon.yaml"];

const DEFAULT_DB_PATH: &str = ":memory:";

/// Project configuration from echelon.yml
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Directory holding the migration files, relative to the project root
    pub migrations_dir: String,

    /// Name of the database that stores the `schema_migrations` ledger and
    /// receives migrations that do not name another database
    pub database_name: String,

    /// Named database handles, keyed by the name migrations address them by
    #[serde(default)]
    pub databases: BTreeMap<String, DatabaseConfig>,

    /// SQL executed on the default database before an up/down run; an entry
    /// may hold several `;`-separated statements
    #[serde(default)]
    pub on_run_start: Vec<String>,

    /// SQL executed on the default database after a successful up/down run,
    /// split like `on_run_start`
    #[serde(default)]
    pub on_run_end: Vec<String>,
}

/// Database engine selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DbType {
    /// DuckDB (default)
    #[default]
    DuckDb,
}

impl std::fmt::Display for DbType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DbType::DuckDb => write!(f, "duckdb"),
        }
    }
}

/// Connection settings for one named database
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    /// Engine type
    #[serde(rename = "type", default)]
    pub db_type: DbType,

    /// Database path (file-based, or `:memory:`)
    #[serde(default = "default_db_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            db_type: DbType::default(),
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> String {
    DEFAULT_DB_PATH.to_string()
}

impl Config {
    /// Load configuration from a file path
    pub fn load(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            return Err(CoreError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        let config: Config =
            serde_yaml::from_str(&content).map_err(|e| CoreError::ConfigParseError {
                path: path.display().to_string(),
                source: e,
            })?;
        config.validate()?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a project directory
    /// Looks for echelon.yml or echelon.yaml
    pub fn load_from_dir(dir: &Path) -> CoreResult<Self> {
        for name in CONFIG_FILE_NAMES {
            let candidate = dir.join(name);
            if candidate.exists() {
                return Self::load(&candidate);
            }
        }
        Err(CoreError::ConfigNotFound {
            path: dir.join(CONFIG_FILE_NAMES[0]).display().to_string(),
        })
    }

    /// Validate the configuration
    pub fn validate(&self) -> CoreResult<()> {
        if self.migrations_dir.trim().is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "migrations_dir cannot be empty".to_string(),
            });
        }

        if self.database_name.trim().is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "database_name cannot be empty".to_string(),
            });
        }

        if !self.databases.contains_key(&self.database_name) {
            return Err(CoreError::ConfigInvalid {
                message: format!(
                    "database_name '{}' has no entry under 'databases' (known: {})",
                    self.database_name,
                    self.available_databases().join(", ")
                ),
            });
        }

        Ok(())
    }

    /// Resolve `migrations_dir` against the project root
    pub fn migrations_dir_absolute(&self, root: &Path) -> PathBuf {
        let dir = Path::new(&self.migrations_dir);
        if dir.is_absolute() {
            dir.to_path_buf()
        } else {
            root.join(dir)
        }
    }

    /// Names of all configured databases, sorted
    pub fn available_databases(&self) -> Vec<&str> {
        self.databases.keys().map(String::as_str).collect()
    }

    /// Look up a database handle by name
    pub fn database(&self, name: &str) -> Option<&DatabaseConfig> {
        self.databases.get(name)
    }

    /// Settings of the ledger/default database
    pub fn default_database(&self) -> CoreResult<&DatabaseConfig> {
        self.database(&self.database_name)
            .ok_or_else(|| CoreError::ConfigInvalid {
                message: format!("unknown database '{}'", self.database_name),
            })
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
