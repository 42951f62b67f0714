//! Named database handles.
//!
//! [`Databases`] memoizes one [`EngineAdapter`] per database name, creating
//! adapters on first use through an [`AdapterFactory`].

use crate::duckdb::DuckDbAdapter;
use crate::engine::EngineAdapter;
use crate::error::{DbError, DbResult};
use ec_core::{Config, DatabaseConfig, DbType};
use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// Produces engine adapters for database names as used by the application,
/// e.g. "app", "logs" or "auth".
pub trait AdapterFactory {
    fn create_adapter_for(&self, name: &str) -> DbResult<Rc<dyn EngineAdapter>>;
}

/// Factory that builds adapters from the `databases` section of echelon.yml.
///
/// Relative file paths are resolved against `root`.
pub struct ConfigAdapterFactory {
    databases: BTreeMap<String, DatabaseConfig>,
    root: PathBuf,
}

impl ConfigAdapterFactory {
    pub fn new(databases: BTreeMap<String, DatabaseConfig>, root: impl Into<PathBuf>) -> Self {
        Self {
            databases,
            root: root.into(),
        }
    }

    /// Build a factory for every database a project configures.
    pub fn from_config(config: &Config, root: &Path) -> Self {
        Self::new(config.databases.clone(), root)
    }

    fn resolve_path(&self, path: &str) -> String {
        if path == ":memory:" || Path::new(path).is_absolute() {
            path.to_string()
        } else {
            self.root.join(path).display().to_string()
        }
    }
}

impl AdapterFactory for ConfigAdapterFactory {
    fn create_adapter_for(&self, name: &str) -> DbResult<Rc<dyn EngineAdapter>> {
        let db = self
            .databases
            .get(name)
            .ok_or_else(|| DbError::UnknownDatabase {
                name: name.to_string(),
            })?;

        match db.db_type {
            DbType::DuckDb => {
                let path = self.resolve_path(&db.path);
                log::debug!("Opening duckdb database '{name}' at {path}");
                Ok(Rc::new(DuckDbAdapter::new(&path)?))
            }
        }
    }
}

/// Memoizing registry of engine adapters keyed by database name.
#[derive(Default)]
pub struct Databases {
    factory: Option<Box<dyn AdapterFactory>>,
    cache: RefCell<HashMap<String, Rc<dyn EngineAdapter>>>,
}

impl Databases {
    /// Create a registry that builds adapters with `factory`.
    pub fn with_factory(factory: impl AdapterFactory + 'static) -> Self {
        Self {
            factory: Some(Box::new(factory)),
            cache: RefCell::default(),
        }
    }

    /// Register an already-open adapter under `name`, replacing any previous
    /// one.
    pub fn insert(&self, name: impl Into<String>, adapter: Rc<dyn EngineAdapter>) {
        self.cache.borrow_mut().insert(name.into(), adapter);
    }

    /// Get the adapter for `name`, creating it on first use.
    pub fn get(&self, name: &str) -> DbResult<Rc<dyn EngineAdapter>> {
        if let Some(adapter) = self.cache.borrow().get(name) {
            return Ok(Rc::clone(adapter));
        }

        let factory = self
            .factory
            .as_ref()
            .ok_or_else(|| DbError::FactoryNotConfigured {
                name: name.to_string(),
            })?;
        let adapter = factory.create_adapter_for(name)?;
        self.cache
            .borrow_mut()
            .insert(name.to_string(), Rc::clone(&adapter));
        Ok(adapter)
    }

    /// Whether an adapter for `name` has already been created.
    pub fn is_open(&self, name: &str) -> bool {
        self.cache.borrow().contains_key(name)
    }
}

#[cfg(test)]
#[path = "registry_test.rs"]
mod tests;
