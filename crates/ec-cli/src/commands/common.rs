//! Shared utilities for CLI commands

use anyhow::{Context, Result};
use ec_core::Config;
use ec_db::{ConfigAdapterFactory, Databases, Executor, Gateway};
use ec_migrate::{CodeLoader, CodeRegistry, Coordinator, RunReport, StatementLog};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::cli::GlobalArgs;

/// A loaded project: its configuration plus a gateway over its databases.
pub(crate) struct Session {
    pub(crate) config: Config,
    pub(crate) root: PathBuf,
    pub(crate) gateway: Rc<dyn Gateway>,
    analysis: Option<Rc<StatementLog>>,
}

impl Session {
    /// Load the project config and set up lazily-opened database handles.
    pub(crate) fn open(global: &GlobalArgs) -> Result<Self> {
        let root = PathBuf::from(&global.project_dir);
        let config = load_config(global, &root)?;
        log::debug!(
            "Project {} uses ledger database '{}'",
            root.display(),
            config.database_name
        );

        let databases = Databases::with_factory(ConfigAdapterFactory::from_config(&config, &root));
        let gateway: Rc<dyn Gateway> = Rc::new(Executor::new(Rc::new(databases)));
        let analysis = global.analyze.then(|| Rc::new(StatementLog::new()));

        Ok(Self {
            config,
            root,
            gateway,
            analysis,
        })
    }

    /// Absolute path of the migrations directory.
    pub(crate) fn migrations_dir(&self) -> PathBuf {
        self.config.migrations_dir_absolute(&self.root)
    }

    /// Discover migrations and load the ledger.
    pub(crate) fn coordinator(&self) -> Result<Coordinator> {
        // The CLI runs plain SQL migrations; programs embedding ec-migrate
        // register compiled-in code on their own CodeRegistry.
        let loader: Rc<dyn CodeLoader> = Rc::new(CodeRegistry::new());
        let coordinator =
            Coordinator::from_config(&self.config, &self.root, Rc::clone(&self.gateway), loader)
                .context("Failed to load migrations")?;
        Ok(match &self.analysis {
            Some(log) => coordinator.with_analysis(Rc::clone(log)),
            None => coordinator,
        })
    }

    /// Print statements captured with `--analyze`, if enabled.
    pub(crate) fn print_analysis(&self) {
        let Some(log) = &self.analysis else {
            return;
        };
        let entries = log.entries();
        println!("\nStatements executed ({}):", entries.len());
        for entry in entries {
            let params = if entry.params.is_empty() {
                String::new()
            } else {
                let values: Vec<String> = entry.params.iter().map(ToString::to_string).collect();
                format!(" -- params: {}", values.join(", "))
            };
            println!(
                "  [{}] {}: {}{}",
                entry.migration, entry.database, entry.sql, params
            );
        }
    }
}

/// Load the config named by `--config`, or the one in the project directory.
pub(crate) fn load_config(global: &GlobalArgs, root: &Path) -> Result<Config> {
    let config = match &global.config {
        Some(path) => Config::load(Path::new(path)),
        None => Config::load_from_dir(root),
    };
    config.context("Failed to load project configuration")
}

/// Print the outcome of an up/down/backfill run.
pub(crate) fn print_report(report: &RunReport, verb: &str) {
    if report.processed.is_empty() {
        println!("Nothing to do ({} skipped)", report.skipped);
        return;
    }
    for migration in &report.processed {
        println!("  {verb} {migration}");
    }
    println!(
        "\n{} migration(s) {verb} in {}ms ({} skipped)",
        report.processed.len(),
        report.elapsed_ms,
        report.skipped
    );
}
