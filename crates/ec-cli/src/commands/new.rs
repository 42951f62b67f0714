//! New command implementation - scaffolds a migration file

use anyhow::{Context, Result};
use ec_migrate::create_migration_file;

use crate::cli::{GlobalArgs, NewArgs};
use crate::commands::common::load_config;

/// Execute the new command
pub(crate) fn execute(args: &NewArgs, global: &GlobalArgs) -> Result<()> {
    let root = std::path::PathBuf::from(&global.project_dir);
    let config = load_config(global, &root)?;
    let dir = config.migrations_dir_absolute(&root);

    let path = create_migration_file(&dir, &args.name, chrono::Local::now().naive_local())
        .with_context(|| format!("Failed to create migration '{}'", args.name))?;
    println!("{}", path.display());
    Ok(())
}
