//! Diff command implementation

use anyhow::Result;
use ec_migrate::LedgerDiff;
use serde::Serialize;

use crate::cli::{DiffArgs, DiffOutput, GlobalArgs};
use crate::commands::common::Session;

#[derive(Debug, Serialize)]
struct DiffEntry {
    version: String,
    name: String,
}

#[derive(Debug, Serialize)]
struct DiffJson {
    unapplied: Vec<DiffEntry>,
    unknown: Vec<DiffEntry>,
}

impl From<&LedgerDiff<'_>> for DiffJson {
    fn from(diff: &LedgerDiff<'_>) -> Self {
        Self {
            unapplied: diff
                .unapplied
                .iter()
                .map(|unit| DiffEntry {
                    version: unit.version().to_string(),
                    name: unit.name().to_string(),
                })
                .collect(),
            unknown: diff
                .unknown
                .iter()
                .map(|row| DiffEntry {
                    version: row.version.clone(),
                    name: row.name.clone(),
                })
                .collect(),
        }
    }
}

/// Execute the diff command
pub(crate) fn execute(args: &DiffArgs, global: &GlobalArgs) -> Result<()> {
    let session = Session::open(global)?;
    let coordinator = session.coordinator()?;
    let diff = coordinator.get_diff();

    match args.output {
        DiffOutput::Json => {
            println!("{}", serde_json::to_string_pretty(&DiffJson::from(&diff))?);
        }
        DiffOutput::Table => print_table(&diff),
    }
    Ok(())
}

fn print_table(diff: &LedgerDiff<'_>) {
    if diff.is_clean() {
        println!("Database is up to date");
        return;
    }

    if !diff.unapplied.is_empty() {
        println!("Unapplied migrations:");
        for unit in &diff.unapplied {
            println!("  {unit}");
        }
    }
    if !diff.unknown.is_empty() {
        println!("Applied versions with no migration file:");
        for row in &diff.unknown {
            println!("  {row}");
        }
    }
}
