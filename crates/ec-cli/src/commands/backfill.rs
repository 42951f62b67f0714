//! Backfill command implementation

use anyhow::Result;

use crate::cli::{BackfillArgs, GlobalArgs};
use crate::commands::common::{print_report, Session};

/// Execute the backfill command
pub(crate) fn execute(_args: &BackfillArgs, global: &GlobalArgs) -> Result<()> {
    let session = Session::open(global)?;
    let mut coordinator = session.coordinator()?;

    let report = coordinator.backfill_new_db()?;
    print_report(&report, "recorded");
    Ok(())
}
