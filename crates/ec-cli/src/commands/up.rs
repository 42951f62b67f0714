//! Up command implementation

use anyhow::Result;

use crate::cli::{GlobalArgs, UpArgs};
use crate::commands::common::{print_report, Session};

/// Execute the up command
pub(crate) fn execute(_args: &UpArgs, global: &GlobalArgs) -> Result<()> {
    let session = Session::open(global)?;
    let mut coordinator = session.coordinator()?;

    let result = coordinator.migrate_up();
    session.print_analysis();
    print_report(&result?, "applied");
    Ok(())
}
