//! Down command implementation

use anyhow::Result;

use crate::cli::{DownArgs, GlobalArgs};
use crate::commands::common::{print_report, Session};

/// Execute the down command
pub(crate) fn execute(args: &DownArgs, global: &GlobalArgs) -> Result<()> {
    let session = Session::open(global)?;
    let mut coordinator = session.coordinator()?;

    let result = coordinator.migrate_down(&args.target_version);
    session.print_analysis();
    print_report(&result?, "rolled back");
    Ok(())
}
