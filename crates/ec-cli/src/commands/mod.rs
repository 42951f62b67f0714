//! CLI command implementations

pub(crate) mod backfill;
pub(crate) mod common;
pub(crate) mod diff;
pub(crate) mod down;
pub(crate) mod init;
pub(crate) mod new;
pub(crate) mod up;
