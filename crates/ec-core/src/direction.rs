//! Direction of a migration run.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Forward (apply) or backward (rollback).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Run `up` and insert ledger rows
    Forward,
    /// Run `down` and delete ledger rows
    Backward,
}

impl Direction {
    /// Short verb used in log lines and reports.
    pub fn verb(self) -> &'static str {
        match self {
            Direction::Forward => "up",
            Direction::Backward => "down",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.verb())
    }
}
